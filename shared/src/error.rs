//! Business rule errors raised by the pharmacy carts and state machines

use thiserror::Error;
use uuid::Uuid;

use crate::models::{InventoryStatus, PrescriptionStatus};

/// Rejection reasons for dispensing reviews and point-of-sale carts.
///
/// All of these are recoverable: the cart is left untouched and the user
/// corrects the input and retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispensingError {
    #[error("Quantity must be at least 1")]
    QuantityBelowMinimum,

    #[error("Requested {requested} exceeds prescribed quantity {prescribed}")]
    ExceedsPrescribed { prescribed: u32, requested: u32 },

    #[error("Requested {requested} exceeds available stock {available}")]
    ExceedsAvailable { available: u32, requested: u32 },

    #[error("No line for drug {0}")]
    UnknownLine(Uuid),

    #[error("Insufficient stock for {drug_name}: {available} available, {requested} requested")]
    InsufficientStock {
        drug_id: Uuid,
        drug_name: String,
        available: u32,
        requested: u32,
    },

    #[error("{drug_name} cannot be dispensed: {status}")]
    Unavailable {
        drug_id: Uuid,
        drug_name: String,
        status: InventoryStatus,
    },

    #[error("Cart has no items")]
    EmptyCart,
}

impl DispensingError {
    /// Stable machine-readable code used in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            DispensingError::QuantityBelowMinimum => "QUANTITY_BELOW_MINIMUM",
            DispensingError::ExceedsPrescribed { .. } => "EXCEEDS_PRESCRIBED",
            DispensingError::ExceedsAvailable { .. } => "EXCEEDS_AVAILABLE",
            DispensingError::UnknownLine(_) => "UNKNOWN_LINE",
            DispensingError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            DispensingError::Unavailable { .. } => "DRUG_UNAVAILABLE",
            DispensingError::EmptyCart => "EMPTY_CART",
        }
    }
}

/// Attempted prescription status change that is not the next forward step
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot move prescription from {from} to {to}")]
pub struct TransitionError {
    pub from: PrescriptionStatus,
    pub to: PrescriptionStatus,
}
