//! Dispensing review: reconciling a prescription against inventory
//!
//! A pharmacist opens a pending prescription, the cart is pre-filled with the
//! prescribed quantities and a snapshot of stock on hand, quantities are
//! adjusted down where needed, and the cart is submitted for a payable total.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Drug, InventoryStatus, Prescription};
use crate::error::DispensingError;
use crate::validation::validate_dispense_quantity;

/// One prescribed drug under review
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispensingLine {
    pub drug_id: Uuid,
    pub drug_name: String,
    pub quantity_prescribed: u32,
    pub quantity_dispensed: u32,
    /// Stock on hand when the review was opened
    pub available: u32,
    pub unit_price: Decimal,
    /// Inventory status when the review was opened
    pub status: InventoryStatus,
}

impl DispensingLine {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity_dispensed))
    }

    /// Upper bound for `quantity_dispensed`
    pub fn max_dispensable(&self) -> u32 {
        self.quantity_prescribed.min(self.available)
    }

    fn check_submittable(&self) -> Result<(), DispensingError> {
        if !self.status.is_dispensable() {
            return Err(DispensingError::Unavailable {
                drug_id: self.drug_id,
                drug_name: self.drug_name.clone(),
                status: self.status,
            });
        }
        if self.quantity_dispensed > self.available {
            return Err(DispensingError::InsufficientStock {
                drug_id: self.drug_id,
                drug_name: self.drug_name.clone(),
                available: self.available,
                requested: self.quantity_dispensed,
            });
        }
        Ok(())
    }
}

/// Cart built from a prescription for dispensing review
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispensingCart {
    pub prescription_id: Uuid,
    pub lines: Vec<DispensingLine>,
}

/// Accepted dispensing: what to deduct and what to charge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispensingReceipt {
    pub prescription_id: Uuid,
    pub lines: Vec<DispensingLine>,
    pub total: Decimal,
}

impl DispensingCart {
    /// Build the review cart for `prescription`.
    ///
    /// Each prescribed drug starts with its full prescribed quantity. Drugs
    /// missing from `inventory` get zero stock and a zero price so the line is
    /// visible but cannot be submitted. Repeated entries for one drug are
    /// merged into a single line.
    pub fn initialize(prescription: &Prescription, inventory: &[Drug], today: NaiveDate) -> Self {
        let catalog: HashMap<Uuid, &Drug> = inventory.iter().map(|d| (d.id, d)).collect();
        let mut lines: Vec<DispensingLine> = Vec::with_capacity(prescription.items.len());

        for item in &prescription.items {
            if let Some(line) = lines.iter_mut().find(|l| l.drug_id == item.drug_id) {
                line.quantity_prescribed = line.quantity_prescribed.saturating_add(item.quantity);
                line.quantity_dispensed = line.quantity_prescribed;
                continue;
            }

            let line = match catalog.get(&item.drug_id) {
                Some(drug) => DispensingLine {
                    drug_id: drug.id,
                    drug_name: drug.name.clone(),
                    quantity_prescribed: item.quantity,
                    quantity_dispensed: item.quantity,
                    available: drug.quantity,
                    unit_price: drug.unit_price,
                    status: drug.status(today),
                },
                None => DispensingLine {
                    drug_id: item.drug_id,
                    drug_name: item.drug_name.clone(),
                    quantity_prescribed: item.quantity,
                    quantity_dispensed: item.quantity,
                    available: 0,
                    unit_price: Decimal::ZERO,
                    status: InventoryStatus::OutOfStock,
                },
            };
            lines.push(line);
        }

        Self {
            prescription_id: prescription.id,
            lines,
        }
    }

    pub fn line(&self, drug_id: Uuid) -> Option<&DispensingLine> {
        self.lines.iter().find(|l| l.drug_id == drug_id)
    }

    /// Adjust the quantity to dispense for one drug.
    ///
    /// Accepts only `1 <= new_qty <= min(prescribed, available)`; on any
    /// rejection the line keeps its previous quantity.
    pub fn set_quantity(&mut self, drug_id: Uuid, new_qty: u32) -> Result<(), DispensingError> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.drug_id == drug_id)
            .ok_or(DispensingError::UnknownLine(drug_id))?;

        validate_dispense_quantity(new_qty, line.quantity_prescribed, line.available)?;
        line.quantity_dispensed = new_qty;
        Ok(())
    }

    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .map(DispensingLine::subtotal)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Validate the whole cart and compute the payable total.
    ///
    /// The first offending line, in cart order, is reported.
    pub fn submit(&self) -> Result<DispensingReceipt, DispensingError> {
        if self.lines.is_empty() {
            return Err(DispensingError::EmptyCart);
        }
        for line in &self.lines {
            line.check_submittable()?;
        }

        Ok(DispensingReceipt {
            prescription_id: self.prescription_id,
            lines: self.lines.clone(),
            total: self.total(),
        })
    }
}
