//! Dispensing service
//!
//! A pharmacist opens a pending prescription for review, adjusts the
//! quantities actually handed out and submits. Submission deducts stock,
//! raises the prescription invoice and moves the prescription to processing
//! in one store commit.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    DispensingCart, DispensingLine, DispensingReceipt, Invoice, InvoiceLine, InvoiceSource,
    InvoiceStatus, NotificationKind, Prescription, PrescriptionStatus,
};
use uuid::Uuid;
use validator::Validate;

use super::{today, NotificationService};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::store::{PharmacyStore, StockDeduction};

#[derive(Clone)]
pub struct DispensingService {
    store: Arc<dyn PharmacyStore>,
    notifications: NotificationService,
}

/// Quantity the pharmacist will hand out for one drug
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuantityAdjustment {
    pub drug_id: Uuid,
    pub quantity: u32,
}

/// Input for submitting a dispensing. Lines without an adjustment are
/// dispensed at the prescribed quantity.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SubmitDispenseInput {
    #[serde(default)]
    #[validate(length(max = 100))]
    pub adjustments: Vec<QuantityAdjustment>,
}

/// Review cart with the prescription it was built from
#[derive(Debug, Clone, Serialize)]
pub struct DispenseReview {
    pub prescription: Prescription,
    pub cart: DispensingCart,
    pub total: Decimal,
}

/// Result of a committed dispensing
#[derive(Debug, Clone, Serialize)]
pub struct DispenseOutcome {
    pub prescription: Prescription,
    pub invoice: Invoice,
    pub receipt: DispensingReceipt,
    /// Drugs that fell below their reorder level or ran out
    pub low_stock_alerts: Vec<Uuid>,
}

impl DispensingService {
    pub fn new(store: Arc<dyn PharmacyStore>, config: Arc<Config>) -> Self {
        let notifications = NotificationService::new(store.clone(), &config);
        Self {
            store,
            notifications,
        }
    }

    fn build_cart(&self, prescription: &Prescription, today: NaiveDate) -> AppResult<DispensingCart> {
        if prescription.status != PrescriptionStatus::Pending {
            return Err(AppError::InvalidStateTransition(format!(
                "Prescription is {} and can no longer be dispensed",
                prescription.status
            )));
        }
        let inventory = self.store.drugs()?;
        Ok(DispensingCart::initialize(prescription, &inventory, today))
    }

    /// Build the review cart for a pending prescription from live inventory
    pub fn open_review(&self, prescription_id: Uuid) -> AppResult<DispenseReview> {
        let prescription = self.store.prescription(prescription_id)?;
        let cart = self.build_cart(&prescription, today())?;
        let total = cart.total();

        tracing::debug!(prescription_id = %prescription_id, lines = cart.lines.len(), "dispensing review opened");
        Ok(DispenseReview {
            prescription,
            cart,
            total,
        })
    }

    /// Validate the adjusted cart and commit it
    pub fn submit(
        &self,
        prescription_id: Uuid,
        input: SubmitDispenseInput,
    ) -> AppResult<DispenseOutcome> {
        input.validate()?;
        let today = today();
        let prescription = self.store.prescription(prescription_id)?;
        let mut cart = self.build_cart(&prescription, today)?;

        for adjustment in &input.adjustments {
            cart.set_quantity(adjustment.drug_id, adjustment.quantity)?;
        }
        let receipt = cart.submit()?;

        let deductions: Vec<StockDeduction> = receipt
            .lines
            .iter()
            .map(|line| StockDeduction {
                drug_id: line.drug_id,
                quantity: line.quantity_dispensed,
            })
            .collect();
        let invoice = prescription_invoice(&prescription, &receipt.lines, today);

        let commit = self
            .store
            .commit_dispense(prescription_id, &deductions, invoice)
            .map_err(|err| {
                tracing::warn!(prescription_id = %prescription_id, error = %err, "dispensing commit rejected");
                err
            })?;

        self.notifications.notify(
            NotificationKind::PrescriptionUpdate,
            "Prescription dispensed",
            format!(
                "Prescription for {} dispensed, invoice {} raised",
                commit.prescription.patient_name, commit.invoice.invoice_number
            ),
            Some(prescription_id),
        )?;
        let low_stock_alerts = self.notifications.alert_stock_levels(&commit.drugs, today)?;

        tracing::info!(
            prescription_id = %prescription_id,
            invoice = %commit.invoice.invoice_number,
            total = %receipt.total,
            "prescription dispensed"
        );

        Ok(DispenseOutcome {
            prescription: commit.prescription,
            invoice: commit.invoice,
            receipt,
            low_stock_alerts,
        })
    }
}

fn prescription_invoice(
    prescription: &Prescription,
    lines: &[DispensingLine],
    issued_on: NaiveDate,
) -> Invoice {
    let lines: Vec<InvoiceLine> = lines
        .iter()
        .map(|line| InvoiceLine {
            drug_id: line.drug_id,
            drug_name: line.drug_name.clone(),
            quantity: line.quantity_dispensed,
            unit_price: line.unit_price,
            subtotal: line.subtotal(),
        })
        .collect();
    let subtotal: Decimal = lines.iter().map(|l| l.subtotal).sum();

    Invoice {
        id: Uuid::new_v4(),
        invoice_number: String::new(),
        source: InvoiceSource::Prescription {
            prescription_id: prescription.id,
        },
        customer_name: Some(prescription.patient_name.clone()),
        lines,
        subtotal,
        discount_amount: Decimal::ZERO,
        total: subtotal,
        payment_method: None,
        status: InvoiceStatus::Unpaid,
        issued_on,
        paid_at: None,
    }
}
