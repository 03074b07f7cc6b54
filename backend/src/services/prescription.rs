//! Prescription service for the pharmacy queue
//!
//! Prescriptions only move forward: pending, processing (dispensed and
//! invoiced), paid, collected.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::{
    paginate, validate_required, Invoice, NotificationKind, PaginatedResponse, Pagination,
    PaymentMethod, PrescribedItem, Prescription, PrescriptionFilter, PrescriptionStatus,
};
use uuid::Uuid;
use validator::Validate;

use super::NotificationService;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::store::PharmacyStore;

#[derive(Clone)]
pub struct PrescriptionService {
    store: Arc<dyn PharmacyStore>,
    config: Arc<Config>,
    notifications: NotificationService,
}

/// One prescribed drug. The name is taken from the catalog when the drug is stocked.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PrescribedItemInput {
    pub drug_id: Uuid,
    #[validate(length(max = 200))]
    pub drug_name: Option<String>,
    /// At most 100 items of 100000 units each, so merged lines stay well inside `u32`
    #[validate(range(min = 1, max = 100000))]
    pub quantity: u32,
    #[validate(length(max = 500))]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePrescriptionInput {
    pub patient_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub patient_name: String,
    #[validate(length(min = 1, max = 200))]
    pub prescriber: String,
    #[validate(length(min = 1, max = 100))]
    pub items: Vec<PrescribedItemInput>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaymentInput {
    pub payment_method: PaymentMethod,
}

/// Settled prescription with its invoice
#[derive(Debug, Clone, Serialize)]
pub struct PaymentReceipt {
    pub prescription: Prescription,
    pub invoice: Invoice,
}

impl PrescriptionService {
    pub fn new(store: Arc<dyn PharmacyStore>, config: Arc<Config>) -> Self {
        let notifications = NotificationService::new(store.clone(), &config);
        Self {
            store,
            config,
            notifications,
        }
    }

    /// Queue a new prescription as pending
    pub fn create(&self, input: CreatePrescriptionInput) -> AppResult<Prescription> {
        input.validate()?;
        for item in &input.items {
            item.validate()?;
        }
        validate_required(&input.patient_name)
            .map_err(|e| AppError::validation("patient_name", e))?;
        validate_required(&input.prescriber).map_err(|e| AppError::validation("prescriber", e))?;

        let catalog: HashMap<Uuid, String> = self
            .store
            .drugs()?
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect();

        let mut items = Vec::with_capacity(input.items.len());
        for item in input.items {
            let drug_name = match catalog.get(&item.drug_id) {
                Some(name) => name.clone(),
                None => item
                    .drug_name
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| {
                        AppError::validation(
                            "items.drug_name",
                            format!("Drug {} is not stocked; a drug name is required", item.drug_id),
                        )
                    })?,
            };
            items.push(PrescribedItem {
                drug_id: item.drug_id,
                drug_name,
                quantity: item.quantity,
                instructions: item.instructions,
            });
        }

        let now = Utc::now();
        let prescription = self.store.insert_prescription(Prescription {
            id: Uuid::new_v4(),
            patient_id: input.patient_id,
            patient_name: input.patient_name.trim().to_string(),
            prescriber: input.prescriber.trim().to_string(),
            items,
            status: PrescriptionStatus::Pending,
            invoice_id: None,
            created_at: now,
            updated_at: now,
        })?;

        self.notifications.notify(
            NotificationKind::PrescriptionUpdate,
            "New prescription",
            format!(
                "Prescription for {} from {} is waiting",
                prescription.patient_name, prescription.prescriber
            ),
            Some(prescription.id),
        )?;
        tracing::info!(prescription_id = %prescription.id, items = prescription.items.len(), "prescription queued");

        Ok(prescription)
    }

    pub fn get(&self, prescription_id: Uuid) -> AppResult<Prescription> {
        Ok(self.store.prescription(prescription_id)?)
    }

    /// List prescriptions, oldest first
    pub fn list(
        &self,
        filter: &PrescriptionFilter,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<Prescription>> {
        let pagination = pagination.normalized(self.config.pharmacy.max_per_page);
        let matching: Vec<Prescription> = self
            .store
            .prescriptions()?
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect();
        Ok(paginate(matching, &pagination))
    }

    /// Settle the invoice of a dispensed prescription
    pub fn record_payment(
        &self,
        prescription_id: Uuid,
        input: PaymentInput,
    ) -> AppResult<PaymentReceipt> {
        let (prescription, invoice) = self
            .store
            .record_payment(prescription_id, input.payment_method)?;

        self.notifications.notify(
            NotificationKind::PrescriptionUpdate,
            "Prescription paid",
            format!(
                "Invoice {} for {} paid",
                invoice.invoice_number, prescription.patient_name
            ),
            Some(prescription.id),
        )?;
        tracing::info!(
            prescription_id = %prescription.id,
            invoice = %invoice.invoice_number,
            method = ?input.payment_method,
            "prescription paid"
        );

        Ok(PaymentReceipt {
            prescription,
            invoice,
        })
    }

    /// Hand a paid prescription to the patient
    pub fn dispatch(&self, prescription_id: Uuid) -> AppResult<Prescription> {
        let prescription = self
            .store
            .advance_prescription(prescription_id, PrescriptionStatus::Collected)?;

        self.notifications.notify(
            NotificationKind::PrescriptionUpdate,
            "Prescription collected",
            format!("Prescription for {} collected", prescription.patient_name),
            Some(prescription.id),
        )?;
        tracing::info!(prescription_id = %prescription.id, "prescription collected");

        Ok(prescription)
    }
}
