//! Prescription models and the dispensing status workflow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TransitionError;

/// A prescription waiting to be (or already) dispensed by the pharmacy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prescription {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub prescriber: String,
    pub items: Vec<PrescribedItem>,
    pub status: PrescriptionStatus,
    /// Invoice raised when the prescription was dispensed
    pub invoice_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Prescription {
    /// Move to `to`, stamping `updated_at`. The status is unchanged on error.
    pub fn advance(&mut self, to: PrescriptionStatus) -> Result<(), TransitionError> {
        self.status = self.status.transition(to)?;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// One drug line on a prescription
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrescribedItem {
    pub drug_id: Uuid,
    pub drug_name: String,
    pub quantity: u32,
    pub instructions: Option<String>,
}

/// Prescription fulfilment status
///
/// `Pending -> Processing -> Paid -> Collected`, forward only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PrescriptionStatus {
    /// Received, not yet reviewed by the pharmacist
    #[default]
    Pending,
    /// Dispensing submitted, waiting for cashier payment
    Processing,
    /// Paid and ready for collection
    Paid,
    /// Handed over to the patient
    Collected,
}

impl PrescriptionStatus {
    /// The only status this one may move to
    pub fn next(&self) -> Option<PrescriptionStatus> {
        match self {
            PrescriptionStatus::Pending => Some(PrescriptionStatus::Processing),
            PrescriptionStatus::Processing => Some(PrescriptionStatus::Paid),
            PrescriptionStatus::Paid => Some(PrescriptionStatus::Collected),
            PrescriptionStatus::Collected => None,
        }
    }

    pub fn can_transition_to(&self, to: PrescriptionStatus) -> bool {
        self.next() == Some(to)
    }

    pub fn transition(self, to: PrescriptionStatus) -> Result<PrescriptionStatus, TransitionError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(TransitionError { from: self, to })
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }
}

impl std::fmt::Display for PrescriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrescriptionStatus::Pending => write!(f, "Pending"),
            PrescriptionStatus::Processing => write!(f, "Processing"),
            PrescriptionStatus::Paid => write!(f, "Paid"),
            PrescriptionStatus::Collected => write!(f, "Collected"),
        }
    }
}

/// Filter for prescription queues
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrescriptionFilter {
    pub status: Option<PrescriptionStatus>,
    /// Case-insensitive substring of the patient name
    pub patient: Option<String>,
}

impl PrescriptionFilter {
    pub fn matches(&self, prescription: &Prescription) -> bool {
        if let Some(status) = self.status {
            if prescription.status != status {
                return false;
            }
        }

        if let Some(patient) = self.patient.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            if !prescription
                .patient_name
                .to_lowercase()
                .contains(&patient.to_lowercase())
            {
                return false;
            }
        }

        true
    }
}
