//! Business logic services for the EMR Pharmacy platform

pub mod dispensing;
pub mod inventory;
pub mod notification;
pub mod prescription;
pub mod reporting;
pub mod sales;

pub use dispensing::DispensingService;
pub use inventory::InventoryService;
pub use notification::NotificationService;
pub use prescription::PrescriptionService;
pub use reporting::ReportingService;
pub use sales::SalesService;

use chrono::{NaiveDate, Utc};

/// Reference date for stock status derivation
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
