//! HTTP request handlers

mod dispensing;
mod health;
mod inventory;
mod notification;
mod prescription;
mod reporting;
mod sales;

pub use dispensing::*;
pub use health::*;
pub use inventory::*;
pub use notification::*;
pub use prescription::*;
pub use reporting::*;
pub use sales::*;

use shared::Pagination;

use crate::config::Config;

/// Page parameters from a list query, with missing values taken from configuration
pub(crate) fn page_params(page: Option<u32>, per_page: Option<u32>, config: &Config) -> Pagination {
    Pagination::new(
        page.unwrap_or(1),
        per_page.unwrap_or(config.pharmacy.default_per_page),
    )
}
