//! Reporting service for finance and dashboard metrics

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    paginate, summarize_income, DateRange, IncomeSummary, InventoryStatus, Invoice,
    InvoiceFilter, PaginatedResponse, Pagination, PrescriptionStatus,
};

use super::today;
use crate::config::Config;
use crate::error::AppResult;
use crate::store::PharmacyStore;

#[derive(Clone)]
pub struct ReportingService {
    store: Arc<dyn PharmacyStore>,
    config: Arc<Config>,
}

/// Income summary in the pharmacy's currency
#[derive(Debug, Clone, Serialize)]
pub struct IncomeReport {
    pub currency: String,
    #[serde(flatten)]
    pub summary: IncomeSummary,
}

/// Dashboard metrics
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DashboardMetrics {
    pub total_drugs: usize,
    pub in_stock: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub expired: usize,
    pub pending_prescriptions: usize,
    pub processing_prescriptions: usize,
    /// Paid but not yet collected
    pub awaiting_collection: usize,
    pub today_income: Decimal,
    pub outstanding: Decimal,
    pub unread_notifications: usize,
    pub stock_value: Decimal,
    pub currency: String,
}

impl ReportingService {
    pub fn new(store: Arc<dyn PharmacyStore>, config: Arc<Config>) -> Self {
        Self { store, config }
    }

    /// Income over an inclusive date range
    pub fn income(&self, range: DateRange) -> AppResult<IncomeReport> {
        let invoices = self.store.invoices()?;
        let summary = summarize_income(&invoices, &range);

        tracing::debug!(
            start = %range.start,
            end = %range.end,
            invoices = summary.invoice_count,
            "income report generated"
        );
        Ok(IncomeReport {
            currency: self.config.pharmacy.currency.clone(),
            summary,
        })
    }

    /// List invoices, most recent first
    pub fn list_invoices(
        &self,
        filter: &InvoiceFilter,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<Invoice>> {
        let pagination = pagination.normalized(self.config.pharmacy.max_per_page);
        let matching: Vec<Invoice> = self
            .store
            .invoices()?
            .into_iter()
            .rev()
            .filter(|i| filter.matches(i))
            .collect();
        Ok(paginate(matching, &pagination))
    }

    pub fn dashboard(&self) -> AppResult<DashboardMetrics> {
        let today = today();
        let mut metrics = DashboardMetrics {
            total_drugs: 0,
            in_stock: 0,
            low_stock: 0,
            out_of_stock: 0,
            expired: 0,
            pending_prescriptions: 0,
            processing_prescriptions: 0,
            awaiting_collection: 0,
            today_income: Decimal::ZERO,
            outstanding: Decimal::ZERO,
            unread_notifications: 0,
            stock_value: Decimal::ZERO,
            currency: self.config.pharmacy.currency.clone(),
        };

        for drug in self.store.drugs()? {
            metrics.total_drugs += 1;
            match drug.status(today) {
                InventoryStatus::InStock => metrics.in_stock += 1,
                InventoryStatus::LowStock => metrics.low_stock += 1,
                InventoryStatus::OutOfStock => metrics.out_of_stock += 1,
                InventoryStatus::Expired => {
                    metrics.expired += 1;
                    continue;
                }
            }
            metrics.stock_value = metrics.stock_value.saturating_add(drug.stock_value());
        }

        for prescription in self.store.prescriptions()? {
            match prescription.status {
                PrescriptionStatus::Pending => metrics.pending_prescriptions += 1,
                PrescriptionStatus::Processing => metrics.processing_prescriptions += 1,
                PrescriptionStatus::Paid => metrics.awaiting_collection += 1,
                PrescriptionStatus::Collected => {}
            }
        }

        let invoices = self.store.invoices()?;
        let today_summary = summarize_income(&invoices, &DateRange::single_day(today));
        metrics.today_income = today_summary.total_income;
        metrics.outstanding = invoices
            .iter()
            .filter(|i| !i.is_paid())
            .map(|i| i.total)
            .sum();

        metrics.unread_notifications = self
            .store
            .notifications()?
            .iter()
            .filter(|n| !n.is_read)
            .count();

        Ok(metrics)
    }
}
