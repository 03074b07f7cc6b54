//! HTTP handlers for finance reports and the dashboard

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use shared::{
    DateRange, Invoice, InvoiceFilter, InvoiceStatus, PaginatedResponse, PaymentMethod,
};

use super::page_params;
use crate::error::{AppError, AppResult};
use crate::services::reporting::{DashboardMetrics, IncomeReport, ReportingService};
use crate::services::today;
use crate::AppState;

/// Inclusive date range; defaults to the current month up to today
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl DateRangeQuery {
    fn resolve(&self) -> AppResult<DateRange> {
        let today = today();
        let end = self.end_date.unwrap_or(today);
        let start = match self.start_date {
            Some(start) => start,
            None => end.with_day(1).unwrap_or(end),
        };
        if start > end {
            return Err(AppError::validation(
                "start_date",
                "Start date must not be after end date",
            ));
        }
        Ok(DateRange::new(start, end))
    }
}

#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<InvoiceStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Income over a date range
pub async fn get_income_report(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<IncomeReport>> {
    let range = query.resolve()?;
    let service = ReportingService::new(state.store, state.config);
    Ok(Json(service.income(range)?))
}

/// Invoices, most recent first. No date range means all dates.
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<ListInvoicesQuery>,
) -> AppResult<Json<PaginatedResponse<Invoice>>> {
    let range = if query.start_date.is_some() || query.end_date.is_some() {
        Some(
            DateRangeQuery {
                start_date: query.start_date,
                end_date: query.end_date,
            }
            .resolve()?,
        )
    } else {
        None
    };
    let filter = InvoiceFilter {
        range,
        status: query.status,
        payment_method: query.payment_method,
    };
    let pagination = page_params(query.page, query.per_page, &state.config);

    let service = ReportingService::new(state.store, state.config);
    Ok(Json(service.list_invoices(&filter, &pagination)?))
}

pub async fn get_dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardMetrics>> {
    let service = ReportingService::new(state.store, state.config);
    Ok(Json(service.dashboard()?))
}
