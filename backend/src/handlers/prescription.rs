//! HTTP handlers for the prescription queue

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{PaginatedResponse, Prescription, PrescriptionFilter, PrescriptionStatus};
use uuid::Uuid;

use super::page_params;
use crate::error::AppResult;
use crate::services::prescription::{
    CreatePrescriptionInput, PaymentInput, PaymentReceipt, PrescriptionService,
};
use crate::AppState;

/// Query parameters for listing prescriptions
#[derive(Debug, Deserialize)]
pub struct ListPrescriptionsQuery {
    pub status: Option<PrescriptionStatus>,
    pub patient: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

fn service(state: AppState) -> PrescriptionService {
    PrescriptionService::new(state.store, state.config)
}

pub async fn list_prescriptions(
    State(state): State<AppState>,
    Query(query): Query<ListPrescriptionsQuery>,
) -> AppResult<Json<PaginatedResponse<Prescription>>> {
    let pagination = page_params(query.page, query.per_page, &state.config);
    let filter = PrescriptionFilter {
        status: query.status,
        patient: query.patient,
    };
    Ok(Json(service(state).list(&filter, &pagination)?))
}

/// Queue a new prescription
pub async fn create_prescription(
    State(state): State<AppState>,
    Json(input): Json<CreatePrescriptionInput>,
) -> AppResult<(StatusCode, Json<Prescription>)> {
    let prescription = service(state).create(input)?;
    Ok((StatusCode::CREATED, Json(prescription)))
}

pub async fn get_prescription(
    State(state): State<AppState>,
    Path(prescription_id): Path<Uuid>,
) -> AppResult<Json<Prescription>> {
    Ok(Json(service(state).get(prescription_id)?))
}

/// Record payment for a dispensed prescription
pub async fn record_payment(
    State(state): State<AppState>,
    Path(prescription_id): Path<Uuid>,
    Json(input): Json<PaymentInput>,
) -> AppResult<Json<PaymentReceipt>> {
    Ok(Json(service(state).record_payment(prescription_id, input)?))
}

/// Mark a paid prescription as collected
pub async fn dispatch_prescription(
    State(state): State<AppState>,
    Path(prescription_id): Path<Uuid>,
) -> AppResult<Json<Prescription>> {
    Ok(Json(service(state).dispatch(prescription_id)?))
}
