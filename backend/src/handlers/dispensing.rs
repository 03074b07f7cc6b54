//! HTTP handlers for the dispensing review

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::dispensing::{
    DispenseOutcome, DispenseReview, DispensingService, SubmitDispenseInput,
};
use crate::AppState;

/// Open the dispensing review for a pending prescription
pub async fn open_dispense_review(
    State(state): State<AppState>,
    Path(prescription_id): Path<Uuid>,
) -> AppResult<Json<DispenseReview>> {
    let service = DispensingService::new(state.store, state.config);
    Ok(Json(service.open_review(prescription_id)?))
}

/// Submit the reviewed quantities
pub async fn submit_dispense(
    State(state): State<AppState>,
    Path(prescription_id): Path<Uuid>,
    Json(input): Json<SubmitDispenseInput>,
) -> AppResult<Json<DispenseOutcome>> {
    let service = DispensingService::new(state.store, state.config);
    Ok(Json(service.submit(prescription_id, input)?))
}
