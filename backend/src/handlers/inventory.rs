//! HTTP handlers for drug inventory endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{DrugFilter, InventoryStatus, PaginatedResponse};
use uuid::Uuid;

use super::page_params;
use crate::error::AppResult;
use crate::services::inventory::{
    CreateDrugInput, DisposeInput, DrugView, InventoryService, InventorySummary, RestockInput,
    UpdateDrugInput,
};
use crate::AppState;

/// Query parameters for listing drugs
#[derive(Debug, Deserialize)]
pub struct ListDrugsQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<InventoryStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ExpiringQuery {
    pub days: Option<u32>,
}

fn service(state: AppState) -> InventoryService {
    InventoryService::new(state.store, state.config)
}

/// List drugs with optional search, category and status filters
pub async fn list_drugs(
    State(state): State<AppState>,
    Query(query): Query<ListDrugsQuery>,
) -> AppResult<Json<PaginatedResponse<DrugView>>> {
    let pagination = page_params(query.page, query.per_page, &state.config);
    let filter = DrugFilter {
        search: query.search,
        category: query.category,
        status: query.status,
    };
    let drugs = service(state).list_drugs(&filter, &pagination)?;
    Ok(Json(drugs))
}

pub async fn get_drug(
    State(state): State<AppState>,
    Path(drug_id): Path<Uuid>,
) -> AppResult<Json<DrugView>> {
    Ok(Json(service(state).get_drug(drug_id)?))
}

/// Add a drug to the catalog
pub async fn add_drug(
    State(state): State<AppState>,
    Json(input): Json<CreateDrugInput>,
) -> AppResult<(StatusCode, Json<DrugView>)> {
    let drug = service(state).add_drug(input)?;
    Ok((StatusCode::CREATED, Json(drug)))
}

pub async fn update_drug(
    State(state): State<AppState>,
    Path(drug_id): Path<Uuid>,
    Json(input): Json<UpdateDrugInput>,
) -> AppResult<Json<DrugView>> {
    Ok(Json(service(state).update_drug(drug_id, input)?))
}

pub async fn delete_drug(
    State(state): State<AppState>,
    Path(drug_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    service(state).delete_drug(drug_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Receive stock
pub async fn restock_drug(
    State(state): State<AppState>,
    Path(drug_id): Path<Uuid>,
    Json(input): Json<RestockInput>,
) -> AppResult<Json<DrugView>> {
    Ok(Json(service(state).restock(drug_id, input)?))
}

/// Write off stock
pub async fn dispose_drug(
    State(state): State<AppState>,
    Path(drug_id): Path<Uuid>,
    Json(input): Json<DisposeInput>,
) -> AppResult<Json<DrugView>> {
    Ok(Json(service(state).dispose(drug_id, input)?))
}

pub async fn list_low_stock(State(state): State<AppState>) -> AppResult<Json<Vec<DrugView>>> {
    Ok(Json(service(state).low_stock()?))
}

pub async fn list_expired(State(state): State<AppState>) -> AppResult<Json<Vec<DrugView>>> {
    Ok(Json(service(state).expired()?))
}

/// Drugs expiring within `days`, defaulting to the configured warning window
pub async fn list_expiring(
    State(state): State<AppState>,
    Query(query): Query<ExpiringQuery>,
) -> AppResult<Json<Vec<DrugView>>> {
    Ok(Json(service(state).expiring_within(query.days)?))
}

pub async fn get_inventory_summary(
    State(state): State<AppState>,
) -> AppResult<Json<InventorySummary>> {
    Ok(Json(service(state).summary()?))
}
