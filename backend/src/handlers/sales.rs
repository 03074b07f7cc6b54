//! HTTP handlers for counter sales

use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppResult;
use crate::services::sales::{SaleQuote, SaleReceipt, SaleRequest, SalesService};
use crate::AppState;

/// Price a basket without committing it
pub async fn quote_sale(
    State(state): State<AppState>,
    Json(request): Json<SaleRequest>,
) -> AppResult<Json<SaleQuote>> {
    let service = SalesService::new(state.store, state.config);
    Ok(Json(service.quote(&request)?))
}

/// Complete a counter sale
pub async fn checkout_sale(
    State(state): State<AppState>,
    Json(request): Json<SaleRequest>,
) -> AppResult<(StatusCode, Json<SaleReceipt>)> {
    let service = SalesService::new(state.store, state.config);
    let receipt = service.checkout(request)?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
