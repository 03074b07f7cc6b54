//! EMR Pharmacy - Backend Service
//!
//! Drug inventory, prescription dispensing, counter sales and income
//! reporting for a hospital pharmacy.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod store;

pub use crate::config::Config;
pub use crate::store::{InMemoryStore, PharmacyStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PharmacyStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn PharmacyStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "EMR Pharmacy API v1.0"
}

/// Liveness probe
async fn health_check() -> &'static str {
    "OK"
}
