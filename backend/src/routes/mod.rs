//! Route definitions for the EMR Pharmacy API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/drugs", drug_routes())
        .nest("/prescriptions", prescription_routes())
        .nest("/sales", sales_routes())
        .nest("/notifications", notification_routes())
        .nest("/reports", report_routes())
}

/// Drug inventory routes
fn drug_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_drugs).post(handlers::add_drug))
        .route("/low-stock", get(handlers::list_low_stock))
        .route("/expired", get(handlers::list_expired))
        .route("/expiring", get(handlers::list_expiring))
        .route("/summary", get(handlers::get_inventory_summary))
        .route(
            "/:drug_id",
            get(handlers::get_drug)
                .put(handlers::update_drug)
                .delete(handlers::delete_drug),
        )
        .route("/:drug_id/restock", post(handlers::restock_drug))
        .route("/:drug_id/dispose", post(handlers::dispose_drug))
}

/// Prescription queue and dispensing routes
fn prescription_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_prescriptions).post(handlers::create_prescription),
        )
        .route("/:prescription_id", get(handlers::get_prescription))
        .route(
            "/:prescription_id/review",
            get(handlers::open_dispense_review),
        )
        .route("/:prescription_id/dispense", post(handlers::submit_dispense))
        .route("/:prescription_id/payment", post(handlers::record_payment))
        .route(
            "/:prescription_id/dispatch",
            post(handlers::dispatch_prescription),
        )
}

/// Point of sale routes
fn sales_routes() -> Router<AppState> {
    Router::new()
        .route("/quote", post(handlers::quote_sale))
        .route("/checkout", post(handlers::checkout_sale))
}

/// Activity feed routes
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_notifications))
        .route("/unread-count", get(handlers::get_unread_count))
        .route("/mark-all-read", post(handlers::mark_all_notifications_read))
        .route("/:notification_id/read", post(handlers::mark_notification_read))
}

/// Finance report routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/income", get(handlers::get_income_report))
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/invoices", get(handlers::list_invoices))
}
