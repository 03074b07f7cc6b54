//! EMR Pharmacy - Backend Server

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use emr_pharmacy_backend::{create_app, AppState, Config, InMemoryStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emr_pharmacy_server=debug,emr_pharmacy_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load().context("failed to load configuration")?;

    tracing::info!("Starting EMR Pharmacy Server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!(
        currency = %config.pharmacy.currency,
        expiry_warning_days = config.pharmacy.expiry_warning_days,
        "Pharmacy settings loaded"
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server host or port")?;

    let state = AppState::new(Arc::new(InMemoryStore::new()), config);
    let app = create_app(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
