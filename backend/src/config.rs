//! Configuration management for the EMR Pharmacy service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with EMR__ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Pharmacy business settings
    pub pharmacy: PharmacyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PharmacyConfig {
    /// ISO currency code shown on invoices
    pub currency: String,

    /// Page size used when a list request does not name one
    pub default_per_page: u32,

    /// Upper bound on requested page sizes
    pub max_per_page: u32,

    /// Window for the "expiring soon" listing
    pub expiry_warning_days: u32,

    /// Emit low-stock / out-of-stock notifications after stock deductions
    pub low_stock_notifications: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("EMR_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("pharmacy.currency", "USD")?
            .set_default("pharmacy.default_per_page", 10)?
            .set_default("pharmacy.max_per_page", 100)?
            .set_default("pharmacy.expiry_warning_days", 90)?
            .set_default("pharmacy.low_stock_notifications", true)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (EMR__ prefix)
            .add_source(
                Environment::with_prefix("EMR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            pharmacy: PharmacyConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for PharmacyConfig {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            default_per_page: 10,
            max_per_page: 100,
            expiry_warning_days: 90,
            low_stock_notifications: true,
        }
    }
}
