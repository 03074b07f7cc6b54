//! Shared types and models for the EMR Pharmacy platform
//!
//! This crate contains the pharmacy business rules shared between the backend,
//! the browser screens (via WASM), and other components of the system.

pub mod error;
pub mod models;
pub mod types;
pub mod validation;

pub use error::*;
pub use models::*;
pub use types::*;
pub use validation::*;
