//! Domain models for the EMR Pharmacy platform

mod dispensing;
mod drug;
mod finance;
mod notification;
mod prescription;
mod sale;

pub use dispensing::*;
pub use drug::*;
pub use finance::*;
pub use notification::*;
pub use prescription::*;
pub use sale::*;
