//! WebAssembly module for the EMR Pharmacy screens
//!
//! Provides client-side computation for:
//! - Stock status badges
//! - Dispensing quantity checks and totals
//! - Counter sale totals and discount clamping

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Sale cart as sent by the point-of-sale screen
#[derive(Debug, Deserialize)]
struct SaleCartInput {
    lines: Vec<SaleLine>,
    #[serde(default)]
    discount_percent: Decimal,
}

fn js_error(message: String) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::error_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, JsValue> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| js_error(format!("Invalid {} '{}': {}", field, value, e)))
}

/// Today's date in the browser as `YYYY-MM-DD`
#[wasm_bindgen]
pub fn browser_today() -> String {
    let iso: String = js_sys::Date::new_0().to_iso_string().into();
    iso.chars().take(10).collect()
}

/// Stock status (`in_stock`, `low_stock`, `out_of_stock`, `expired`) for an inventory row
#[wasm_bindgen]
pub fn inventory_status(
    quantity: u32,
    reorder_level: u32,
    expiry_iso: &str,
    today_iso: &str,
) -> Result<String, JsValue> {
    let expiry = parse_date(expiry_iso, "expiry date")?;
    let today = parse_date(today_iso, "reference date")?;

    let status = match derive_inventory_status(quantity, reorder_level, expiry, today) {
        InventoryStatus::InStock => "in_stock",
        InventoryStatus::LowStock => "low_stock",
        InventoryStatus::OutOfStock => "out_of_stock",
        InventoryStatus::Expired => "expired",
    };
    Ok(status.to_string())
}

/// Whether a dispensing quantity lies within `1..=min(prescribed, available)`
#[wasm_bindgen]
pub fn is_valid_dispense_quantity(requested: u32, prescribed: u32, available: u32) -> bool {
    validate_dispense_quantity(requested, prescribed, available).is_ok()
}

/// Totals for a counter sale cart; returns `SaleTotals` as JSON
#[wasm_bindgen]
pub fn calculate_sale_totals(cart_json: &str) -> Result<String, JsValue> {
    let input: SaleCartInput = serde_json::from_str(cart_json)
        .map_err(|e| js_error(format!("Invalid cart JSON: {}", e)))?;

    let mut cart = SaleCart::new();
    cart.lines = input.lines;
    cart.set_discount_percent(input.discount_percent);

    serde_json::to_string(&cart.totals())
        .map_err(|e| js_error(format!("Failed to encode totals: {}", e)))
}

/// Payable total of dispensing lines, as a decimal string
#[wasm_bindgen]
pub fn calculate_dispensing_total(lines_json: &str) -> Result<String, JsValue> {
    let lines: Vec<DispensingLine> = serde_json::from_str(lines_json)
        .map_err(|e| js_error(format!("Invalid lines JSON: {}", e)))?;

    let total: Decimal = lines.iter().map(DispensingLine::subtotal).sum();
    Ok(total.to_string())
}

/// Clamp a discount percentage into `[0, 100]`
#[wasm_bindgen]
pub fn clamp_discount(percent: f64) -> f64 {
    if percent.is_nan() {
        return 0.0;
    }
    let decimal = Decimal::try_from(percent).unwrap_or(if percent > 0.0 {
        Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    });
    clamp_discount_percent(decimal).to_f64().unwrap_or(0.0)
}
