//! Drug inventory models and stock status derivation

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A drug held in the pharmacy inventory catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Drug {
    pub id: Uuid,
    pub name: String,
    pub generic_name: Option<String>,
    /// Therapeutic category (e.g., "Antibiotic", "Analgesic")
    pub category: String,
    pub unit_price: Decimal,
    /// Units on hand
    pub quantity: u32,
    /// Stock below this level is flagged low-stock
    pub reorder_level: u32,
    pub expiry_date: NaiveDate,
    pub batch_number: Option<String>,
    pub supplier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Drug {
    /// Current stock status as of `today`
    pub fn status(&self, today: NaiveDate) -> InventoryStatus {
        derive_inventory_status(self.quantity, self.reorder_level, self.expiry_date, today)
    }

    /// Value of the units on hand at the current unit price
    pub fn stock_value(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }

    /// True when the drug expires on or before `today + days` but has not expired yet.
    /// A window reaching past the last representable date has no upper bound.
    pub fn expires_within(&self, today: NaiveDate, days: u32) -> bool {
        if self.expiry_date < today {
            return false;
        }
        match today.checked_add_signed(chrono::Duration::days(i64::from(days))) {
            Some(horizon) => self.expiry_date <= horizon,
            None => true,
        }
    }
}

/// Stock status of an inventory item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InventoryStatus {
    InStock,
    LowStock,
    OutOfStock,
    Expired,
}

impl InventoryStatus {
    /// Whether stock in this status may be dispensed or sold
    pub fn is_dispensable(&self) -> bool {
        matches!(self, InventoryStatus::InStock | InventoryStatus::LowStock)
    }

    /// Whether the item needs reordering attention
    pub fn needs_reorder(&self) -> bool {
        matches!(self, InventoryStatus::LowStock | InventoryStatus::OutOfStock)
    }
}

impl std::fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InventoryStatus::InStock => write!(f, "In Stock"),
            InventoryStatus::LowStock => write!(f, "Low Stock"),
            InventoryStatus::OutOfStock => write!(f, "Out of Stock"),
            InventoryStatus::Expired => write!(f, "Expired"),
        }
    }
}

/// Derive the stock status of an item.
///
/// Expiry takes precedence over quantity: an expired batch is `Expired`
/// even when it still has units on hand. A drug expiring on `reference_date`
/// is still usable that day.
pub fn derive_inventory_status(
    quantity: u32,
    reorder_level: u32,
    expiry_date: NaiveDate,
    reference_date: NaiveDate,
) -> InventoryStatus {
    if expiry_date < reference_date {
        InventoryStatus::Expired
    } else if quantity == 0 {
        InventoryStatus::OutOfStock
    } else if quantity < reorder_level {
        InventoryStatus::LowStock
    } else {
        InventoryStatus::InStock
    }
}

/// Filter for drug list screens. All present criteria must match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrugFilter {
    /// Case-insensitive substring of the brand or generic name
    pub search: Option<String>,
    /// Exact category
    pub category: Option<String>,
    pub status: Option<InventoryStatus>,
}

impl DrugFilter {
    pub fn matches(&self, drug: &Drug, today: NaiveDate) -> bool {
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let in_name = drug.name.to_lowercase().contains(&needle);
            let in_generic = drug
                .generic_name
                .as_ref()
                .is_some_and(|g| g.to_lowercase().contains(&needle));
            if !in_name && !in_generic {
                return false;
            }
        }

        if let Some(category) = &self.category {
            if &drug.category != category {
                return false;
            }
        }

        if let Some(status) = self.status {
            if drug.status(today) != status {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn drug(name: &str, quantity: u32, reorder_level: u32, expiry: NaiveDate) -> Drug {
        let now = Utc::now();
        Drug {
            id: Uuid::new_v4(),
            name: name.to_string(),
            generic_name: None,
            category: "Analgesic".to_string(),
            unit_price: Decimal::new(250, 2),
            quantity,
            reorder_level,
            expiry_date: expiry,
            batch_number: None,
            supplier: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_out_of_stock_regardless_of_reorder_level() {
        let today = date(2024, 6, 1);
        for reorder in [0, 1, 20, 1000] {
            assert_eq!(
                derive_inventory_status(0, reorder, date(2025, 1, 1), today),
                InventoryStatus::OutOfStock
            );
        }
    }

    #[test]
    fn test_low_stock() {
        let today = date(2024, 6, 1);
        assert_eq!(
            derive_inventory_status(5, 20, date(2025, 1, 1), today),
            InventoryStatus::LowStock
        );
    }

    #[test]
    fn test_at_reorder_level_is_in_stock() {
        let today = date(2024, 6, 1);
        assert_eq!(
            derive_inventory_status(20, 20, date(2025, 1, 1), today),
            InventoryStatus::InStock
        );
    }

    #[test]
    fn test_expiry_checked_before_quantity() {
        let today = date(2024, 6, 1);
        assert_eq!(
            derive_inventory_status(0, 10, date(2024, 5, 31), today),
            InventoryStatus::Expired
        );
        assert_eq!(
            derive_inventory_status(500, 10, date(2024, 5, 31), today),
            InventoryStatus::Expired
        );
    }

    #[test]
    fn test_expiring_today_is_not_expired() {
        let today = date(2024, 6, 1);
        assert_eq!(
            derive_inventory_status(50, 10, today, today),
            InventoryStatus::InStock
        );
    }

    #[test]
    fn test_dispensable_statuses() {
        assert!(InventoryStatus::InStock.is_dispensable());
        assert!(InventoryStatus::LowStock.is_dispensable());
        assert!(!InventoryStatus::OutOfStock.is_dispensable());
        assert!(!InventoryStatus::Expired.is_dispensable());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&InventoryStatus::OutOfStock).unwrap();
        assert_eq!(json, "\"out_of_stock\"");
    }

    #[test]
    fn test_expires_within() {
        let today = date(2024, 6, 1);
        let d = drug("Amoxicillin", 10, 5, date(2024, 7, 1));
        assert!(d.expires_within(today, 30));
        assert!(!d.expires_within(today, 29));

        let expired = drug("Old", 10, 5, date(2024, 5, 1));
        assert!(!expired.expires_within(today, 90));
    }

    #[test]
    fn test_expires_within_window_past_last_date() {
        let today = date(2024, 6, 1);
        let d = drug("Amoxicillin", 10, 5, date(2030, 1, 1));
        assert!(d.expires_within(today, u32::MAX));

        let expired = drug("Old", 10, 5, date(2024, 5, 1));
        assert!(!expired.expires_within(today, u32::MAX));
    }

    #[test]
    fn test_filter_combines_with_and() {
        let today = date(2024, 6, 1);
        let mut paracetamol = drug("Panadol", 100, 10, date(2025, 1, 1));
        paracetamol.generic_name = Some("Paracetamol".to_string());
        let ibuprofen = drug("Brufen", 3, 10, date(2025, 1, 1));

        let by_generic = DrugFilter {
            search: Some("PARACET".to_string()),
            ..Default::default()
        };
        assert!(by_generic.matches(&paracetamol, today));
        assert!(!by_generic.matches(&ibuprofen, today));

        let low_analgesics = DrugFilter {
            search: None,
            category: Some("Analgesic".to_string()),
            status: Some(InventoryStatus::LowStock),
        };
        assert!(low_analgesics.matches(&ibuprofen, today));
        assert!(!low_analgesics.matches(&paracetamol, today));

        let wrong_category = DrugFilter {
            category: Some("Antibiotic".to_string()),
            ..Default::default()
        };
        assert!(!wrong_category.matches(&ibuprofen, today));
    }

    #[test]
    fn test_blank_search_matches_everything() {
        let today = date(2024, 6, 1);
        let filter = DrugFilter {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&drug("Anything", 1, 1, date(2025, 1, 1)), today));
    }

    #[test]
    fn test_stock_value() {
        let d = drug("Panadol", 4, 1, date(2025, 1, 1));
        assert_eq!(d.stock_value(), Decimal::new(1000, 2));
    }

    #[test]
    fn test_stock_value_saturates() {
        let mut d = drug("Panadol", u32::MAX, 1, date(2025, 1, 1));
        d.unit_price = Decimal::MAX;
        assert_eq!(d.stock_value(), Decimal::MAX);
    }
}
