//! Point-of-sale cart for over-the-counter drug sales

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Drug;
use crate::error::DispensingError;
use crate::validation::{clamp_discount_percent, validate_sale_quantity};

/// One drug in a sale cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaleLine {
    pub drug_id: Uuid,
    pub drug_name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    /// Stock on hand when the drug was added
    pub available: u32,
}

impl SaleLine {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Computed totals for a sale cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaleTotals {
    pub subtotal: Decimal,
    pub discount_percent: Decimal,
    pub discount_amount: Decimal,
    pub total: Decimal,
}

/// Cart accumulated at the pharmacy counter
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaleCart {
    pub lines: Vec<SaleLine>,
    /// Always within `[0, 100]`
    discount_percent: Decimal,
}

impl SaleCart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `qty` units of `drug`, merging with an existing line for the same drug.
    ///
    /// The merged quantity must stay within stock on hand, and expired or
    /// out-of-stock drugs cannot be sold.
    pub fn add_item(&mut self, drug: &Drug, qty: u32, today: NaiveDate) -> Result<(), DispensingError> {
        let status = drug.status(today);
        if !status.is_dispensable() {
            return Err(DispensingError::Unavailable {
                drug_id: drug.id,
                drug_name: drug.name.clone(),
                status,
            });
        }
        if qty < 1 {
            return Err(DispensingError::QuantityBelowMinimum);
        }

        match self.lines.iter_mut().find(|l| l.drug_id == drug.id) {
            Some(line) => {
                let merged = line.quantity.saturating_add(qty);
                validate_sale_quantity(merged, drug.quantity)?;
                line.quantity = merged;
                line.available = drug.quantity;
                line.unit_price = drug.unit_price;
            }
            None => {
                validate_sale_quantity(qty, drug.quantity)?;
                self.lines.push(SaleLine {
                    drug_id: drug.id,
                    drug_name: drug.name.clone(),
                    unit_price: drug.unit_price,
                    quantity: qty,
                    available: drug.quantity,
                });
            }
        }
        Ok(())
    }

    pub fn remove_item(&mut self, drug_id: Uuid) -> Result<SaleLine, DispensingError> {
        let index = self
            .lines
            .iter()
            .position(|l| l.drug_id == drug_id)
            .ok_or(DispensingError::UnknownLine(drug_id))?;
        Ok(self.lines.remove(index))
    }

    /// Replace the quantity of an existing line; rejected values leave it unchanged
    pub fn update_quantity(&mut self, drug_id: Uuid, qty: u32) -> Result<(), DispensingError> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.drug_id == drug_id)
            .ok_or(DispensingError::UnknownLine(drug_id))?;
        validate_sale_quantity(qty, line.available)?;
        line.quantity = qty;
        Ok(())
    }

    pub fn set_discount_percent(&mut self, percent: Decimal) {
        self.discount_percent = clamp_discount_percent(percent);
    }

    pub fn discount_percent(&self) -> Decimal {
        self.discount_percent
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn subtotal(&self) -> Decimal {
        self.lines
            .iter()
            .map(SaleLine::subtotal)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    pub fn discount_amount(&self) -> Decimal {
        discount_of(self.subtotal(), self.discount_percent)
    }

    pub fn total(&self) -> Decimal {
        self.subtotal() - self.discount_amount()
    }

    pub fn totals(&self) -> SaleTotals {
        let subtotal = self.subtotal();
        let discount_amount = discount_of(subtotal, self.discount_percent);
        SaleTotals {
            subtotal,
            discount_percent: self.discount_percent,
            discount_amount,
            total: subtotal - discount_amount,
        }
    }

    /// Final check before payment: the cart is non-empty and every line is within stock
    pub fn validate_checkout(&self) -> Result<(), DispensingError> {
        if self.lines.is_empty() {
            return Err(DispensingError::EmptyCart);
        }
        for line in &self.lines {
            if line.quantity > line.available {
                return Err(DispensingError::InsufficientStock {
                    drug_id: line.drug_id,
                    drug_name: line.drug_name.clone(),
                    available: line.available,
                    requested: line.quantity,
                });
            }
        }
        Ok(())
    }
}

/// `percent` is within `[0, 100]`, so the result never exceeds `subtotal`
fn discount_of(subtotal: Decimal, percent: Decimal) -> Decimal {
    subtotal * (percent / Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InventoryStatus;
    use chrono::Utc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn drug(name: &str, quantity: u32, price_cents: i64) -> Drug {
        let now = Utc::now();
        Drug {
            id: Uuid::new_v4(),
            name: name.to_string(),
            generic_name: None,
            category: "Analgesic".to_string(),
            unit_price: Decimal::new(price_cents, 2),
            quantity,
            reorder_level: 5,
            expiry_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            batch_number: None,
            supplier: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_add_item_merges_lines() {
        let para = drug("Paracetamol", 10, 50);
        let mut cart = SaleCart::new();
        cart.add_item(&para, 4, today()).unwrap();
        cart.add_item(&para, 3, today()).unwrap();

        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, 7);
    }

    #[test]
    fn test_add_item_merge_cannot_exceed_available() {
        let para = drug("Paracetamol", 10, 50);
        let mut cart = SaleCart::new();
        cart.add_item(&para, 8, today()).unwrap();

        assert_eq!(
            cart.add_item(&para, 3, today()),
            Err(DispensingError::ExceedsAvailable {
                available: 10,
                requested: 11
            })
        );
        assert_eq!(cart.lines[0].quantity, 8);
    }

    #[test]
    fn test_add_item_rejects_unavailable() {
        let empty = drug("Ibuprofen", 0, 80);
        let mut cart = SaleCart::new();
        assert!(matches!(
            cart.add_item(&empty, 1, today()),
            Err(DispensingError::Unavailable {
                status: InventoryStatus::OutOfStock,
                ..
            })
        ));

        let mut expired = drug("Aspirin", 50, 20);
        expired.expiry_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(matches!(
            cart.add_item(&expired, 1, today()),
            Err(DispensingError::Unavailable {
                status: InventoryStatus::Expired,
                ..
            })
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_item_rejects_zero() {
        let para = drug("Paracetamol", 10, 50);
        let mut cart = SaleCart::new();
        assert_eq!(
            cart.add_item(&para, 0, today()),
            Err(DispensingError::QuantityBelowMinimum)
        );
    }

    #[test]
    fn test_update_and_remove() {
        let para = drug("Paracetamol", 10, 50);
        let mut cart = SaleCart::new();
        cart.add_item(&para, 2, today()).unwrap();

        assert!(cart.update_quantity(para.id, 11).is_err());
        assert!(cart.update_quantity(para.id, 0).is_err());
        assert_eq!(cart.lines[0].quantity, 2);

        cart.update_quantity(para.id, 10).unwrap();
        assert_eq!(cart.lines[0].quantity, 10);

        let removed = cart.remove_item(para.id).unwrap();
        assert_eq!(removed.drug_id, para.id);
        assert!(cart.is_empty());
        assert!(cart.remove_item(para.id).is_err());
    }

    #[test]
    fn test_totals_with_discount() {
        let para = drug("Paracetamol", 10, 500);
        let amox = drug("Amoxicillin", 10, 1250);
        let mut cart = SaleCart::new();
        cart.add_item(&para, 2, today()).unwrap();
        cart.add_item(&amox, 1, today()).unwrap();
        cart.set_discount_percent(Decimal::from(10));

        let totals = cart.totals();
        assert_eq!(totals.subtotal, Decimal::new(2250, 2));
        assert_eq!(totals.discount_amount, Decimal::new(225, 2));
        assert_eq!(totals.total, Decimal::new(2025, 2));
        assert_eq!(cart.total(), totals.total);
    }

    #[test]
    fn test_discount_is_clamped() {
        let para = drug("Paracetamol", 10, 500);
        let mut cart = SaleCart::new();
        cart.add_item(&para, 1, today()).unwrap();

        cart.set_discount_percent(Decimal::from(250));
        assert_eq!(cart.discount_percent(), Decimal::ONE_HUNDRED);
        assert_eq!(cart.total(), Decimal::ZERO);

        cart.set_discount_percent(Decimal::from(-20));
        assert_eq!(cart.discount_percent(), Decimal::ZERO);
        assert_eq!(cart.total(), cart.subtotal());
    }

    #[test]
    fn test_totals_saturate_on_huge_prices() {
        let mut costly = drug("Costly", 10, 0);
        costly.unit_price = Decimal::MAX;
        let mut cart = SaleCart::new();
        cart.add_item(&costly, 2, today()).unwrap();
        cart.set_discount_percent(Decimal::from(50));

        let totals = cart.totals();
        assert_eq!(totals.subtotal, Decimal::MAX);
        assert!(totals.discount_amount <= totals.subtotal);
        assert_eq!(totals.total, totals.subtotal - totals.discount_amount);
    }

    #[test]
    fn test_checkout_requires_items() {
        assert_eq!(SaleCart::new().validate_checkout(), Err(DispensingError::EmptyCart));
    }
}
