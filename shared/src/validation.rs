//! Validation utilities for the EMR Pharmacy platform

use rust_decimal::Decimal;

use crate::error::DispensingError;

// ============================================================================
// Quantity Validations
// ============================================================================

/// Validate a dispensing quantity: `1 <= requested <= min(prescribed, available)`
pub fn validate_dispense_quantity(
    requested: u32,
    prescribed: u32,
    available: u32,
) -> Result<(), DispensingError> {
    if requested < 1 {
        return Err(DispensingError::QuantityBelowMinimum);
    }
    if requested > prescribed {
        return Err(DispensingError::ExceedsPrescribed {
            prescribed,
            requested,
        });
    }
    if requested > available {
        return Err(DispensingError::ExceedsAvailable {
            available,
            requested,
        });
    }
    Ok(())
}

/// Validate a point-of-sale quantity: `1 <= requested <= available`
pub fn validate_sale_quantity(requested: u32, available: u32) -> Result<(), DispensingError> {
    if requested < 1 {
        return Err(DispensingError::QuantityBelowMinimum);
    }
    if requested > available {
        return Err(DispensingError::ExceedsAvailable {
            available,
            requested,
        });
    }
    Ok(())
}

// ============================================================================
// Pricing Validations
// ============================================================================

/// Highest accepted unit price, in whole currency units
pub const MAX_UNIT_PRICE: i64 = 1_000_000_000;

/// Validate that a unit price is within `[0, MAX_UNIT_PRICE]`
pub fn validate_unit_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Unit price cannot be negative");
    }
    if price > Decimal::from(MAX_UNIT_PRICE) {
        return Err("Unit price exceeds the maximum");
    }
    Ok(())
}

/// Clamp a discount percentage into `[0, 100]`
pub fn clamp_discount_percent(percent: Decimal) -> Decimal {
    percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate a required text field is present
pub fn validate_required(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Field is required");
    }
    Ok(())
}

/// Validate a stock movement (restock or disposal) moves at least one unit
pub fn validate_stock_movement(quantity: u32) -> Result<(), &'static str> {
    if quantity == 0 {
        return Err("Quantity must be at least 1");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispense_quantity_valid() {
        assert!(validate_dispense_quantity(1, 20, 15).is_ok());
        assert!(validate_dispense_quantity(15, 20, 15).is_ok());
        assert!(validate_dispense_quantity(20, 20, 30).is_ok());
    }

    #[test]
    fn test_dispense_quantity_invalid() {
        assert_eq!(
            validate_dispense_quantity(0, 20, 15),
            Err(DispensingError::QuantityBelowMinimum)
        );
        assert!(matches!(
            validate_dispense_quantity(21, 20, 30),
            Err(DispensingError::ExceedsPrescribed { .. })
        ));
        assert!(matches!(
            validate_dispense_quantity(18, 20, 15),
            Err(DispensingError::ExceedsAvailable { .. })
        ));
    }

    #[test]
    fn test_sale_quantity() {
        assert!(validate_sale_quantity(3, 3).is_ok());
        assert!(validate_sale_quantity(0, 3).is_err());
        assert!(validate_sale_quantity(4, 3).is_err());
    }

    #[test]
    fn test_unit_price() {
        assert!(validate_unit_price(Decimal::ZERO).is_ok());
        assert!(validate_unit_price(Decimal::new(1999, 2)).is_ok());
        assert!(validate_unit_price(Decimal::new(-1, 2)).is_err());
        assert!(validate_unit_price(Decimal::from(MAX_UNIT_PRICE)).is_ok());
        assert!(validate_unit_price(Decimal::from(MAX_UNIT_PRICE) + Decimal::new(1, 2)).is_err());
        assert!(validate_unit_price(Decimal::MAX).is_err());
    }

    #[test]
    fn test_clamp_discount() {
        assert_eq!(clamp_discount_percent(Decimal::from(-5)), Decimal::ZERO);
        assert_eq!(clamp_discount_percent(Decimal::from(15)), Decimal::from(15));
        assert_eq!(clamp_discount_percent(Decimal::from(150)), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_required() {
        assert!(validate_required("Amoxicillin").is_ok());
        assert!(validate_required("").is_err());
        assert!(validate_required("   ").is_err());
    }

    #[test]
    fn test_stock_movement() {
        assert!(validate_stock_movement(1).is_ok());
        assert!(validate_stock_movement(0).is_err());
    }
}
