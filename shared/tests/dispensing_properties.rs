//! Dispensing and sale cart property tests
//!
//! Covers:
//! - Quantity bounds after every accepted adjustment
//! - Submission acceptance/rejection against stock and status
//! - Total invariance under line reordering
//! - Inventory status derivation is total and deterministic

use chrono::{Duration, NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    derive_inventory_status, DispensingCart, DispensingError, Drug, InventoryStatus,
    PrescribedItem, Prescription, PrescriptionStatus, SaleCart,
};
use uuid::Uuid;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn make_drug(quantity: u32, reorder_level: u32, price_cents: i64, expiry_offset_days: i64) -> Drug {
    let now = Utc::now();
    Drug {
        id: Uuid::new_v4(),
        name: format!("Drug-{}", &Uuid::new_v4().to_string()[..8]),
        generic_name: None,
        category: "General".to_string(),
        unit_price: Decimal::new(price_cents, 2),
        quantity,
        reorder_level,
        expiry_date: today() + Duration::days(expiry_offset_days),
        batch_number: None,
        supplier: None,
        created_at: now,
        updated_at: now,
    }
}

fn make_prescription(items: &[(Uuid, u32)]) -> Prescription {
    let now = Utc::now();
    Prescription {
        id: Uuid::new_v4(),
        patient_id: Uuid::new_v4(),
        patient_name: "Test Patient".to_string(),
        prescriber: "Dr. Test".to_string(),
        items: items
            .iter()
            .map(|(drug_id, quantity)| PrescribedItem {
                drug_id: *drug_id,
                drug_name: "Prescribed".to_string(),
                quantity: *quantity,
                instructions: None,
            })
            .collect(),
        status: PrescriptionStatus::Pending,
        invoice_id: None,
        created_at: now,
        updated_at: now,
    }
}

// ============================================================================
// Scenario Tests
// ============================================================================

#[test]
fn scenario_zero_quantity_is_out_of_stock() {
    let d = make_drug(0, 20, 100, 365);
    assert_eq!(d.status(today()), InventoryStatus::OutOfStock);
}

#[test]
fn scenario_five_under_reorder_twenty_is_low_stock() {
    let d = make_drug(5, 20, 100, 365);
    assert_eq!(d.status(today()), InventoryStatus::LowStock);
}

#[test]
fn scenario_prescribed_twenty_available_fifteen() {
    let d = make_drug(15, 5, 100, 365);
    let rx = make_prescription(&[(d.id, 20)]);
    let mut cart = DispensingCart::initialize(&rx, &[d.clone()], today());

    assert!(cart.set_quantity(d.id, 18).is_err());
    assert_eq!(cart.line(d.id).unwrap().quantity_dispensed, 20);
    assert!(cart.set_quantity(d.id, 15).is_ok());
    assert!(cart.submit().is_ok());
}

#[test]
fn scenario_expired_line_rejects_submission() {
    let expired = make_drug(100, 5, 100, -1);
    let rx = make_prescription(&[(expired.id, 2)]);
    let cart = DispensingCart::initialize(&rx, &[expired], today());

    assert!(matches!(
        cart.submit(),
        Err(DispensingError::Unavailable {
            status: InventoryStatus::Expired,
            ..
        })
    ));
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Accepted adjustments keep 1 <= dispensed <= min(prescribed, available);
    /// rejected ones leave the line untouched
    #[test]
    fn prop_set_quantity_bounds(
        prescribed in 1u32..100,
        available in 0u32..100,
        attempts in prop::collection::vec(0u32..150, 1..20)
    ) {
        let d = make_drug(available, 0, 100, 365);
        let rx = make_prescription(&[(d.id, prescribed)]);
        let mut cart = DispensingCart::initialize(&rx, &[d.clone()], today());

        for qty in attempts {
            let before = cart.line(d.id).unwrap().quantity_dispensed;
            match cart.set_quantity(d.id, qty) {
                Ok(()) => {
                    let after = cart.line(d.id).unwrap().quantity_dispensed;
                    prop_assert_eq!(after, qty);
                    prop_assert!(after >= 1);
                    prop_assert!(after <= prescribed.min(available));
                }
                Err(_) => {
                    prop_assert_eq!(cart.line(d.id).unwrap().quantity_dispensed, before);
                }
            }
        }
    }

    /// Submission is accepted exactly when every line is within stock and dispensable
    #[test]
    fn prop_submit_acceptance(
        lines in prop::collection::vec((1u32..50, 0u32..60, 0u32..30, -5i64..30), 1..6)
    ) {
        let drugs: Vec<Drug> = lines
            .iter()
            .map(|(_, available, reorder, expiry)| make_drug(*available, *reorder, 199, *expiry))
            .collect();
        let items: Vec<(Uuid, u32)> = drugs
            .iter()
            .zip(lines.iter())
            .map(|(d, (prescribed, ..))| (d.id, *prescribed))
            .collect();
        let rx = make_prescription(&items);
        let cart = DispensingCart::initialize(&rx, &drugs, today());

        let should_accept = cart
            .lines
            .iter()
            .all(|l| l.quantity_dispensed <= l.available && l.status.is_dispensable());

        prop_assert_eq!(cart.submit().is_ok(), should_accept);
    }

    /// The total equals the exact sum of subtotals and ignores line order
    #[test]
    fn prop_total_order_independent(
        lines in prop::collection::vec((1u32..40, 1i64..100_000), 1..8)
    ) {
        let drugs: Vec<Drug> = lines
            .iter()
            .map(|(_, price)| make_drug(1_000, 0, *price, 365))
            .collect();
        let items: Vec<(Uuid, u32)> = drugs
            .iter()
            .zip(lines.iter())
            .map(|(d, (qty, _))| (d.id, *qty))
            .collect();

        let forward = DispensingCart::initialize(&make_prescription(&items), &drugs, today());
        let mut reversed_items = items.clone();
        reversed_items.reverse();
        let backward = DispensingCart::initialize(&make_prescription(&reversed_items), &drugs, today());

        let expected: Decimal = lines
            .iter()
            .map(|(qty, price)| Decimal::new(*price, 2) * Decimal::from(*qty))
            .sum();

        prop_assert_eq!(forward.submit().unwrap().total, expected);
        prop_assert_eq!(backward.submit().unwrap().total, expected);
    }

    /// Status derivation is deterministic and follows the precedence order
    #[test]
    fn prop_status_derivation(
        quantity in 0u32..500,
        reorder in 0u32..500,
        expiry_offset in -400i64..400
    ) {
        let expiry = today() + Duration::days(expiry_offset);
        let status = derive_inventory_status(quantity, reorder, expiry, today());
        prop_assert_eq!(status, derive_inventory_status(quantity, reorder, expiry, today()));

        let expected = if expiry_offset < 0 {
            InventoryStatus::Expired
        } else if quantity == 0 {
            InventoryStatus::OutOfStock
        } else if quantity < reorder {
            InventoryStatus::LowStock
        } else {
            InventoryStatus::InStock
        };
        prop_assert_eq!(status, expected);
    }

    /// Sale totals: total = subtotal - discount, with discount clamped to [0, 100]
    #[test]
    fn prop_sale_totals(
        quantities in prop::collection::vec(1u32..20, 1..6),
        discount in -50i64..200
    ) {
        let mut cart = SaleCart::new();
        for qty in &quantities {
            let d = make_drug(50, 0, 250, 365);
            cart.add_item(&d, *qty, today()).unwrap();
        }
        cart.set_discount_percent(Decimal::from(discount));

        let totals = cart.totals();
        prop_assert!(totals.discount_percent >= Decimal::ZERO);
        prop_assert!(totals.discount_percent <= Decimal::ONE_HUNDRED);
        prop_assert_eq!(totals.total, totals.subtotal - totals.discount_amount);
        prop_assert!(totals.total >= Decimal::ZERO);
        prop_assert!(totals.total <= totals.subtotal);
    }

    /// Repeated adds of the same drug never exceed stock on hand
    #[test]
    fn prop_sale_merge_within_stock(
        stock in 1u32..50,
        adds in prop::collection::vec(1u32..20, 1..10)
    ) {
        let d = make_drug(stock, 0, 100, 365);
        let mut cart = SaleCart::new();
        for qty in adds {
            let _ = cart.add_item(&d, qty, today());
        }
        let held: u32 = cart.lines.iter().map(|l| l.quantity).sum();
        prop_assert!(held <= stock);
        prop_assert!(cart.lines.len() <= 1);
    }
}
