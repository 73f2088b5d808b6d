//! Property-style tests for the pricing calculator.
//!
//! These exercise the documented invariants over a grid of inputs,
//! complementing the example-based unit tests in the core crate.

use std::str::FromStr;

use rust_decimal::Decimal;

use dragon_bundle_core::{BundleLineItem, DiscountRule, compute_pricing};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).expect("valid decimal literal")
}

fn item(price: &str, quantity: u32) -> BundleLineItem {
    BundleLineItem {
        product_id: "gid://shopify/Product/1".to_string(),
        variant_id: "gid://shopify/ProductVariant/1".to_string(),
        unit_price: dec(price),
        quantity,
    }
}

fn sample_baskets() -> Vec<Vec<BundleLineItem>> {
    vec![
        vec![],
        vec![item("0.00", 1)],
        vec![item("9.99", 1), item("0.01", 1)],
        vec![item("10.00", 2), item("5.00", 1)],
        vec![item("0.10", 3)],
        vec![item("1234.56", 7), item("0.99", 13)],
    ]
}

fn sample_discounts() -> Vec<DiscountRule> {
    vec![
        DiscountRule::Percentage(dec("0")),
        DiscountRule::Percentage(dec("10")),
        DiscountRule::Percentage(dec("33.33")),
        DiscountRule::Percentage(dec("100")),
        DiscountRule::FixedAmount(dec("0")),
        DiscountRule::FixedAmount(dec("5.00")),
        DiscountRule::FixedAmount(dec("100000")),
    ]
}

#[test]
fn net_total_is_never_negative() {
    for items in sample_baskets() {
        for discount in sample_discounts() {
            let result = compute_pricing(&items, &discount);
            assert!(
                result.net_total >= Decimal::ZERO,
                "net went negative for {discount:?}"
            );
        }
    }
}

#[test]
fn savings_equals_gross_minus_net() {
    for items in sample_baskets() {
        for discount in sample_discounts() {
            let result = compute_pricing(&items, &discount);
            assert_eq!(result.savings, result.gross_total - result.net_total);
        }
    }
}

#[test]
fn zero_discount_is_identity() {
    for items in sample_baskets() {
        for discount in [
            DiscountRule::Percentage(Decimal::ZERO),
            DiscountRule::FixedAmount(Decimal::ZERO),
        ] {
            let result = compute_pricing(&items, &discount);
            assert_eq!(result.net_total, result.gross_total);
            assert_eq!(result.savings, Decimal::ZERO);
        }
    }
}

#[test]
fn pricing_is_deterministic() {
    for items in sample_baskets() {
        for discount in sample_discounts() {
            let first = compute_pricing(&items, &discount);
            let second = compute_pricing(&items, &discount);
            assert_eq!(first.gross_total, second.gross_total);
            assert_eq!(first.discount_amount, second.discount_amount);
            assert_eq!(first.net_total, second.net_total);
            assert_eq!(first.savings, second.savings);
        }
    }
}

#[test]
fn decimal_arithmetic_has_no_float_drift() {
    // 0.10 * 3 must be exactly 0.30, not 0.30000000000000004
    let items = vec![item("0.10", 3)];
    let result = compute_pricing(&items, &DiscountRule::Percentage(Decimal::ZERO));
    assert_eq!(result.gross_total, dec("0.30"));
}

#[test]
fn oversized_fixed_discount_clamps_to_free() {
    let items = vec![item("10.00", 2), item("5.00", 1)];
    let result = compute_pricing(&items, &DiscountRule::FixedAmount(dec("30.00")));

    assert_eq!(result.gross_total, dec("25.00"));
    assert_eq!(result.net_total, Decimal::ZERO);
    // Savings reflect what the buyer actually avoided paying, not the
    // nominal discount
    assert_eq!(result.savings, dec("25.00"));
}

#[test]
fn full_percentage_makes_bundle_free() {
    let items = vec![item("19.99", 1), item("5.01", 2)];
    let result = compute_pricing(&items, &DiscountRule::Percentage(dec("100")));
    assert_eq!(result.net_total, Decimal::ZERO);
    assert_eq!(result.savings, result.gross_total);
}

#[test]
fn worked_example_ten_percent_off() {
    // 2 x 10.00 + 1 x 5.00 at 10% off
    let items = vec![item("10.00", 2), item("5.00", 1)];
    let result = compute_pricing(&items, &DiscountRule::Percentage(dec("10")));

    assert_eq!(result.gross_total, dec("25.00"));
    assert_eq!(result.discount_amount, dec("2.50"));
    assert_eq!(result.net_total, dec("22.50"));
    assert_eq!(result.savings, dec("2.50"));
}
