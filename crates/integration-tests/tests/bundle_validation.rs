//! Validation of bundle payloads as they arrive over the wire.
//!
//! Parses JSON request bodies the way the API does, then runs them
//! through the same discount parsing and validation the create handler
//! uses.

#![allow(clippy::unwrap_used)]

use dragon_bundle_core::{DiscountRule, ValidationError, validate_bundle};
use dragon_bundle_server::models::CreateBundleInput;
use serde_json::json;

fn parse(body: serde_json::Value) -> CreateBundleInput {
    serde_json::from_value(body).expect("request body should deserialize")
}

fn validate(input: &CreateBundleInput) -> Result<DiscountRule, ValidationError> {
    let discount = DiscountRule::from_parts(&input.discount_type, input.discount_value)?;
    validate_bundle(&input.title, &input.items, &discount)?;
    Ok(discount)
}

fn two_items() -> serde_json::Value {
    json!([
        {
            "product_id": "gid://shopify/Product/1",
            "variant_id": "gid://shopify/ProductVariant/11",
            "unit_price": "10.00",
            "quantity": 2
        },
        {
            "product_id": "gid://shopify/Product/2",
            "variant_id": "gid://shopify/ProductVariant/21",
            "unit_price": "5.00",
            "quantity": 1
        }
    ])
}

#[test]
fn valid_create_body_passes() {
    let input = parse(json!({
        "title": "Tea Starter Pack",
        "discount_type": "percentage",
        "discount_value": "10",
        "items": two_items()
    }));

    let discount = validate(&input).expect("valid bundle");
    assert_eq!(discount, DiscountRule::Percentage("10".parse().unwrap()));
}

#[test]
fn fixed_discount_body_passes() {
    let input = parse(json!({
        "title": "Bundle",
        "discount_type": "fixed",
        "discount_value": "5.00",
        "items": two_items()
    }));

    assert!(validate(&input).is_ok());
}

#[test]
fn unknown_discount_type_rejected() {
    let input = parse(json!({
        "title": "Bundle",
        "discount_type": "bogo",
        "discount_value": "10",
        "items": two_items()
    }));

    assert_eq!(
        validate(&input).unwrap_err(),
        ValidationError::InvalidDiscountType
    );
}

#[test]
fn single_item_body_rejected() {
    let input = parse(json!({
        "title": "Solo",
        "discount_type": "percentage",
        "discount_value": "10",
        "items": [{
            "product_id": "gid://shopify/Product/1",
            "variant_id": "gid://shopify/ProductVariant/11",
            "unit_price": "10.00",
            "quantity": 1
        }]
    }));

    assert_eq!(validate(&input).unwrap_err(), ValidationError::TooFewItems);
}

#[test]
fn blank_title_rejected() {
    let input = parse(json!({
        "title": "   ",
        "discount_type": "percentage",
        "discount_value": "10",
        "items": two_items()
    }));

    assert_eq!(validate(&input).unwrap_err(), ValidationError::TitleRequired);
}

#[test]
fn percentage_above_hundred_rejected() {
    let input = parse(json!({
        "title": "Bundle",
        "discount_type": "percentage",
        "discount_value": "150",
        "items": two_items()
    }));

    assert_eq!(
        validate(&input).unwrap_err(),
        ValidationError::PercentageOutOfRange
    );
}

#[test]
fn is_active_defaults_to_true() {
    let input = parse(json!({
        "title": "Bundle",
        "discount_type": "percentage",
        "discount_value": "10",
        "items": two_items()
    }));

    assert!(input.is_active);
}
