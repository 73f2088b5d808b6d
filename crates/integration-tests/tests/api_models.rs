//! Wire formats for API request and response bodies.
//!
//! Pins the JSON shapes the embedded UI depends on: decimals as strings,
//! the flattened discount pair, and snake_case field names.

#![allow(clippy::unwrap_used)]

use std::str::FromStr;

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;

use dragon_bundle_core::{BundleLineItem, DiscountRule, compute_pricing};
use dragon_bundle_server::models::{Bundle, UpdateBundleInput};
use dragon_bundle_server::shopify::ProductPage;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn sample_bundle() -> Bundle {
    Bundle {
        id: 42.into(),
        shop_domain: "demo.myshopify.com".to_string(),
        title: "Tea Starter Pack".to_string(),
        description: Some("Two teas, one pot".to_string()),
        cover_image_url: None,
        discount: DiscountRule::Percentage(dec("10")),
        items: vec![BundleLineItem {
            product_id: "gid://shopify/Product/1".to_string(),
            variant_id: "gid://shopify/ProductVariant/11".to_string(),
            unit_price: dec("12.50"),
            quantity: 2,
        }],
        is_active: true,
        created_at: Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap(),
    }
}

#[test]
fn bundle_serializes_with_flattened_discount() {
    let value = serde_json::to_value(sample_bundle()).unwrap();

    assert_eq!(value["id"], 42);
    assert_eq!(value["discount_type"], "percentage");
    assert_eq!(value["discount_value"], "10");
    // Decimals ride as strings so clients never see float artifacts
    assert_eq!(value["items"][0]["unit_price"], "12.50");
    assert_eq!(value["items"][0]["quantity"], 2);
}

#[test]
fn bundle_round_trips_through_json() {
    let bundle = sample_bundle();
    let json = serde_json::to_string(&bundle).unwrap();
    let back: Bundle = serde_json::from_str(&json).unwrap();

    assert_eq!(back.id, bundle.id);
    assert_eq!(back.discount, bundle.discount);
    assert_eq!(back.items, bundle.items);
}

#[test]
fn pricing_result_uses_string_decimals() {
    let bundle = sample_bundle();
    let pricing = compute_pricing(&bundle.items, &bundle.discount);
    let value = serde_json::to_value(pricing).unwrap();

    // All four amounts ride as JSON strings
    for field in ["gross_total", "discount_amount", "net_total", "savings"] {
        assert!(value[field].is_string(), "{field} should be a string");
    }

    assert_eq!(dec(value["gross_total"].as_str().unwrap()), dec("25.00"));
    assert_eq!(dec(value["net_total"].as_str().unwrap()), dec("22.50"));
    assert_eq!(dec(value["savings"].as_str().unwrap()), dec("2.50"));
}

#[test]
fn update_input_treats_absent_fields_as_keep() {
    let input: UpdateBundleInput = serde_json::from_value(json!({
        "title": "Renamed Pack"
    }))
    .unwrap();

    assert_eq!(input.title.as_deref(), Some("Renamed Pack"));
    assert!(input.items.is_none());
    assert!(input.discount_type.is_none());
    assert!(input.discount_value.is_none());
    assert!(input.is_active.is_none());
}

#[test]
fn product_page_round_trips() {
    let page: ProductPage = serde_json::from_value(json!({
        "products": [{
            "id": "gid://shopify/Product/1",
            "title": "Dragon Tea",
            "handle": "dragon-tea",
            "image_url": null,
            "variants": [{
                "id": "gid://shopify/ProductVariant/11",
                "title": "Default",
                "price": "12.50",
                "available_for_sale": true
            }]
        }],
        "has_next_page": false,
        "end_cursor": null
    }))
    .unwrap();

    assert_eq!(page.products.len(), 1);
    assert_eq!(page.products[0].variants[0].price, dec("12.50"));
    assert!(!page.has_next_page);
}
