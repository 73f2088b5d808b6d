//! Bundle line items, discount rules, and the pricing calculator.
//!
//! Pricing is derived data: it is recomputed on every read and never
//! persisted. All arithmetic uses [`rust_decimal::Decimal`] so currency
//! amounts never accumulate float rounding drift.
//!
//! The calculator itself accepts any non-negative item list; bundle
//! composition limits (2-6 items, distinct variants) are enforced at the
//! create/update boundary by [`crate::validation`], not here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// A single product variant within a bundle.
///
/// Owned exclusively by the bundle that contains it; there is no independent
/// line-item lifecycle. `unit_price` is the variant price captured when the
/// merchant built the bundle, in the shop's currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleLineItem {
    /// Shopify product ID (e.g., `gid://shopify/Product/123`).
    pub product_id: String,
    /// Shopify variant ID (e.g., `gid://shopify/ProductVariant/456`).
    pub variant_id: String,
    /// Price per unit in the shop's currency.
    pub unit_price: Decimal,
    /// Number of units of this variant in the bundle.
    pub quantity: u32,
}

/// The discount policy applied to a bundle's gross total.
///
/// Serializes as `{"discount_type": "percentage", "discount_value": "10"}`,
/// matching both the wire format and the two-column persisted layout.
/// Immutable once attached to a pricing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "discount_type", content = "discount_value", rename_all = "snake_case")]
pub enum DiscountRule {
    /// Percent off the gross total, 0-100.
    Percentage(Decimal),
    /// Fixed amount off the gross total, in the shop's currency.
    #[serde(rename = "fixed")]
    FixedAmount(Decimal),
}

impl DiscountRule {
    /// Reassemble a rule from its persisted `(discount_type, discount_value)`
    /// column pair.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDiscountType`] for an unknown type tag.
    pub fn from_parts(discount_type: &str, discount_value: Decimal) -> Result<Self, ValidationError> {
        match discount_type {
            "percentage" => Ok(Self::Percentage(discount_value)),
            "fixed" => Ok(Self::FixedAmount(discount_value)),
            _ => Err(ValidationError::InvalidDiscountType),
        }
    }

    /// The persisted type tag for this rule.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Percentage(_) => "percentage",
            Self::FixedAmount(_) => "fixed",
        }
    }

    /// The persisted numeric value for this rule.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        match self {
            Self::Percentage(v) | Self::FixedAmount(v) => *v,
        }
    }
}

/// The computed price breakdown for a bundle.
///
/// Derived, never persisted; recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingResult {
    /// Sum of `unit_price * quantity` over all line items.
    pub gross_total: Decimal,
    /// Amount the discount rule takes off the gross total (before clamping).
    pub discount_amount: Decimal,
    /// `gross_total - discount_amount`, clamped at zero.
    pub net_total: Decimal,
    /// `gross_total - net_total`; equals `discount_amount` unless clamping occurred.
    pub savings: Decimal,
}

/// Compute the price breakdown for a set of line items under a discount rule.
///
/// Pure and side-effect free; safe to call repeatedly and concurrently. An
/// empty item list yields an all-zero result. The discount can never push the
/// net total below zero.
#[must_use]
pub fn compute_pricing(items: &[BundleLineItem], discount: &DiscountRule) -> PricingResult {
    let gross_total: Decimal = items
        .iter()
        .map(|item| item.unit_price * Decimal::from(item.quantity))
        .sum();

    let discount_amount = match discount {
        DiscountRule::Percentage(percent) => gross_total * *percent / Decimal::ONE_HUNDRED,
        DiscountRule::FixedAmount(amount) => *amount,
    };

    let net_total = (gross_total - discount_amount).max(Decimal::ZERO);
    let savings = gross_total - net_total;

    PricingResult {
        gross_total,
        discount_amount,
        net_total,
        savings,
    }
}
