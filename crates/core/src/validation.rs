//! Bundle composition rules.
//!
//! Applied at the create/update boundary, not inside the pricing calculator
//! (the calculator accepts any non-negative item list). A bundle must name at
//! least [`MIN_BUNDLE_ITEMS`] distinct product/variant pairs and at most
//! [`MAX_BUNDLE_ITEMS`] items in total.

use std::collections::HashSet;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::pricing::{BundleLineItem, DiscountRule};

/// Minimum number of distinct product/variant pairs in a bundle.
pub const MIN_BUNDLE_ITEMS: usize = 2;

/// Maximum number of line items in a bundle.
pub const MAX_BUNDLE_ITEMS: usize = 6;

/// A user-correctable problem with a bundle's composition.
///
/// Rendered to clients verbatim as a 400 `{"error": message}` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Fewer than [`MIN_BUNDLE_ITEMS`] distinct product/variant pairs.
    #[error("bundle needs at least 2 items")]
    TooFewItems,

    /// More than [`MAX_BUNDLE_ITEMS`] line items.
    #[error("bundle exceeds max items")]
    TooManyItems,

    /// Discount type tag was not `percentage` or `fixed`.
    #[error("invalid discount type")]
    InvalidDiscountType,

    /// Title was empty or whitespace-only.
    #[error("title required")]
    TitleRequired,

    /// A line item's quantity was zero.
    #[error("item quantity must be at least 1")]
    ZeroQuantity,

    /// A line item's unit price was negative.
    #[error("item price cannot be negative")]
    NegativePrice,

    /// Percentage discount outside 0-100.
    #[error("percentage discount must be between 0 and 100")]
    PercentageOutOfRange,

    /// Fixed discount below zero.
    #[error("fixed discount cannot be negative")]
    NegativeFixedDiscount,
}

/// Validate a bundle's title, line items, and discount rule.
///
/// # Errors
///
/// Returns the first rule the bundle breaks, in the order: title, item count,
/// per-item fields, discount range.
pub fn validate_bundle(
    title: &str,
    items: &[BundleLineItem],
    discount: &DiscountRule,
) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::TitleRequired);
    }

    if items.len() > MAX_BUNDLE_ITEMS {
        return Err(ValidationError::TooManyItems);
    }

    let distinct_variants: HashSet<(&str, &str)> = items
        .iter()
        .map(|item| (item.product_id.as_str(), item.variant_id.as_str()))
        .collect();
    if distinct_variants.len() < MIN_BUNDLE_ITEMS {
        return Err(ValidationError::TooFewItems);
    }

    for item in items {
        if item.quantity == 0 {
            return Err(ValidationError::ZeroQuantity);
        }
        if item.unit_price < Decimal::ZERO {
            return Err(ValidationError::NegativePrice);
        }
    }

    match discount {
        DiscountRule::Percentage(percent) => {
            if *percent < Decimal::ZERO || *percent > Decimal::ONE_HUNDRED {
                return Err(ValidationError::PercentageOutOfRange);
            }
        }
        DiscountRule::FixedAmount(amount) => {
            if *amount < Decimal::ZERO {
                return Err(ValidationError::NegativeFixedDiscount);
            }
        }
    }

    Ok(())
}
