//! Bundle domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use dragon_bundle_core::{BundleId, BundleLineItem, DiscountRule};

/// A merchant-defined product bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
    /// Unique bundle ID.
    pub id: BundleId,
    /// Shop that owns this bundle (myshopify domain).
    pub shop_domain: String,
    /// Display title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional cover image URL.
    pub cover_image_url: Option<String>,
    /// Discount applied to the bundle total.
    #[serde(flatten)]
    pub discount: DiscountRule,
    /// Line items making up the bundle.
    pub items: Vec<BundleLineItem>,
    /// Whether the bundle is offered on the storefront.
    pub is_active: bool,
    /// When the bundle was created.
    pub created_at: DateTime<Utc>,
    /// When the bundle was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new bundle.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBundleInput {
    /// Display title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional cover image URL.
    pub cover_image_url: Option<String>,
    /// Discount type ("percentage" or "fixed").
    pub discount_type: String,
    /// Discount value (percent or fixed amount).
    pub discount_value: Decimal,
    /// Line items making up the bundle.
    pub items: Vec<BundleLineItem>,
    /// Whether the bundle is offered on the storefront (default true).
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

const fn default_is_active() -> bool {
    true
}

/// Input for updating a bundle. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBundleInput {
    /// Display title.
    pub title: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Optional cover image URL.
    pub cover_image_url: Option<String>,
    /// Discount type ("percentage" or "fixed").
    pub discount_type: Option<String>,
    /// Discount value (percent or fixed amount).
    pub discount_value: Option<Decimal>,
    /// Line items making up the bundle.
    pub items: Option<Vec<BundleLineItem>>,
    /// Whether the bundle is offered on the storefront.
    pub is_active: Option<bool>,
}

/// A bundle interaction type recorded for analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsAction {
    /// Bundle was viewed on the storefront.
    View,
    /// Bundle was added to a cart.
    AddToCart,
    /// A checkout was started for the bundle.
    Checkout,
}

impl AnalyticsAction {
    /// Database string for this action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::AddToCart => "add_to_cart",
            Self::Checkout => "checkout",
        }
    }

    /// Parse an action from its database string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "view" => Some(Self::View),
            "add_to_cart" => Some(Self::AddToCart),
            "checkout" => Some(Self::Checkout),
            _ => None,
        }
    }
}

/// Aggregated interaction counts for one bundle.
#[derive(Debug, Clone, Serialize)]
pub struct BundleAnalyticsSummary {
    /// Bundle these counts belong to.
    pub bundle_id: BundleId,
    /// Number of storefront views.
    pub views: i64,
    /// Number of add-to-cart events.
    pub add_to_carts: i64,
    /// Number of checkouts started.
    pub checkouts: i64,
    /// Checkouts divided by views, zero when there are no views.
    pub conversion_rate: f64,
    /// Per-day counts, oldest day first. Days without events are omitted.
    pub daily: Vec<DailyCounts>,
}

/// Interaction counts for a single day.
#[derive(Debug, Clone, Serialize)]
pub struct DailyCounts {
    /// Calendar day (UTC).
    pub date: chrono::NaiveDate,
    /// Views on that day.
    pub views: i64,
    /// Add-to-cart events on that day.
    pub add_to_carts: i64,
    /// Checkouts started on that day.
    pub checkouts: i64,
}
