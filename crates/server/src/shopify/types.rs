//! Domain types for the Shopify Admin API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// OAuth token obtained for a shop during install.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthToken {
    /// The offline access token for Admin API calls.
    pub access_token: String,
    /// Granted scopes.
    pub scope: String,
}

/// A product from the shop's catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Shopify product GID (e.g., `gid://shopify/Product/123`).
    pub id: String,
    /// Product title.
    pub title: String,
    /// URL handle.
    pub handle: String,
    /// Featured image URL, if any.
    pub image_url: Option<String>,
    /// Purchasable variants.
    pub variants: Vec<ProductVariant>,
}

/// A product variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Shopify variant GID (e.g., `gid://shopify/ProductVariant/456`).
    pub id: String,
    /// Variant title (e.g., "Small / Red").
    pub title: String,
    /// Price in shop currency.
    pub price: Decimal,
    /// Whether the variant can currently be sold.
    pub available_for_sale: bool,
}

/// One page of a shop's product catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    /// Products on this page.
    pub products: Vec<Product>,
    /// Whether another page follows.
    pub has_next_page: bool,
    /// Cursor to pass as `after` for the next page.
    pub end_cursor: Option<String>,
}

/// A draft order created for a bundle checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftOrder {
    /// Shopify draft order GID.
    pub id: String,
    /// Invoice URL the buyer completes checkout at.
    pub invoice_url: String,
    /// Total after the bundle discount.
    pub total_price: Decimal,
}
