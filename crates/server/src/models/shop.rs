//! Shop domain model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use dragon_bundle_core::ShopId;

/// A shop that has installed the app.
///
/// The access token is the offline Admin API token obtained during
/// OAuth. It is never serialized into API responses.
#[derive(Debug, Clone, Serialize)]
pub struct Shop {
    /// Unique shop ID.
    pub id: ShopId,
    /// The myshopify domain (e.g., "demo.myshopify.com").
    pub shop_domain: String,
    /// Offline Admin API access token.
    #[serde(skip_serializing)]
    pub access_token: String,
    /// OAuth scopes granted at install.
    pub scope: String,
    /// When the app was installed.
    pub installed_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}
