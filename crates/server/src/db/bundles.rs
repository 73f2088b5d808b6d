//! Database operations for bundles.
//!
//! Queries use the runtime sqlx API with explicit row structs. Line items
//! are stored as a JSONB blob and the discount rule as a (type, value)
//! column pair, both rehydrated into core types when rows are read.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use dragon_bundle_core::{BundleId, BundleLineItem, DiscountRule};

use super::RepositoryError;
use crate::models::bundle::Bundle;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for bundle queries.
#[derive(Debug, sqlx::FromRow)]
struct BundleRow {
    id: i32,
    shop_domain: String,
    title: String,
    description: Option<String>,
    cover_image_url: Option<String>,
    discount_type: String,
    discount_value: Decimal,
    items: serde_json::Value,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BundleRow> for Bundle {
    type Error = RepositoryError;

    fn try_from(row: BundleRow) -> Result<Self, Self::Error> {
        let discount = DiscountRule::from_parts(&row.discount_type, row.discount_value)
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("bundle {}: {e}", row.id))
            })?;
        let items: Vec<BundleLineItem> = serde_json::from_value(row.items).map_err(|e| {
            RepositoryError::DataCorruption(format!("bundle {} items: {e}", row.id))
        })?;

        Ok(Self {
            id: BundleId::new(row.id),
            shop_domain: row.shop_domain,
            title: row.title,
            description: row.description,
            cover_image_url: row.cover_image_url,
            discount,
            items,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const BUNDLE_COLUMNS: &str = "id, shop_domain, title, description, cover_image_url, \
     discount_type, discount_value, items, is_active, created_at, updated_at";

fn items_to_json(items: &[BundleLineItem]) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(items).map_err(|e| RepositoryError::DataCorruption(e.to_string()))
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for bundle database operations.
///
/// Every query is scoped to a shop domain so one shop can never read or
/// mutate another shop's bundles.
pub struct BundleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BundleRepository<'a> {
    /// Create a new bundle repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all bundles for a shop, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a stored row cannot be decoded.
    pub async fn list(&self, shop_domain: &str) -> Result<Vec<Bundle>, RepositoryError> {
        let rows = sqlx::query_as::<_, BundleRow>(&format!(
            "SELECT {BUNDLE_COLUMNS} FROM bundles WHERE shop_domain = $1 ORDER BY created_at DESC"
        ))
        .bind(shop_domain)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Bundle::try_from).collect()
    }

    /// Get a bundle by ID, scoped to a shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        shop_domain: &str,
        id: BundleId,
    ) -> Result<Option<Bundle>, RepositoryError> {
        let row = sqlx::query_as::<_, BundleRow>(&format!(
            "SELECT {BUNDLE_COLUMNS} FROM bundles WHERE shop_domain = $1 AND id = $2"
        ))
        .bind(shop_domain)
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(Bundle::try_from).transpose()
    }

    /// Create a new bundle.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        shop_domain: &str,
        title: &str,
        description: Option<&str>,
        cover_image_url: Option<&str>,
        discount: &DiscountRule,
        items: &[BundleLineItem],
        is_active: bool,
    ) -> Result<Bundle, RepositoryError> {
        let row = sqlx::query_as::<_, BundleRow>(&format!(
            "INSERT INTO bundles (
                shop_domain, title, description, cover_image_url,
                discount_type, discount_value, items, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {BUNDLE_COLUMNS}"
        ))
        .bind(shop_domain)
        .bind(title)
        .bind(description)
        .bind(cover_image_url)
        .bind(discount.kind())
        .bind(discount.value())
        .bind(items_to_json(items)?)
        .bind(is_active)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Replace all mutable fields of a bundle.
    ///
    /// Returns `None` if the bundle does not exist for this shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        shop_domain: &str,
        id: BundleId,
        title: &str,
        description: Option<&str>,
        cover_image_url: Option<&str>,
        discount: &DiscountRule,
        items: &[BundleLineItem],
        is_active: bool,
    ) -> Result<Option<Bundle>, RepositoryError> {
        let row = sqlx::query_as::<_, BundleRow>(&format!(
            "UPDATE bundles
            SET title = $3, description = $4, cover_image_url = $5,
                discount_type = $6, discount_value = $7, items = $8,
                is_active = $9, updated_at = now()
            WHERE shop_domain = $1 AND id = $2
            RETURNING {BUNDLE_COLUMNS}"
        ))
        .bind(shop_domain)
        .bind(id.as_i32())
        .bind(title)
        .bind(description)
        .bind(cover_image_url)
        .bind(discount.kind())
        .bind(discount.value())
        .bind(items_to_json(items)?)
        .bind(is_active)
        .fetch_optional(self.pool)
        .await?;

        row.map(Bundle::try_from).transpose()
    }

    /// Delete a bundle. Returns `true` if a row was deleted.
    ///
    /// Analytics rows cascade via the foreign key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, shop_domain: &str, id: BundleId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM bundles WHERE shop_domain = $1 AND id = $2")
            .bind(shop_domain)
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
