//! Database operations for installed shops.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use dragon_bundle_core::ShopId;

use super::RepositoryError;
use crate::models::shop::Shop;

/// Internal row type for shop queries.
#[derive(Debug, sqlx::FromRow)]
struct ShopRow {
    id: i32,
    shop_domain: String,
    access_token: String,
    scope: String,
    installed_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ShopRow> for Shop {
    fn from(row: ShopRow) -> Self {
        Self {
            id: ShopId::new(row.id),
            shop_domain: row.shop_domain,
            access_token: row.access_token,
            scope: row.scope,
            installed_at: row.installed_at,
            updated_at: row.updated_at,
        }
    }
}

const SHOP_COLUMNS: &str = "id, shop_domain, access_token, scope, installed_at, updated_at";

/// Repository for shop database operations.
pub struct ShopRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShopRepository<'a> {
    /// Create a new shop repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a shop, or refresh its token and scope on reinstall.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        shop_domain: &str,
        access_token: &str,
        scope: &str,
    ) -> Result<Shop, RepositoryError> {
        let row = sqlx::query_as::<_, ShopRow>(&format!(
            "INSERT INTO shops (shop_domain, access_token, scope)
            VALUES ($1, $2, $3)
            ON CONFLICT (shop_domain)
            DO UPDATE SET access_token = $2, scope = $3, updated_at = now()
            RETURNING {SHOP_COLUMNS}"
        ))
        .bind(shop_domain)
        .bind(access_token)
        .bind(scope)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Look up a shop by its myshopify domain.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_domain(&self, shop_domain: &str) -> Result<Option<Shop>, RepositoryError> {
        let row = sqlx::query_as::<_, ShopRow>(&format!(
            "SELECT {SHOP_COLUMNS} FROM shops WHERE shop_domain = $1"
        ))
        .bind(shop_domain)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Shop::from))
    }

    /// Replace a shop's granted scopes.
    ///
    /// Returns `true` if the shop exists. Called from the
    /// app/scopes_update webhook when a merchant changes the app's
    /// granted scopes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_scope(
        &self,
        shop_domain: &str,
        scope: &str,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("UPDATE shops SET scope = $2, updated_at = now() WHERE shop_domain = $1")
                .bind(shop_domain)
                .bind(scope)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a shop and all of its bundles (cascade).
    ///
    /// Returns `true` if a row was deleted. Called from the app/uninstalled
    /// webhook, so deleting an already-absent shop is not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, shop_domain: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shops WHERE shop_domain = $1")
            .bind(shop_domain)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
