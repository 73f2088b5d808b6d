//! Database operations for bundle analytics events.

use sqlx::PgPool;

use dragon_bundle_core::BundleId;

use chrono::NaiveDate;

use super::RepositoryError;
use crate::models::bundle::{AnalyticsAction, BundleAnalyticsSummary, DailyCounts};

#[derive(Debug, sqlx::FromRow)]
struct DailyActionCountRow {
    day: NaiveDate,
    action: String,
    count: i64,
}

/// Repository for bundle analytics operations.
pub struct AnalyticsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AnalyticsRepository<'a> {
    /// Create a new analytics repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record one interaction event for a bundle.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn record(
        &self,
        bundle_id: BundleId,
        action: AnalyticsAction,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO bundle_analytics (bundle_id, action) VALUES ($1, $2)")
            .bind(bundle_id.as_i32())
            .bind(action.as_str())
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Aggregate interaction counts for one bundle, by action and by day.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summary(
        &self,
        bundle_id: BundleId,
    ) -> Result<BundleAnalyticsSummary, RepositoryError> {
        let rows = sqlx::query_as::<_, DailyActionCountRow>(
            "SELECT created_at::date AS day, action, COUNT(*) AS count
            FROM bundle_analytics
            WHERE bundle_id = $1
            GROUP BY day, action
            ORDER BY day",
        )
        .bind(bundle_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        let mut views = 0;
        let mut add_to_carts = 0;
        let mut checkouts = 0;
        let mut daily: Vec<DailyCounts> = Vec::new();

        for row in rows {
            if daily.last().is_none_or(|last| last.date != row.day) {
                daily.push(DailyCounts {
                    date: row.day,
                    views: 0,
                    add_to_carts: 0,
                    checkouts: 0,
                });
            }
            let day = daily
                .last_mut()
                .ok_or_else(|| RepositoryError::DataCorruption("empty daily bucket".into()))?;

            match AnalyticsAction::parse(&row.action) {
                Some(AnalyticsAction::View) => {
                    views += row.count;
                    day.views = row.count;
                }
                Some(AnalyticsAction::AddToCart) => {
                    add_to_carts += row.count;
                    day.add_to_carts = row.count;
                }
                Some(AnalyticsAction::Checkout) => {
                    checkouts += row.count;
                    day.checkouts = row.count;
                }
                // CHECK constraint makes this unreachable, but don't blow up on it
                None => {
                    return Err(RepositoryError::DataCorruption(format!(
                        "unknown analytics action: {}",
                        row.action
                    )));
                }
            }
        }

        #[allow(clippy::cast_precision_loss)] // Event counts fit comfortably in f64
        let conversion_rate = if views > 0 {
            checkouts as f64 / views as f64
        } else {
            0.0
        };

        Ok(BundleAnalyticsSummary {
            bundle_id,
            views,
            add_to_carts,
            checkouts,
            conversion_rate,
            daily,
        })
    }
}
