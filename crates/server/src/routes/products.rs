//! Product catalog proxy for the bundle builder.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::RequireShop;
use crate::shopify::ProductPage;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 50;

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    /// Page size (clamped to 1..=50, default 20).
    pub first: Option<i64>,
    /// Cursor from a previous page's `end_cursor`.
    pub after: Option<String>,
    /// Shopify search query (e.g., `title:tea*`).
    pub query: Option<String>,
}

/// `GET /products` - one page of the shop's catalog, via the Admin API.
#[instrument(skip(state, shop), fields(shop = %shop.shop_domain))]
pub async fn index(
    RequireShop(shop): RequireShop,
    State(state): State<AppState>,
    Query(params): Query<ProductsQuery>,
) -> Result<Json<ProductPage>, AppError> {
    let first = params
        .first
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let page = state
        .shopify()
        .get_products(
            &shop.shop_domain,
            &shop.access_token,
            first,
            params.after.as_deref(),
            params.query.as_deref(),
        )
        .await?;

    Ok(Json(page))
}
