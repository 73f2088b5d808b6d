//! Checkout link creation.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use dragon_bundle_core::BundleId;

use crate::error::AppError;
use crate::middleware::RequireShop;
use crate::models::AnalyticsAction;
use crate::routes::bundles;
use crate::state::AppState;

/// Request body for `POST /checkout/create`.
#[derive(Debug, Deserialize)]
pub struct CreateCheckoutRequest {
    /// Bundle to build the checkout from.
    pub bundle_id: BundleId,
}

/// Response for a created checkout.
#[derive(Debug, Serialize)]
pub struct CreateCheckoutResponse {
    /// Invoice URL where the buyer completes payment.
    pub checkout_url: String,
    /// Shopify draft order GID.
    pub checkout_id: String,
    /// Total after the bundle discount, computed by Shopify.
    pub total_price: Decimal,
}

/// `POST /checkout/create` - create a draft order for a bundle.
///
/// The bundle's line items and discount rule are handed to Shopify as a
/// draft order; Shopify's commerce engine does the final math, so the
/// invoice total always agrees with what the buyer is charged.
#[instrument(skip(state, shop, body), fields(shop = %shop.shop_domain))]
pub async fn create(
    RequireShop(shop): RequireShop,
    State(state): State<AppState>,
    Json(body): Json<CreateCheckoutRequest>,
) -> Result<Json<CreateCheckoutResponse>, AppError> {
    let bundle = bundles::find_bundle(&state, &shop.shop_domain, body.bundle_id).await?;

    if !bundle.is_active {
        return Err(AppError::BadRequest("bundle is not active".to_string()));
    }

    let note = format!("Bundle: {}", bundle.title);
    let order = state
        .shopify()
        .create_draft_order(
            &shop.shop_domain,
            &shop.access_token,
            &bundle.items,
            &bundle.discount,
            &note,
        )
        .await?;

    bundles::record_event(&state, bundle.id, AnalyticsAction::AddToCart).await;
    bundles::record_event(&state, bundle.id, AnalyticsAction::Checkout).await;

    tracing::info!(bundle_id = %bundle.id, checkout_id = %order.id, "Checkout created");

    Ok(Json(CreateCheckoutResponse {
        checkout_url: order.invoice_url,
        checkout_id: order.id,
        total_price: order.total_price,
    }))
}
