//! Shopify webhook handlers.
//!
//! Webhooks are authenticated with the `X-Shopify-Hmac-Sha256` header
//! (HMAC over the raw body, keyed with the app API secret). A bad HMAC
//! is the caller's fault and gets a 401; anything that fails after the
//! HMAC check is logged and answered with 200, because Shopify retries
//! non-2xx deliveries aggressively and the retries would fail the same
//! way.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::instrument;

use crate::auth::verify_webhook_hmac;
use crate::db::ShopRepository;
use crate::state::AppState;

const HMAC_HEADER: &str = "x-shopify-hmac-sha256";
const SHOP_DOMAIN_HEADER: &str = "x-shopify-shop-domain";

/// Subset of the `app/uninstalled` payload we care about.
#[derive(Debug, Deserialize)]
struct UninstalledPayload {
    myshopify_domain: Option<String>,
}

/// Subset of the `app/scopes_update` payload we care about.
#[derive(Debug, Deserialize)]
struct ScopesUpdatePayload {
    /// The full set of scopes now granted to the app.
    #[serde(default)]
    current: Vec<String>,
}

/// `POST /webhooks/app/uninstalled` - remove the shop and its data.
#[instrument(skip(state, headers, body))]
pub async fn app_uninstalled(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let Some(signature) = headers.get(HMAC_HEADER).and_then(|v| v.to_str().ok()) else {
        tracing::warn!("Webhook missing HMAC header");
        return StatusCode::UNAUTHORIZED;
    };

    let secret = state.config().shopify.api_secret.expose_secret().to_owned();
    if !verify_webhook_hmac(&body, signature, secret.as_bytes()) {
        tracing::warn!("Webhook HMAC verification failed");
        return StatusCode::UNAUTHORIZED;
    }

    // Shop domain from the header, falling back to the payload
    let shop_domain = headers
        .get(SHOP_DOMAIN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .or_else(|| {
            serde_json::from_slice::<UninstalledPayload>(&body)
                .ok()
                .and_then(|payload| payload.myshopify_domain)
        });

    let Some(shop_domain) = shop_domain else {
        tracing::warn!("Uninstall webhook without a shop domain");
        return StatusCode::OK;
    };

    match ShopRepository::new(state.pool()).delete(&shop_domain).await {
        Ok(true) => {
            tracing::info!(shop = %shop_domain, "App uninstalled, shop data removed");
        }
        Ok(false) => {
            tracing::info!(shop = %shop_domain, "Uninstall webhook for unknown shop");
        }
        Err(err) => {
            sentry::capture_error(&err);
            tracing::error!(error = %err, shop = %shop_domain, "Failed to remove shop data");
        }
    }

    StatusCode::OK
}

/// `POST /webhooks/app/scopes_update` - refresh the shop's granted scopes.
///
/// Fired when a merchant changes the scopes granted to the app; the
/// stored scope string would otherwise go stale after install.
#[instrument(skip(state, headers, body))]
pub async fn app_scopes_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let Some(signature) = headers.get(HMAC_HEADER).and_then(|v| v.to_str().ok()) else {
        tracing::warn!("Webhook missing HMAC header");
        return StatusCode::UNAUTHORIZED;
    };

    let secret = state.config().shopify.api_secret.expose_secret().to_owned();
    if !verify_webhook_hmac(&body, signature, secret.as_bytes()) {
        tracing::warn!("Webhook HMAC verification failed");
        return StatusCode::UNAUTHORIZED;
    }

    // This topic's payload carries no shop domain, only the header does
    let Some(shop_domain) = headers.get(SHOP_DOMAIN_HEADER).and_then(|v| v.to_str().ok()) else {
        tracing::warn!("Scopes update webhook without a shop domain");
        return StatusCode::OK;
    };

    let scope = match serde_json::from_slice::<ScopesUpdatePayload>(&body) {
        Ok(payload) => payload.current.join(","),
        Err(err) => {
            tracing::warn!(error = %err, "Unparseable scopes update payload");
            return StatusCode::OK;
        }
    };

    match ShopRepository::new(state.pool())
        .update_scope(shop_domain, &scope)
        .await
    {
        Ok(true) => {
            tracing::info!(shop = %shop_domain, scope, "Shop scopes updated");
        }
        Ok(false) => {
            tracing::info!(shop = %shop_domain, "Scopes update for unknown shop");
        }
        Err(err) => {
            sentry::capture_error(&err);
            tracing::error!(error = %err, shop = %shop_domain, "Failed to update shop scopes");
        }
    }

    StatusCode::OK
}
