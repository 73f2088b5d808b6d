//! OAuth install flow handlers.

use axum::{
    Json,
    extract::{RawQuery, State},
    response::Redirect,
};
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::instrument;

use crate::auth::{
    generate_nonce, is_valid_shop_domain, sign_session_token, sign_state, verify_oauth_hmac,
    verify_state,
};
use crate::db::ShopRepository;
use crate::error::AppError;
use crate::state::AppState;

/// Response for a completed install callback.
#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    /// Session token for subsequent API calls.
    pub token: String,
    /// The shop the token belongs to.
    pub shop: String,
}

fn query_params(raw: Option<&str>) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes())
        .into_owned()
        .collect()
}

fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// `GET /auth/install?shop=` - start the OAuth flow.
///
/// Validates the shop domain and redirects the merchant to Shopify's
/// authorize page with a signed `state` nonce.
#[instrument(skip(state))]
pub async fn install(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Redirect, AppError> {
    let params = query_params(raw.as_deref());
    let shop = param(&params, "shop")
        .ok_or_else(|| AppError::BadRequest("missing shop parameter".to_string()))?;

    if !is_valid_shop_domain(shop) {
        return Err(AppError::BadRequest("invalid shop domain".to_string()));
    }

    let secret = state.config().shopify.api_secret.expose_secret().to_owned();
    let oauth_state = sign_state(&generate_nonce(), secret.as_bytes());

    let url = state
        .shopify()
        .authorization_url(shop, &state.config().oauth_redirect_uri(), &oauth_state)?;

    tracing::info!(shop, "Starting OAuth install");
    Ok(Redirect::temporary(&url))
}

/// `GET /auth/callback` - finish the OAuth flow.
///
/// Verifies the callback HMAC and the signed state, exchanges the code
/// for an offline access token, upserts the shop, and returns a session
/// token for the embedded UI.
#[instrument(skip(state))]
pub async fn callback(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<CallbackResponse>, AppError> {
    let params = query_params(raw.as_deref());

    let shop = param(&params, "shop")
        .ok_or_else(|| AppError::BadRequest("missing shop parameter".to_string()))?;
    let code = param(&params, "code")
        .ok_or_else(|| AppError::BadRequest("missing code parameter".to_string()))?;
    let hmac = param(&params, "hmac")
        .ok_or_else(|| AppError::BadRequest("missing hmac parameter".to_string()))?;
    let oauth_state = param(&params, "state")
        .ok_or_else(|| AppError::BadRequest("missing state parameter".to_string()))?;

    if !is_valid_shop_domain(shop) {
        return Err(AppError::BadRequest("invalid shop domain".to_string()));
    }

    let secret = state.config().shopify.api_secret.expose_secret().to_owned();
    if !verify_oauth_hmac(&params, hmac, secret.as_bytes()) {
        return Err(AppError::Unauthorized("invalid hmac".to_string()));
    }
    if !verify_state(oauth_state, secret.as_bytes()) {
        return Err(AppError::Unauthorized("invalid state".to_string()));
    }

    let token = state.shopify().exchange_code(shop, code).await?;

    ShopRepository::new(state.pool())
        .upsert(shop, &token.access_token, &token.scope)
        .await?;

    let session_token = sign_session_token(
        shop,
        state.config().session.ttl_hours,
        &state.config().session.jwt_secret,
    )
    .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(shop, "App installed");

    Ok(Json(CallbackResponse {
        token: session_token,
        shop: shop.to_string(),
    }))
}
