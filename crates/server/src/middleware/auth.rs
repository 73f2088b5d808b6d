//! Authentication extractor for embedded-app API requests.
//!
//! Every `/bundles`, `/products`, and `/checkout` request carries a
//! `Authorization: Bearer <session token>` header. The extractor verifies
//! the token signature and expiry, then loads the shop record so handlers
//! get a shop domain and Admin API token in one step.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::auth::verify_session_token;
use crate::db::ShopRepository;
use crate::models::Shop;
use crate::state::AppState;

/// Extractor that requires a valid shop session.
///
/// # Example
///
/// ```rust,ignore
/// async fn list_bundles(
///     RequireShop(shop): RequireShop,
///     State(state): State<AppState>,
/// ) -> Result<Json<Vec<Bundle>>, AppError> {
///     // shop.shop_domain scopes every query
/// }
/// ```
pub struct RequireShop(pub Shop);

/// Rejection returned when a request is not authenticated.
pub struct ShopAuthRejection(&'static str);

impl IntoResponse for ShopAuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": self.0 })),
        )
            .into_response()
    }
}

impl FromRequestParts<AppState> for RequireShop {
    type Rejection = ShopAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ShopAuthRejection("missing bearer token"))?;

        let claims = verify_session_token(token, &state.config().session.jwt_secret)
            .map_err(|_| ShopAuthRejection("invalid session token"))?;

        let shop = ShopRepository::new(state.pool())
            .get_by_domain(&claims.sub)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "Shop lookup failed during auth");
                ShopAuthRejection("invalid session token")
            })?
            .ok_or(ShopAuthRejection("shop not installed"))?;

        Ok(Self(shop))
    }
}
