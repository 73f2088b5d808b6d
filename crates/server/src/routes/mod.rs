//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (database ping)
//!
//! # OAuth install flow
//! GET  /auth/install?shop=        - Redirect merchant to Shopify authorize URL
//! GET  /auth/callback             - Exchange code, upsert shop, return session token
//!
//! # Bundles (session token required)
//! GET    /bundles                 - List the shop's bundles
//! POST   /bundles                 - Create a bundle
//! GET    /bundles/{id}            - Fetch one bundle (records a view event)
//! PUT    /bundles/{id}            - Partial update
//! DELETE /bundles/{id}            - Delete bundle and its analytics
//! GET    /bundles/{id}/pricing    - Recompute pricing for the bundle
//! GET    /bundles/{id}/analytics  - Event counts by action and day
//!
//! # Catalog and checkout (session token required)
//! GET  /products                  - Proxy of the shop's product catalog
//! POST /checkout/create           - Create a draft order checkout link
//!
//! # Webhooks (HMAC verified)
//! POST /webhooks/app/uninstalled   - Remove the shop and its data
//! POST /webhooks/app/scopes_update - Refresh the shop's granted scopes
//! ```

pub mod auth;
pub mod bundles;
pub mod checkout;
pub mod products;
pub mod webhooks;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the application router (health endpoints are added in `main`).
pub fn routes() -> Router<AppState> {
    Router::new()
        // OAuth
        .route("/auth/install", get(auth::install))
        .route("/auth/callback", get(auth::callback))
        // Bundles
        .route("/bundles", get(bundles::list).post(bundles::create))
        .route(
            "/bundles/{id}",
            get(bundles::show)
                .put(bundles::update)
                .delete(bundles::destroy),
        )
        .route("/bundles/{id}/pricing", get(bundles::pricing))
        .route("/bundles/{id}/analytics", get(bundles::analytics))
        // Catalog and checkout
        .route("/products", get(products::index))
        .route("/checkout/create", post(checkout::create))
        // Webhooks
        .route("/webhooks/app/uninstalled", post(webhooks::app_uninstalled))
        .route(
            "/webhooks/app/scopes_update",
            post(webhooks::app_scopes_update),
        )
}
