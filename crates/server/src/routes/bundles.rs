//! Bundle CRUD, pricing, and analytics handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use dragon_bundle_core::{
    BundleId, BundleLineItem, DiscountRule, PricingResult, ValidationError, compute_pricing,
    validate_bundle,
};

use crate::db::{AnalyticsRepository, BundleRepository};
use crate::error::AppError;
use crate::middleware::RequireShop;
use crate::models::{
    AnalyticsAction, Bundle, BundleAnalyticsSummary, CreateBundleInput, UpdateBundleInput,
};
use crate::state::AppState;

pub(crate) async fn find_bundle(
    state: &AppState,
    shop_domain: &str,
    id: BundleId,
) -> Result<Bundle, AppError> {
    BundleRepository::new(state.pool())
        .get(shop_domain, id)
        .await?
        .ok_or_else(|| AppError::NotFound("bundle not found".to_string()))
}

/// Record an analytics event without failing the request it rides on.
pub(crate) async fn record_event(state: &AppState, bundle_id: BundleId, action: AnalyticsAction) {
    if let Err(err) = AnalyticsRepository::new(state.pool())
        .record(bundle_id, action)
        .await
    {
        tracing::warn!(
            error = %err,
            bundle_id = %bundle_id,
            action = action.as_str(),
            "Failed to record analytics event"
        );
    }
}

/// A bundle's mutable fields after a partial update has been applied.
#[derive(Debug)]
struct MergedBundle {
    title: String,
    description: Option<String>,
    cover_image_url: Option<String>,
    discount: DiscountRule,
    items: Vec<BundleLineItem>,
    is_active: bool,
}

/// Merge a partial update into a stored bundle and re-validate the result.
///
/// Absent fields keep their stored values. A half-specified discount
/// keeps the stored half, so patching only the value (or only the type)
/// behaves like any other single-field patch. The merged bundle passes
/// the same validation as a create, so an update can never store a
/// bundle that `POST /bundles` would have rejected.
fn merge_update(
    existing: Bundle,
    input: UpdateBundleInput,
) -> Result<MergedBundle, ValidationError> {
    let title = input.title.unwrap_or(existing.title);
    let description = input.description.or(existing.description);
    let cover_image_url = input.cover_image_url.or(existing.cover_image_url);
    let items = input.items.unwrap_or(existing.items);
    let is_active = input.is_active.unwrap_or(existing.is_active);

    let discount = match (input.discount_type, input.discount_value) {
        (None, None) => existing.discount,
        (kind, value) => DiscountRule::from_parts(
            kind.as_deref().unwrap_or_else(|| existing.discount.kind()),
            value.unwrap_or_else(|| existing.discount.value()),
        )?,
    };

    validate_bundle(&title, &items, &discount)?;

    Ok(MergedBundle {
        title,
        description,
        cover_image_url,
        discount,
        items,
        is_active,
    })
}

/// `GET /bundles` - list the shop's bundles, newest first.
#[instrument(skip(state, shop), fields(shop = %shop.shop_domain))]
pub async fn list(
    RequireShop(shop): RequireShop,
    State(state): State<AppState>,
) -> Result<Json<Vec<Bundle>>, AppError> {
    let bundles = BundleRepository::new(state.pool())
        .list(&shop.shop_domain)
        .await?;
    Ok(Json(bundles))
}

/// `POST /bundles` - validate and create a bundle.
#[instrument(skip(state, shop, input), fields(shop = %shop.shop_domain))]
pub async fn create(
    RequireShop(shop): RequireShop,
    State(state): State<AppState>,
    Json(input): Json<CreateBundleInput>,
) -> Result<(StatusCode, Json<Bundle>), AppError> {
    let discount = DiscountRule::from_parts(&input.discount_type, input.discount_value)?;
    validate_bundle(&input.title, &input.items, &discount)?;

    let bundle = BundleRepository::new(state.pool())
        .create(
            &shop.shop_domain,
            input.title.trim(),
            input.description.as_deref(),
            input.cover_image_url.as_deref(),
            &discount,
            &input.items,
            input.is_active,
        )
        .await?;

    tracing::info!(bundle_id = %bundle.id, "Bundle created");
    Ok((StatusCode::CREATED, Json(bundle)))
}

/// `GET /bundles/{id}` - fetch one bundle and record a view event.
#[instrument(skip(state, shop), fields(shop = %shop.shop_domain))]
pub async fn show(
    RequireShop(shop): RequireShop,
    State(state): State<AppState>,
    Path(id): Path<BundleId>,
) -> Result<Json<Bundle>, AppError> {
    let bundle = find_bundle(&state, &shop.shop_domain, id).await?;
    record_event(&state, bundle.id, AnalyticsAction::View).await;
    Ok(Json(bundle))
}

/// `PUT /bundles/{id}` - partial update.
///
/// Absent fields keep their stored values. The merged bundle is
/// re-validated before anything is written, so an update can never
/// leave a bundle in a state that `POST /bundles` would have rejected.
#[instrument(skip(state, shop, input), fields(shop = %shop.shop_domain))]
pub async fn update(
    RequireShop(shop): RequireShop,
    State(state): State<AppState>,
    Path(id): Path<BundleId>,
    Json(input): Json<UpdateBundleInput>,
) -> Result<Json<Bundle>, AppError> {
    let existing = find_bundle(&state, &shop.shop_domain, id).await?;
    let merged = merge_update(existing, input)?;

    let bundle = BundleRepository::new(state.pool())
        .update(
            &shop.shop_domain,
            id,
            merged.title.trim(),
            merged.description.as_deref(),
            merged.cover_image_url.as_deref(),
            &merged.discount,
            &merged.items,
            merged.is_active,
        )
        .await?
        .ok_or_else(|| AppError::NotFound("bundle not found".to_string()))?;

    tracing::info!(bundle_id = %bundle.id, "Bundle updated");
    Ok(Json(bundle))
}

/// `DELETE /bundles/{id}` - delete a bundle and its analytics rows.
#[instrument(skip(state, shop), fields(shop = %shop.shop_domain))]
pub async fn destroy(
    RequireShop(shop): RequireShop,
    State(state): State<AppState>,
    Path(id): Path<BundleId>,
) -> Result<StatusCode, AppError> {
    let deleted = BundleRepository::new(state.pool())
        .delete(&shop.shop_domain, id)
        .await?;

    if !deleted {
        return Err(AppError::NotFound("bundle not found".to_string()));
    }

    tracing::info!(bundle_id = %id, "Bundle deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /bundles/{id}/pricing` - recompute pricing for a bundle.
///
/// Pricing is never persisted; it is derived from the stored line
/// items and discount on every read.
#[instrument(skip(state, shop), fields(shop = %shop.shop_domain))]
pub async fn pricing(
    RequireShop(shop): RequireShop,
    State(state): State<AppState>,
    Path(id): Path<BundleId>,
) -> Result<Json<PricingResult>, AppError> {
    let bundle = find_bundle(&state, &shop.shop_domain, id).await?;
    Ok(Json(compute_pricing(&bundle.items, &bundle.discount)))
}

/// `GET /bundles/{id}/analytics` - event counts by action and day.
#[instrument(skip(state, shop), fields(shop = %shop.shop_domain))]
pub async fn analytics(
    RequireShop(shop): RequireShop,
    State(state): State<AppState>,
    Path(id): Path<BundleId>,
) -> Result<Json<BundleAnalyticsSummary>, AppError> {
    let bundle = find_bundle(&state, &shop.shop_domain, id).await?;
    let summary = AnalyticsRepository::new(state.pool())
        .summary(bundle.id)
        .await?;
    Ok(Json(summary))
}
