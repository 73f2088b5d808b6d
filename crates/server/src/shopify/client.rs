//! Shopify Admin API GraphQL client.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;
use tracing::instrument;
use url::Url;

use dragon_bundle_core::{BundleLineItem, DiscountRule};

use crate::config::ShopifyAppConfig;

use super::types::{DraftOrder, OAuthToken, Product, ProductPage, ProductVariant};
use super::{GraphQLError, GraphQLErrorLocation, ShopifyError, queries};

/// How long a shop's product list stays cached.
const PRODUCT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Shopify Admin API GraphQL client.
///
/// Holds only app-level credentials. Per-shop access tokens are passed
/// into each call, so one client instance serves every installed shop.
#[derive(Clone)]
pub struct ShopifyClient {
    inner: Arc<ShopifyClientInner>,
}

struct ShopifyClientInner {
    http: reqwest::Client,
    api_key: String,
    api_secret: SecretString,
    api_version: String,
    scopes: String,
    /// Product page cache keyed by shop domain, cursor, and query.
    product_cache: Cache<String, ProductPage>,
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
    #[serde(default)]
    locations: Vec<GraphQLErrorLocationResponse>,
    #[serde(default)]
    path: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorLocationResponse {
    line: i64,
    column: i64,
}

/// OAuth token response from Shopify.
#[derive(Debug, Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    scope: String,
}

// =============================================================================
// Wire types for GraphQL responses
// =============================================================================

#[derive(Debug, Deserialize)]
struct Connection<T> {
    edges: Vec<Edge<T>>,
    #[serde(default, rename = "pageInfo")]
    page_info: Option<PageInfoNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfoNode {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Edge<T> {
    node: T,
}

#[derive(Debug, Deserialize)]
struct ProductsData {
    products: Connection<ProductNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductNode {
    id: String,
    title: String,
    handle: String,
    featured_image: Option<FeaturedImage>,
    variants: Connection<VariantNode>,
}

#[derive(Debug, Deserialize)]
struct FeaturedImage {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantNode {
    id: String,
    title: String,
    price: Decimal,
    available_for_sale: bool,
}

impl From<ProductNode> for Product {
    fn from(node: ProductNode) -> Self {
        Self {
            id: node.id,
            title: node.title,
            handle: node.handle,
            image_url: node.featured_image.map(|image| image.url),
            variants: node
                .variants
                .edges
                .into_iter()
                .map(|edge| ProductVariant {
                    id: edge.node.id,
                    title: edge.node.title,
                    price: edge.node.price,
                    available_for_sale: edge.node.available_for_sale,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftOrderCreateData {
    draft_order_create: DraftOrderCreatePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftOrderCreatePayload {
    draft_order: Option<DraftOrderNode>,
    #[serde(default)]
    user_errors: Vec<UserErrorNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftOrderNode {
    id: String,
    invoice_url: String,
    total_price: Decimal,
}

#[derive(Debug, Deserialize)]
struct UserErrorNode {
    message: String,
}

impl ShopifyClient {
    /// Create a new Admin API client from app credentials.
    #[must_use]
    pub fn new(config: &ShopifyAppConfig) -> Self {
        let product_cache = Cache::builder()
            .max_capacity(1_000)
            .time_to_live(PRODUCT_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(ShopifyClientInner {
                http: reqwest::Client::new(),
                api_key: config.api_key.clone(),
                api_secret: config.api_secret.clone(),
                api_version: config.api_version.clone(),
                scopes: config.scopes.clone(),
                product_cache,
            }),
        }
    }

    /// Get the app's API key (OAuth client ID).
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.inner.api_key
    }

    // =========================================================================
    // OAuth Flow
    // =========================================================================

    /// Build the OAuth authorization URL for a shop.
    ///
    /// The install flow redirects the merchant here; Shopify redirects
    /// back to `redirect_uri` with a `code` after they approve.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::OAuth` if the shop domain does not form a
    /// valid URL.
    pub fn authorization_url(
        &self,
        shop_domain: &str,
        redirect_uri: &str,
        state: &str,
    ) -> Result<String, ShopifyError> {
        let mut url = Url::parse(&format!("https://{shop_domain}/admin/oauth/authorize"))
            .map_err(|e| ShopifyError::OAuth(format!("invalid shop domain: {e}")))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.inner.api_key)
            .append_pair("scope", &self.inner.scopes)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("state", state);

        Ok(url.into())
    }

    /// Exchange an authorization code for an offline access token.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::OAuth` if the exchange is rejected, or
    /// `ShopifyError::Http` if the request fails.
    pub async fn exchange_code(
        &self,
        shop_domain: &str,
        code: &str,
    ) -> Result<OAuthToken, ShopifyError> {
        let url = format!("https://{shop_domain}/admin/oauth/access_token");

        let params = [
            ("client_id", self.inner.api_key.as_str()),
            ("client_secret", self.inner.api_secret.expose_secret()),
            ("code", code),
        ];

        let response = self.inner.http.post(&url).form(&params).send().await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ShopifyError::OAuth(format!("Token exchange failed: {text}")));
        }

        let token: OAuthTokenResponse = response.json().await?;

        Ok(OAuthToken {
            access_token: token.access_token,
            scope: token.scope,
        })
    }

    // =========================================================================
    // GraphQL Execution
    // =========================================================================

    /// Execute a GraphQL document against a shop's Admin API.
    async fn execute<T: DeserializeOwned>(
        &self,
        shop_domain: &str,
        access_token: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ShopifyError> {
        let endpoint = format!(
            "https://{shop_domain}/admin/api/{}/graphql.json",
            self.inner.api_version
        );

        let response = self
            .inner
            .http
            .post(&endpoint)
            .header("X-Shopify-Access-Token", access_token)
            .header("Content-Type", "application/json")
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ShopifyError::Unauthorized(
                "Invalid or expired access token".to_string(),
            ));
        }

        let body = response.text().await?;
        let graphql_response: GraphQLResponse<T> = serde_json::from_str(&body)?;

        if let Some(errors) = graphql_response.errors
            && !errors.is_empty()
        {
            let converted_errors: Vec<GraphQLError> = errors
                .into_iter()
                .map(|e| GraphQLError {
                    message: e.message,
                    locations: e
                        .locations
                        .into_iter()
                        .map(|l| GraphQLErrorLocation {
                            line: l.line,
                            column: l.column,
                        })
                        .collect(),
                    path: e.path,
                })
                .collect();
            return Err(ShopifyError::GraphQL(converted_errors));
        }

        graphql_response.data.ok_or_else(|| {
            ShopifyError::GraphQL(vec![GraphQLError {
                message: "No data in response".to_string(),
                locations: vec![],
                path: vec![],
            }])
        })
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Fetch one page of a shop's products, with a short-lived cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error
    /// response.
    #[instrument(skip(self, access_token))]
    pub async fn get_products(
        &self,
        shop_domain: &str,
        access_token: &str,
        first: i64,
        after: Option<&str>,
        search: Option<&str>,
    ) -> Result<ProductPage, ShopifyError> {
        let cache_key = format!(
            "{shop_domain}:{first}:{}:{}",
            after.unwrap_or_default(),
            search.unwrap_or_default()
        );

        if let Some(page) = self.inner.product_cache.get(&cache_key).await {
            return Ok(page);
        }

        let variables = json!({ "first": first, "after": after, "query": search });
        let data: ProductsData = self
            .execute(shop_domain, access_token, queries::GET_PRODUCTS, variables)
            .await?;

        let page_info = data.products.page_info;
        let page = ProductPage {
            products: data
                .products
                .edges
                .into_iter()
                .map(|edge| Product::from(edge.node))
                .collect(),
            has_next_page: page_info.as_ref().is_some_and(|info| info.has_next_page),
            end_cursor: page_info.and_then(|info| info.end_cursor),
        };

        self.inner
            .product_cache
            .insert(cache_key, page.clone())
            .await;

        Ok(page)
    }

    // =========================================================================
    // Draft Orders
    // =========================================================================

    /// Create a draft order for a bundle checkout.
    ///
    /// The bundle discount becomes the draft order's applied discount,
    /// so the invoice total matches the bundle's net total.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::UserError` if Shopify rejects the input
    /// (e.g., an unknown variant), or other variants for transport and
    /// GraphQL failures.
    #[instrument(skip(self, access_token, items, discount))]
    pub async fn create_draft_order(
        &self,
        shop_domain: &str,
        access_token: &str,
        items: &[BundleLineItem],
        discount: &DiscountRule,
        note: &str,
    ) -> Result<DraftOrder, ShopifyError> {
        let line_items: Vec<serde_json::Value> = items
            .iter()
            .map(|item| {
                json!({
                    "variantId": item.variant_id,
                    "quantity": item.quantity,
                })
            })
            .collect();

        let value_type = match discount {
            DiscountRule::Percentage(_) => "PERCENTAGE",
            DiscountRule::FixedAmount(_) => "FIXED_AMOUNT",
        };
        let value = discount.value().to_f64().ok_or_else(|| {
            ShopifyError::UserError("discount value out of range".to_string())
        })?;

        let variables = json!({
            "input": {
                "lineItems": line_items,
                "appliedDiscount": {
                    "valueType": value_type,
                    "value": value,
                    "title": note,
                },
                "note": note,
            }
        });

        let data: DraftOrderCreateData = self
            .execute(
                shop_domain,
                access_token,
                queries::DRAFT_ORDER_CREATE,
                variables,
            )
            .await?;

        let payload = data.draft_order_create;
        if let Some(error) = payload.user_errors.first() {
            return Err(ShopifyError::UserError(error.message.clone()));
        }

        let order = payload.draft_order.ok_or_else(|| {
            ShopifyError::GraphQL(vec![GraphQLError {
                message: "draftOrderCreate returned no draft order".to_string(),
                locations: vec![],
                path: vec![],
            }])
        })?;

        Ok(DraftOrder {
            id: order.id,
            invoice_url: order.invoice_url,
            total_price: order.total_price,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_client() -> ShopifyClient {
        ShopifyClient::new(&ShopifyAppConfig {
            api_key: "test_key".to_string(),
            api_secret: SecretString::from("test_secret"),
            api_version: "2026-01".to_string(),
            scopes: "read_products,write_draft_orders".to_string(),
        })
    }

    #[test]
    fn test_authorization_url() {
        let client = test_client();
        let url = client
            .authorization_url(
                "demo.myshopify.com",
                "https://app.example.com/auth/callback",
                "nonce123",
            )
            .unwrap();

        assert!(url.starts_with("https://demo.myshopify.com/admin/oauth/authorize?"));
        assert!(url.contains("client_id=test_key"));
        assert!(url.contains("state=nonce123"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fapp.example.com%2Fauth%2Fcallback"));
    }

    #[test]
    fn test_products_response_parsing() {
        let body = json!({
            "products": {
                "edges": [{
                    "node": {
                        "id": "gid://shopify/Product/1",
                        "title": "Dragon Tea",
                        "handle": "dragon-tea",
                        "featuredImage": { "url": "https://cdn.example.com/tea.png" },
                        "variants": {
                            "edges": [{
                                "node": {
                                    "id": "gid://shopify/ProductVariant/11",
                                    "title": "Default",
                                    "price": "12.50",
                                    "availableForSale": true
                                }
                            }]
                        }
                    }
                }]
            }
        });

        let data: ProductsData = serde_json::from_value(body).unwrap();
        let product = Product::from(data.products.edges.into_iter().next().unwrap().node);

        assert_eq!(product.title, "Dragon Tea");
        assert_eq!(product.image_url.as_deref(), Some("https://cdn.example.com/tea.png"));
        assert_eq!(product.variants.len(), 1);
        assert_eq!(product.variants[0].price, Decimal::new(1250, 2));
    }

    #[test]
    fn test_draft_order_response_parsing() {
        let body = json!({
            "draftOrderCreate": {
                "draftOrder": {
                    "id": "gid://shopify/DraftOrder/9",
                    "invoiceUrl": "https://demo.myshopify.com/invoices/abc",
                    "totalPrice": "22.50"
                },
                "userErrors": []
            }
        });

        let data: DraftOrderCreateData = serde_json::from_value(body).unwrap();
        let order = data.draft_order_create.draft_order.unwrap();
        assert_eq!(order.total_price, Decimal::new(2250, 2));
    }
}
