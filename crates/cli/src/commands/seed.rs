//! Development seeding command.
//!
//! Inserts a shop row with a placeholder token plus one demo bundle, so
//! the API can be exercised locally without going through OAuth against
//! a real shop.

use rust_decimal::Decimal;
use secrecy::SecretString;
use tracing::info;

use dragon_bundle_core::{BundleLineItem, DiscountRule};
use dragon_bundle_server::db::{self, BundleRepository, ShopRepository};

/// Seed a development shop and a demo bundle.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset or a query fails.
pub async fn run(shop_domain: &str, access_token: &str) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| "DATABASE_URL not set")?;

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let shop = ShopRepository::new(&pool)
        .upsert(shop_domain, access_token, "read_products,write_draft_orders")
        .await?;
    info!(shop = %shop.shop_domain, "Seeded shop");

    let items = vec![
        BundleLineItem {
            product_id: "gid://shopify/Product/1".to_string(),
            variant_id: "gid://shopify/ProductVariant/11".to_string(),
            unit_price: Decimal::new(1500, 2),
            quantity: 1,
        },
        BundleLineItem {
            product_id: "gid://shopify/Product/2".to_string(),
            variant_id: "gid://shopify/ProductVariant/21".to_string(),
            unit_price: Decimal::new(1000, 2),
            quantity: 2,
        },
    ];
    let discount = DiscountRule::Percentage(Decimal::new(10, 0));

    let bundle = BundleRepository::new(&pool)
        .create(
            shop_domain,
            "Demo Starter Bundle",
            Some("Seeded bundle for local development"),
            None,
            &discount,
            &items,
            true,
        )
        .await?;
    info!(bundle_id = %bundle.id, "Seeded demo bundle");

    Ok(())
}
