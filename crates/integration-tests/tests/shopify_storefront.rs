//! Integration tests for the Shopify Storefront API adapter.
//!
//! These tests require:
//! - `CATALOG_BACKEND=shopify`
//! - `SHOPIFY_STORE_DOMAIN` and `SHOPIFY_STOREFRONT_TOKEN` for a store with
//!   at least one published product
//!
//! Run with: cargo test -p mithadi-integration-tests --test shopify_storefront -- --ignored

use mithadi_integration_tests::shopify_config;
use mithadi_storefront::catalog::{BackendError, CatalogBackend, LineItemInput};
use mithadi_storefront::shopify::StorefrontClient;

fn client() -> StorefrontClient {
    StorefrontClient::new(&shopify_config())
}

#[tokio::test]
#[ignore = "Requires Shopify Storefront API credentials"]
async fn test_fetch_products() {
    let products = client()
        .fetch_products()
        .await
        .expect("Failed to fetch products");

    assert!(!products.is_empty(), "Store has no products");
    for product in &products {
        assert!(!product.handle.is_empty());
        assert!(!product.variants.is_empty(), "{} has no variants", product.handle);
    }
}

#[tokio::test]
#[ignore = "Requires Shopify Storefront API credentials"]
async fn test_fetch_product_by_handle() {
    let client = client();
    let products = client.fetch_products().await.expect("Failed to fetch products");
    let first = products.first().expect("Store has no products");

    let product = client
        .fetch_product_by_handle(&first.handle)
        .await
        .expect("Failed to fetch product");
    assert_eq!(product.id, first.id);
}

#[tokio::test]
#[ignore = "Requires Shopify Storefront API credentials"]
async fn test_unknown_handle_is_not_found() {
    let result = client()
        .fetch_product_by_handle("no-such-sweet-exists-here")
        .await;
    assert!(matches!(result, Err(BackendError::ProductNotFound(_))));
}

#[tokio::test]
#[ignore = "Requires Shopify Storefront API credentials"]
async fn test_checkout_create_then_replace() {
    let client = client();
    let products = client.fetch_products().await.expect("Failed to fetch products");
    let variant = products
        .iter()
        .flat_map(|p| &p.variants)
        .find(|v| v.available_for_sale)
        .expect("Store has no variant for sale");

    let mut lines = vec![LineItemInput {
        variant_id: variant.id.clone(),
        quantity: 1,
    }];
    let created = client
        .create_checkout(&lines)
        .await
        .expect("Failed to create checkout");
    assert!(created.web_url.starts_with("https://"));
    assert_eq!(created.subtotal_price, variant.price);

    lines[0].quantity = 2;
    let updated = client
        .update_checkout(&created.id, &lines)
        .await
        .expect("Failed to replace line items");
    assert_eq!(updated.id, created.id);
    assert_eq!(
        updated.subtotal_price,
        variant.price.checked_mul(2).expect("overflow")
    );
}
