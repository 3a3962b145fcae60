//! Integration tests for Mithadi.
//!
//! # Running Tests
//!
//! ```bash
//! # Shopify (CATALOG_BACKEND=shopify plus SHOPIFY_* variables)
//! cargo test -p mithadi-integration-tests --test shopify_storefront -- --ignored
//!
//! # PetPooja (CATALOG_BACKEND=petpooja plus PETPOOJA_* variables)
//! cargo test -p mithadi-integration-tests --test petpooja_menu -- --ignored
//!
//! # Razorpay test mode (RAZORPAY_KEY_ID=rzp_test_...)
//! cargo test -p mithadi-integration-tests --test razorpay_orders -- --ignored
//! ```
//!
//! Every test is `#[ignore]`d because it talks to a live API. Configuration
//! is read from the environment (and `.env`) the same way the CLI reads it.

#![allow(clippy::missing_panics_doc)]

use std::sync::Arc;

use mithadi_storefront::config::{BackendConfig, PetpoojaConfig, RazorpayConfig, ShopifyConfig};
use mithadi_storefront::{CatalogBackend, StorefrontConfig, catalog};

/// Load configuration from the environment.
#[must_use]
pub fn config() -> StorefrontConfig {
    StorefrontConfig::from_env().expect("Failed to load configuration from environment")
}

/// Shopify settings; requires `CATALOG_BACKEND=shopify`.
#[must_use]
pub fn shopify_config() -> ShopifyConfig {
    match config().backend {
        BackendConfig::Shopify(shopify) => shopify,
        BackendConfig::Petpooja(_) => panic!("Set CATALOG_BACKEND=shopify to run Shopify tests"),
    }
}

/// `PetPooja` settings; requires `CATALOG_BACKEND=petpooja`.
#[must_use]
pub fn petpooja_config() -> PetpoojaConfig {
    match config().backend {
        BackendConfig::Petpooja(petpooja) => petpooja,
        BackendConfig::Shopify(_) => panic!("Set CATALOG_BACKEND=petpooja to run PetPooja tests"),
    }
}

/// Razorpay settings; requires test-mode keys.
#[must_use]
pub fn razorpay_config() -> RazorpayConfig {
    let payment = config()
        .payment
        .expect("Set RAZORPAY_KEY_ID and RAZORPAY_KEY_SECRET to run payment tests");
    assert!(
        payment.key_id.starts_with("rzp_test_"),
        "Refusing to run payment tests with live Razorpay keys"
    );
    payment
}

/// The configured catalog backend.
#[must_use]
pub fn backend() -> Arc<dyn CatalogBackend> {
    catalog::from_config(&config().backend)
}
