//! Catalog backend port.
//!
//! The cart store talks to exactly one catalog backend, chosen at start-up.
//! Both backends normalize into the `mithadi_core` product types and expose
//! the same four operations.

use std::sync::Arc;

use async_trait::async_trait;
use mithadi_core::{CheckoutId, CurrencyCode, Money, Product, VariantId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::BackendConfig;
use crate::petpooja::{PetpoojaClient, PetpoojaError};
use crate::shopify::{ShopifyError, StorefrontClient};

/// Errors surfaced by a catalog backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Shopify Storefront API failure.
    #[error(transparent)]
    Shopify(#[from] ShopifyError),

    /// `PetPooja` menu API failure.
    #[error(transparent)]
    Petpooja(#[from] PetpoojaError),

    /// No product with the requested handle.
    #[error("Product not found: {0}")]
    ProductNotFound(String),
}

/// A line the remote checkout should contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    /// Variant being purchased.
    pub variant_id: VariantId,
    /// Units of that variant.
    pub quantity: u32,
}

/// The backend's view of the shopper's checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCheckout {
    /// Backend checkout ID.
    pub id: CheckoutId,
    /// Hosted checkout URL (`#` when the backend has none).
    pub web_url: String,
    /// Sum of line prices before tax.
    pub subtotal_price: Money,
    /// Amount to charge.
    pub total_price: Money,
    /// Tax portion, when the backend reports it.
    #[serde(default)]
    pub total_tax: Option<Money>,
}

impl RemoteCheckout {
    /// A checkout with zero totals, used when the backend has no checkout API.
    #[must_use]
    pub fn placeholder(id: CheckoutId, currency: CurrencyCode) -> Self {
        Self {
            id,
            web_url: "#".to_string(),
            subtotal_price: Money::zero(currency),
            total_price: Money::zero(currency),
            total_tax: Some(Money::zero(currency)),
        }
    }
}

/// Product catalog and checkout operations shared by every backend.
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Fetch the product listing.
    async fn fetch_products(&self) -> Result<Vec<Product>, BackendError>;

    /// Fetch a single product by its URL handle.
    async fn fetch_product_by_handle(&self, handle: &str) -> Result<Product, BackendError>;

    /// Create a remote checkout containing `items`.
    async fn create_checkout(&self, items: &[LineItemInput])
    -> Result<RemoteCheckout, BackendError>;

    /// Replace the line items of an existing checkout.
    async fn update_checkout(
        &self,
        id: &CheckoutId,
        items: &[LineItemInput],
    ) -> Result<RemoteCheckout, BackendError>;
}

/// Build the backend selected by configuration.
#[must_use]
pub fn from_config(config: &BackendConfig) -> Arc<dyn CatalogBackend> {
    match config {
        BackendConfig::Shopify(shopify) => Arc::new(StorefrontClient::new(shopify)),
        BackendConfig::Petpooja(petpooja) => Arc::new(PetpoojaClient::new(petpooja)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_checkout() {
        let checkout = RemoteCheckout::placeholder(CheckoutId::new("checkout_1"), CurrencyCode::INR);
        assert_eq!(checkout.web_url, "#");
        assert!(checkout.total_price.is_zero());
        assert_eq!(checkout.total_price.currency_code, CurrencyCode::INR);
    }

    #[test]
    fn test_checkout_wire_shape() {
        let checkout = RemoteCheckout::placeholder(CheckoutId::new("c1"), CurrencyCode::INR);
        let json = serde_json::to_value(&checkout).unwrap();
        assert_eq!(json["webUrl"], serde_json::json!("#"));
        assert_eq!(json["totalPrice"]["amount"], serde_json::json!("0"));

        let back: RemoteCheckout = serde_json::from_value(json).unwrap();
        assert_eq!(back, checkout);
    }

    #[test]
    fn test_not_found_display() {
        let err = BackendError::ProductNotFound("kaju-katli".to_string());
        assert_eq!(err.to_string(), "Product not found: kaju-katli");
    }
}
