//! `PetPooja` point-of-sale menu backend.
//!
//! `PetPooja` only serves the menu. It has no checkout API, so checkouts are
//! local placeholders with zero totals and the payment flow prices the cart
//! itself.

pub mod menu;

use std::sync::Arc;

use async_trait::async_trait;
use mithadi_core::{CheckoutId, CurrencyCode, Product};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::catalog::{BackendError, CatalogBackend, LineItemInput, RemoteCheckout};
use crate::config::PetpoojaConfig;

use menu::{FetchMenuRequest, MenuResponse, normalize_menu};

/// Errors that can occur when calling the `PetPooja` API.
#[derive(Debug, Error)]
pub enum PetpoojaError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// The API reported a failure in its response body.
    #[error("PetPooja API error: {0}")]
    Api(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Client for the `PetPooja` menu API.
#[derive(Clone)]
pub struct PetpoojaClient {
    inner: Arc<PetpoojaClientInner>,
}

struct PetpoojaClientInner {
    client: reqwest::Client,
    menu_url: String,
    access_token: SecretString,
    app_secret: SecretString,
    app_key: String,
}

impl PetpoojaClient {
    /// Create a new `PetPooja` client.
    #[must_use]
    pub fn new(config: &PetpoojaConfig) -> Self {
        Self {
            inner: Arc::new(PetpoojaClientInner {
                client: reqwest::Client::new(),
                menu_url: format!("{}/menu/fetch_menu", config.base_url),
                access_token: config.access_token.clone(),
                app_secret: config.app_secret.clone(),
                app_key: config.app_key.clone(),
            }),
        }
    }

    /// Fetch and normalize the full menu.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API reports a failure or
    /// the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn fetch_menu(&self) -> Result<Vec<Product>, PetpoojaError> {
        let body = FetchMenuRequest {
            access_token: self.inner.access_token.expose_secret(),
            app_secret: self.inner.app_secret.expose_secret(),
            app_key: &self.inner.app_key,
        };

        let response = self
            .inner
            .client
            .post(&self.inner.menu_url)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "PetPooja API returned non-success status"
            );
            return Err(PetpoojaError::Status {
                status: status.as_u16(),
                body: response_text.chars().take(200).collect(),
            });
        }

        let menu: MenuResponse = serde_json::from_str(&response_text)?;
        if !menu.is_success() {
            let message = menu
                .message
                .unwrap_or_else(|| "Unknown error".to_string());
            tracing::error!(message = %message, "PetPooja API returned error");
            return Err(PetpoojaError::Api(message));
        }

        let products = normalize_menu(menu);
        debug!(count = products.len(), "Fetched products from PetPooja");
        Ok(products)
    }
}

#[async_trait]
impl CatalogBackend for PetpoojaClient {
    fn name(&self) -> &'static str {
        "petpooja"
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, BackendError> {
        Ok(self.fetch_menu().await?)
    }

    async fn fetch_product_by_handle(&self, handle: &str) -> Result<Product, BackendError> {
        self.fetch_menu()
            .await?
            .into_iter()
            .find(|p| p.handle == handle)
            .ok_or_else(|| BackendError::ProductNotFound(handle.to_string()))
    }

    async fn create_checkout(
        &self,
        items: &[LineItemInput],
    ) -> Result<RemoteCheckout, BackendError> {
        let id = CheckoutId::new(format!(
            "checkout_{}",
            chrono::Utc::now().timestamp_millis()
        ));
        debug!(checkout_id = %id, lines = items.len(), "Created placeholder checkout");
        Ok(RemoteCheckout::placeholder(id, CurrencyCode::INR))
    }

    async fn update_checkout(
        &self,
        id: &CheckoutId,
        items: &[LineItemInput],
    ) -> Result<RemoteCheckout, BackendError> {
        debug!(checkout_id = %id, lines = items.len(), "Updated placeholder checkout");
        Ok(RemoteCheckout::placeholder(id.clone(), CurrencyCode::INR))
    }
}
