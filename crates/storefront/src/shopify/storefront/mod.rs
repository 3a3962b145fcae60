//! Shopify Storefront API client implementation.
//!
//! Uses `graphql_client` request/response envelopes with `reqwest` 0.13 for HTTP.
//! Caches products using `moka` (5-minute TTL).

mod cache;
mod conversions;
pub mod queries;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use graphql_client::{GraphQLQuery, Response};
use mithadi_core::{CheckoutId, Product};
use moka::future::Cache;
use secrecy::ExposeSecret;
use tracing::{debug, instrument};

use crate::catalog::{BackendError, CatalogBackend, LineItemInput, RemoteCheckout};
use crate::config::ShopifyConfig;
use crate::shopify::{GraphQLError, ShopifyError};

use cache::{CacheKey, CacheValue};
use conversions::{convert_checkout, convert_product, user_errors};
use queries::{
    CheckoutCreate, CheckoutLineItemsReplace, GetProductByHandle, GetProducts, checkout_create,
    checkout_line_items_replace, get_product_by_handle, get_products,
};

/// Page size of the product listing.
const PRODUCT_PAGE_SIZE: i64 = 20;

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Provides typed access to products and checkouts. Products are cached for
/// 5 minutes.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    #[must_use]
    pub fn new(config: &ShopifyConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint: config.endpoint(),
                access_token: config.storefront_token.expose_secret().to_string(),
                cache,
            }),
        }
    }

    /// GraphQL endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Execute a GraphQL operation.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError> {
        let request_body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header("X-Shopify-Storefront-Access-Token", &self.inner.access_token)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate(&response_text, 500),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::Status {
                status: status.as_u16(),
                body: truncate(&response_text, 200),
            });
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %truncate(&response_text, 500),
                    "Failed to parse Shopify GraphQL response"
                );
                return Err(ShopifyError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, "GraphQL errors in response");
            return Err(ShopifyError::GraphQL(
                errors.into_iter().map(convert_graphql_error).collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                body = %truncate(&response_text, 500),
                "Shopify GraphQL response has no data and no errors"
            );
            ShopifyError::MissingData
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get the first page of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Vec<Product>, ShopifyError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let data = self
            .execute::<GetProducts>(get_products::Variables {
                first: PRODUCT_PAGE_SIZE,
            })
            .await?;

        let products = data
            .products
            .edges
            .into_iter()
            .map(|edge| convert_product(edge.node))
            .collect::<Vec<_>>();

        debug!(count = products.len(), "Fetched products from Shopify");

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a product by its handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_product_by_handle(&self, handle: &str) -> Result<Product, ShopifyError> {
        let cache_key = CacheKey::Product(handle.to_string());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let data = self
            .execute::<GetProductByHandle>(get_product_by_handle::Variables {
                handle: handle.to_string(),
            })
            .await?;

        let product_data = data
            .product_by_handle
            .ok_or_else(|| ShopifyError::NotFound(handle.to_string()))?;

        let product = convert_product(product_data);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    // =========================================================================
    // Checkout Methods (not cached - mutable state)
    // =========================================================================

    /// Create a checkout with the given line items.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or user errors are returned.
    #[instrument(skip(self, items), fields(lines = items.len()))]
    pub async fn create_checkout(
        &self,
        items: &[LineItemInput],
    ) -> Result<RemoteCheckout, ShopifyError> {
        let variables = checkout_create::Variables {
            input: checkout_create::CheckoutCreateInput {
                line_items: items.to_vec(),
            },
        };

        let data = self.execute::<CheckoutCreate>(variables).await?;

        if let Some(result) = data.checkout_create {
            if let Some(err) = user_errors(result.checkout_user_errors) {
                return Err(err);
            }

            if let Some(checkout) = result.checkout {
                let checkout = convert_checkout(checkout)?;
                debug!(checkout_id = %checkout.id, "Created Shopify checkout");
                return Ok(checkout);
            }
        }

        Err(ShopifyError::MissingData)
    }

    /// Replace every line item of an existing checkout.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or user errors are returned.
    #[instrument(skip(self, items), fields(checkout_id = %checkout_id, lines = items.len()))]
    pub async fn replace_checkout_line_items(
        &self,
        checkout_id: &CheckoutId,
        items: &[LineItemInput],
    ) -> Result<RemoteCheckout, ShopifyError> {
        let variables = checkout_line_items_replace::Variables {
            checkout_id: checkout_id.to_string(),
            line_items: items.to_vec(),
        };

        let data = self.execute::<CheckoutLineItemsReplace>(variables).await?;

        if let Some(result) = data.checkout_line_items_replace {
            if let Some(err) = user_errors(result.user_errors) {
                return Err(err);
            }

            if let Some(checkout) = result.checkout {
                return convert_checkout(checkout);
            }
        }

        Err(ShopifyError::MissingData)
    }
}

#[async_trait]
impl CatalogBackend for StorefrontClient {
    fn name(&self) -> &'static str {
        "shopify"
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, BackendError> {
        Ok(self.get_products().await?)
    }

    async fn fetch_product_by_handle(&self, handle: &str) -> Result<Product, BackendError> {
        match self.get_product_by_handle(handle).await {
            Ok(product) => Ok(product),
            Err(ShopifyError::NotFound(handle)) => Err(BackendError::ProductNotFound(handle)),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_checkout(
        &self,
        items: &[LineItemInput],
    ) -> Result<RemoteCheckout, BackendError> {
        Ok(Self::create_checkout(self, items).await?)
    }

    async fn update_checkout(
        &self,
        id: &CheckoutId,
        items: &[LineItemInput],
    ) -> Result<RemoteCheckout, BackendError> {
        Ok(self.replace_checkout_line_items(id, items).await?)
    }
}

fn convert_graphql_error(e: graphql_client::Error) -> GraphQLError {
    let path = e.path.filter(|p| !p.is_empty()).map(|p| {
        p.into_iter()
            .map(|fragment| match fragment {
                graphql_client::PathFragment::Key(key) => key,
                graphql_client::PathFragment::Index(i) => i.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    });
    GraphQLError {
        message: e.message,
        path,
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
