//! Shopify Storefront API backend.
//!
//! # Architecture
//!
//! - GraphQL operations implement `graphql_client::GraphQLQuery` so request
//!   bodies and response types stay typed end to end
//! - Products are cached in memory via `moka` (5 minute TTL)
//! - Checkouts are mutable state and are never cached
//!
//! # Example
//!
//! ```rust,ignore
//! use mithadi_storefront::shopify::StorefrontClient;
//!
//! let client = StorefrontClient::new(&shopify_config);
//! let product = client.get_product_by_handle("kaju-katli").await?;
//! let checkout = client
//!     .create_checkout(&[LineItemInput {
//!         variant_id: product.variants[0].id.clone(),
//!         quantity: 2,
//!     }])
//!     .await?;
//! ```

mod storefront;

pub use storefront::StorefrontClient;

use mithadi_core::MoneyError;
use thiserror::Error;

/// Errors that can occur when interacting with the Shopify Storefront API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Shopify answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", join_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// The response carried neither data nor errors.
    #[error("Shopify response has no data")]
    MissingData,

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A price in the response could not be represented.
    #[error("Invalid price: {0}")]
    Money(#[from] MoneyError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// A checkout mutation rejected its input.
    #[error("User error: {0}")]
    UserError(String),
}

/// A GraphQL error returned by the Storefront API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQLError {
    pub message: String,
    /// Dotted response path, e.g. `checkoutCreate.checkout`.
    pub path: Option<String>,
}

impl std::fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{} (at {path})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

fn join_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BackendError;

    #[test]
    fn test_checkout_graphql_errors_display() {
        let err = ShopifyError::GraphQL(vec![
            GraphQLError {
                message: "Variant is no longer available".to_string(),
                path: Some("checkoutCreate.checkout".to_string()),
            },
            GraphQLError {
                message: "Throttled".to_string(),
                path: None,
            },
        ]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Variant is no longer available (at checkoutCreate.checkout); Throttled"
        );
    }

    #[test]
    fn test_status_error_reaches_backend_error() {
        let err = BackendError::from(ShopifyError::Status {
            status: 401,
            body: "Invalid API key or access token".to_string(),
        });
        assert!(err.to_string().contains("HTTP 401: Invalid API key or access token"));
    }
}
