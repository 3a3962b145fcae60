//! Cart error type with Sentry integration.
//!
//! Remote failures are never returned from cart mutations. They are logged,
//! captured to Sentry via [`CartError::report`] and surfaced to the shopper
//! as an error [`Notice`](crate::notice::Notice).

use mithadi_core::MoneyError;
use thiserror::Error;

use crate::cart::storage::StorageError;
use crate::catalog::BackendError;
use crate::payment::PaymentError;

/// Errors surfaced by the cart store.
#[derive(Debug, Error)]
pub enum CartError {
    /// Catalog backend operation failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Payment gateway operation failed.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Local persistence failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Cart amounts could not be combined.
    #[error("Pricing error: {0}")]
    Money(#[from] MoneyError),

    /// Operation needs at least one line item.
    #[error("Cart is empty")]
    EmptyCart,

    /// The store was built without a catalog backend.
    #[error("Cart store requires a catalog backend")]
    MissingBackend,

    /// The store was built outside a Tokio runtime.
    #[error("Cart store must be built inside a Tokio runtime")]
    NoRuntime,
}

impl CartError {
    /// Whether this error came from a remote service rather than local state.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Backend(_) | Self::Payment(_))
    }

    /// Log the error and capture it to Sentry.
    pub fn report(&self, context: &str) {
        let event_id = sentry::capture_error(self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            remote = self.is_remote(),
            "{context}"
        );
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of cart
/// actions leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("variant_id", "gid://shopify/ProductVariant/1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        assert_eq!(CartError::EmptyCart.to_string(), "Cart is empty");

        let err = CartError::Backend(BackendError::ProductNotFound("peda".to_string()));
        assert_eq!(err.to_string(), "Backend error: Product not found: peda");
    }

    #[test]
    fn test_is_remote() {
        assert!(CartError::Backend(BackendError::ProductNotFound("x".to_string())).is_remote());
        assert!(CartError::Payment(PaymentError::InvalidSignature).is_remote());
        assert!(!CartError::EmptyCart.is_remote());
        assert!(!CartError::Money(MoneyError::Overflow).is_remote());
    }

    #[test]
    fn test_report_without_sentry_client() {
        // No client is bound in tests, so capture is a no-op.
        CartError::EmptyCart.report("Cart operation failed");
        add_breadcrumb("cart", "Cleared cart", None);
    }
}
