//! Shopper-facing notices (toasts) broadcast by the cart store.

use serde::Serialize;

pub const ADDED_TO_CART: &str = "Product added to cart";
pub const SYNC_FAILED: &str = "Failed to update cart";
pub const CART_EMPTY: &str = "Cart is empty";
pub const PAYMENT_FAILED: &str = "Payment failed. Please try again.";
pub const PAYMENT_SUCCEEDED: &str = "Payment successful! Order placed.";
pub const PAYMENT_UNVERIFIED: &str = "Payment could not be verified";

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A short message for the shopper. Never carries internal error details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
