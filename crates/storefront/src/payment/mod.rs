//! Payment gateway port and the typed contract of the hosted payment widget.
//!
//! The flow is:
//! 1. the server creates a gateway order for the cart total ([`OrderRequest`])
//! 2. the widget is opened with [`CheckoutOptions`] built from that order
//! 3. the widget's success callback hands back a [`PaymentConfirmation`],
//!    which is verified server-side before the cart is cleared

pub mod razorpay;

pub use razorpay::RazorpayGateway;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use mithadi_core::{CurrencyCode, Email, EmailError, Phone, PhoneError};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

/// Smallest order the gateway accepts, in minor units (₹1.00).
pub const MIN_ORDER_AMOUNT: u64 = 100;
/// Longest receipt reference the gateway accepts.
pub const MAX_RECEIPT_LEN: usize = 40;

/// Errors from the payment gateway or from validating payment data.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway rejected the request.
    #[error("Gateway error {code}: {description}")]
    Api {
        /// Gateway error code.
        code: String,
        /// Gateway error description.
        description: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Order request failed validation.
    #[error("Invalid order request: {0}")]
    InvalidRequest(String),

    /// Prefill email failed validation.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Prefill contact number failed validation.
    #[error("Invalid contact number: {0}")]
    InvalidContact(#[from] PhoneError),

    /// The confirmation does not belong to the order being completed.
    #[error("Order mismatch: expected {expected}, got {got}")]
    OrderMismatch {
        /// Order the confirmation was checked against.
        expected: String,
        /// Order named by the confirmation.
        got: String,
    },

    /// The confirmation signature does not verify.
    #[error("Invalid payment signature")]
    InvalidSignature,

    /// The order has no payment against it yet.
    #[error("Order {order_id} is not paid (status: {status})")]
    OrderNotPaid {
        /// Gateway order ID.
        order_id: String,
        /// Gateway order status.
        status: String,
    },

    /// The order amount does not match what the cart costs now.
    #[error("Order amount {paid} does not match cart total {expected}")]
    AmountMismatch {
        /// Current cart total in minor units.
        expected: u64,
        /// Order amount in minor units.
        paid: u64,
    },
}

/// A validated request to create a gateway order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    amount: u64,
    currency: CurrencyCode,
    receipt: String,
}

impl OrderRequest {
    /// Build an order request.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::InvalidRequest`] if the amount is below
    /// [`MIN_ORDER_AMOUNT`] or the receipt is empty or longer than
    /// [`MAX_RECEIPT_LEN`] characters.
    pub fn new(
        amount: u64,
        currency: CurrencyCode,
        receipt: impl Into<String>,
    ) -> Result<Self, PaymentError> {
        let receipt = receipt.into();
        if amount < MIN_ORDER_AMOUNT {
            return Err(PaymentError::InvalidRequest(format!(
                "amount {amount} is below the minimum of {MIN_ORDER_AMOUNT}"
            )));
        }
        let receipt_len = receipt.chars().count();
        if receipt_len == 0 || receipt_len > MAX_RECEIPT_LEN {
            return Err(PaymentError::InvalidRequest(format!(
                "receipt must be 1-{MAX_RECEIPT_LEN} characters (got {receipt_len})"
            )));
        }
        Ok(Self {
            amount,
            currency,
            receipt,
        })
    }

    /// Amount in minor units.
    #[must_use]
    pub const fn amount(&self) -> u64 {
        self.amount
    }

    /// Currency of the amount.
    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    /// Merchant receipt reference.
    #[must_use]
    pub fn receipt(&self) -> &str {
        &self.receipt
    }
}

/// An order created at the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOrder {
    /// Gateway order ID (e.g. `order_Ox1...`).
    pub id: String,
    /// Amount in minor units.
    pub amount: u64,
    /// Currency of the amount.
    pub currency: CurrencyCode,
    /// Gateway order status (`created`, `attempted`, `paid`).
    pub status: String,
    /// Merchant receipt reference.
    #[serde(default)]
    pub receipt: Option<String>,
}

impl PaymentOrder {
    /// Whether a payment has been made against the order.
    #[must_use]
    pub fn has_payment_attempt(&self) -> bool {
        matches!(self.status.as_str(), "attempted" | "paid")
    }
}

/// Customer details pre-filled in the widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Prefill {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Phone>,
}

impl Prefill {
    /// Build a prefill from raw form input, validating email and contact.
    ///
    /// Blank fields are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if a non-blank email or contact is malformed.
    pub fn parse(
        name: Option<&str>,
        email: Option<&str>,
        contact: Option<&str>,
    ) -> Result<Self, PaymentError> {
        let blank = |s: &&str| !s.trim().is_empty();
        Ok(Self {
            name: name.filter(blank).map(|s| s.trim().to_string()),
            email: email.filter(blank).map(Email::parse).transpose()?,
            contact: contact.filter(blank).map(Phone::parse).transpose()?,
        })
    }
}

/// Widget accent color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub color: String,
}

/// Options the hosted payment widget is opened with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutOptions {
    /// Public key id.
    pub key: String,
    /// Amount in minor units.
    pub amount: u64,
    /// Currency of the amount.
    pub currency: CurrencyCode,
    /// Merchant name.
    pub name: String,
    /// Line shown under the merchant name.
    pub description: String,
    /// Gateway order being paid.
    pub order_id: String,
    /// Pre-filled customer details.
    pub prefill: Prefill,
    /// Widget theme.
    pub theme: Theme,
}

/// Payload of the widget's success callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub razorpay_payment_id: String,
    pub razorpay_order_id: String,
    pub razorpay_signature: String,
}

/// Payment gateway operations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order for the given request.
    async fn create_order(&self, request: &OrderRequest) -> Result<PaymentOrder, PaymentError>;

    /// Look up an existing order.
    async fn fetch_order(&self, order_id: &str) -> Result<PaymentOrder, PaymentError>;

    /// Widget options for paying `order`.
    fn checkout_options(&self, order: &PaymentOrder, prefill: Prefill) -> CheckoutOptions;

    /// Verify that `confirmation` is an authentic success callback for `order`.
    fn verify_payment(
        &self,
        order: &PaymentOrder,
        confirmation: &PaymentConfirmation,
    ) -> Result<(), PaymentError>;
}

/// Hex HMAC-SHA256 of `"{order_id}|{payment_id}"` keyed with `secret`.
///
/// # Errors
///
/// Returns [`PaymentError::InvalidSignature`] if the key is rejected.
pub fn payment_signature(
    secret: &[u8],
    order_id: &str,
    payment_id: &str,
) -> Result<String, PaymentError> {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret).map_err(|_| PaymentError::InvalidSignature)?;
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Check a success callback against an order using the gateway secret.
///
/// # Errors
///
/// Returns [`PaymentError::OrderMismatch`] if the callback names another
/// order, or [`PaymentError::InvalidSignature`] if the signature is wrong.
pub fn verify_signature(
    secret: &[u8],
    order: &PaymentOrder,
    confirmation: &PaymentConfirmation,
) -> Result<(), PaymentError> {
    if order.id != confirmation.razorpay_order_id {
        return Err(PaymentError::OrderMismatch {
            expected: order.id.clone(),
            got: confirmation.razorpay_order_id.clone(),
        });
    }

    let expected = payment_signature(secret, &order.id, &confirmation.razorpay_payment_id)?;
    if !constant_time_compare(&expected, &confirmation.razorpay_signature.to_ascii_lowercase()) {
        return Err(PaymentError::InvalidSignature);
    }

    Ok(())
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}
