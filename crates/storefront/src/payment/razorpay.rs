//! Razorpay Orders API client.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::{BrandConfig, RazorpayConfig};

use super::{
    CheckoutOptions, OrderRequest, PaymentConfirmation, PaymentError, PaymentGateway,
    PaymentOrder, Prefill, Theme, verify_signature,
};

const API_BASE_URL: &str = "https://api.razorpay.com/v1";
const ORDER_DESCRIPTION: &str = "Order Payment";

/// Razorpay error envelope.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

/// Razorpay payment gateway.
#[derive(Clone)]
pub struct RazorpayGateway {
    inner: Arc<RazorpayGatewayInner>,
}

struct RazorpayGatewayInner {
    client: reqwest::Client,
    key_id: String,
    key_secret: SecretString,
    brand: BrandConfig,
}

impl RazorpayGateway {
    /// Create a new Razorpay client.
    #[must_use]
    pub fn new(config: &RazorpayConfig, brand: &BrandConfig) -> Self {
        Self {
            inner: Arc::new(RazorpayGatewayInner {
                client: reqwest::Client::new(),
                key_id: config.key_id.clone(),
                key_secret: config.key_secret.clone(),
                brand: brand.clone(),
            }),
        }
    }

    async fn parse_response(response: reqwest::Response) -> Result<PaymentOrder, PaymentError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let (code, description) = serde_json::from_str::<ErrorResponse>(&body).map_or_else(
                |_| (status.as_u16().to_string(), body.chars().take(200).collect()),
                |e| (e.error.code, e.error.description),
            );
            tracing::error!(
                status = %status,
                code = %code,
                description = %description,
                "Razorpay API returned non-success status"
            );
            return Err(PaymentError::Api { code, description });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    #[instrument(skip(self), fields(amount = request.amount(), receipt = %request.receipt()))]
    async fn create_order(&self, request: &OrderRequest) -> Result<PaymentOrder, PaymentError> {
        let response = self
            .inner
            .client
            .post(format!("{API_BASE_URL}/orders"))
            .basic_auth(&self.inner.key_id, Some(self.inner.key_secret.expose_secret()))
            .json(request)
            .send()
            .await?;

        let order = Self::parse_response(response).await?;
        debug!(order_id = %order.id, "Created Razorpay order");
        Ok(order)
    }

    #[instrument(skip(self))]
    async fn fetch_order(&self, order_id: &str) -> Result<PaymentOrder, PaymentError> {
        let response = self
            .inner
            .client
            .get(format!("{API_BASE_URL}/orders/{order_id}"))
            .basic_auth(&self.inner.key_id, Some(self.inner.key_secret.expose_secret()))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    fn checkout_options(&self, order: &PaymentOrder, prefill: Prefill) -> CheckoutOptions {
        CheckoutOptions {
            key: self.inner.key_id.clone(),
            amount: order.amount,
            currency: order.currency,
            name: self.inner.brand.store_name.clone(),
            description: ORDER_DESCRIPTION.to_string(),
            order_id: order.id.clone(),
            prefill,
            theme: Theme {
                color: self.inner.brand.theme_color.clone(),
            },
        }
    }

    #[instrument(skip(self, confirmation), fields(order_id = %order.id))]
    fn verify_payment(
        &self,
        order: &PaymentOrder,
        confirmation: &PaymentConfirmation,
    ) -> Result<(), PaymentError> {
        verify_signature(
            self.inner.key_secret.expose_secret().as_bytes(),
            order,
            confirmation,
        )
    }
}
