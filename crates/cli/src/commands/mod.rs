//! Command implementations.
//!
//! Every command runs against a [`Session`]: the configured backend, the
//! file-backed cart and, when credentials are present, the payment gateway.

pub mod cart;
pub mod catalog;
pub mod payment;

use std::sync::Arc;

use mithadi_core::MoneyError;
use mithadi_storefront::catalog::{self as backends, BackendError, CatalogBackend};
use mithadi_storefront::config::ConfigError;
use mithadi_storefront::payment::PaymentError;
use mithadi_storefront::{
    CartError, CartStore, FileStorage, Notice, RazorpayGateway, StorefrontConfig,
};
use thiserror::Error;
use tokio::sync::broadcast;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Cart operation failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Catalog backend request failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Payment input or gateway failure.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Cart amounts could not be combined.
    #[error("Pricing error: {0}")]
    Money(#[from] MoneyError),

    /// Output could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Razorpay credentials are not configured.
    #[error("Payments are disabled: set RAZORPAY_KEY_ID and RAZORPAY_KEY_SECRET")]
    PaymentsDisabled,

    /// The product has no variant matching the request.
    #[error("No variant {variant} for sale on product {handle}")]
    UnknownVariant { handle: String, variant: String },
}

/// Everything a command needs.
pub struct Session {
    pub config: StorefrontConfig,
    pub backend: Arc<dyn CatalogBackend>,
    pub cart: CartStore,
    notices: broadcast::Receiver<Notice>,
}

impl Session {
    /// Build the backend and load the persisted cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart store cannot be built.
    pub fn open(config: StorefrontConfig) -> Result<Self, CliError> {
        let backend = backends::from_config(&config.backend);
        tracing::debug!(
            backend = backend.name(),
            storage_dir = %config.cart.storage_dir.display(),
            "Opening cart"
        );

        let cart = CartStore::builder()
            .backend(backend.clone())
            .storage(Arc::new(FileStorage::new(&config.cart.storage_dir)))
            .sync_debounce(config.cart.sync_debounce)
            .build()?;
        let notices = cart.subscribe();

        Ok(Self {
            config,
            backend,
            cart,
            notices,
        })
    }

    /// The Razorpay gateway, if credentials are configured.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::PaymentsDisabled`] without credentials.
    pub fn gateway(&self) -> Result<RazorpayGateway, CliError> {
        let payment = self
            .config
            .payment
            .as_ref()
            .ok_or(CliError::PaymentsDisabled)?;
        Ok(RazorpayGateway::new(payment, &self.config.brand))
    }

    /// Bring the remote checkout up to date before the process exits.
    ///
    /// A failure leaves the local cart as it is; the next run retries.
    pub async fn reconcile(&self) {
        match self.cart.reconcile().await {
            Ok(Some(checkout)) => {
                tracing::info!(checkout_id = %checkout.id, "Checkout up to date");
            }
            Ok(None) => {}
            Err(e) => {
                e.report("Failed to sync checkout");
                #[allow(clippy::print_stderr)]
                {
                    eprintln!("{}", mithadi_storefront::notice::SYNC_FAILED);
                }
            }
        }
    }

    /// Notices the cart emitted since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::iter::from_fn(|| self.notices.try_recv().ok()).collect()
    }

    /// Print the notices the cart emitted during this run.
    pub fn print_notices(&mut self) {
        for notice in self.take_notices() {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("{notice}");
            }
        }
    }
}
