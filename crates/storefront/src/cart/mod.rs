//! The shopper's cart.
//!
//! [`CartStore`] is the single source of truth for line items, the mirrored
//! remote checkout and the cart drawer. Mutations are local and synchronous:
//! they update memory, persist to [`CartStorage`] and schedule a debounced
//! reconciliation with the [`CatalogBackend`].
//!
//! # Sync policy
//!
//! - Local state changes first and is never rolled back
//! - After a quiet period (1 s by default) the remote checkout is created, or
//!   its line items are replaced with the local ones
//! - Failures are logged, captured to Sentry and surfaced as an error
//!   [`Notice`]; nothing is retried until the next mutation
//! - Remote calls are serialized, and a response that arrives after the cart
//!   was emptied is discarded
//!
//! After a quiet period without failures the remote checkout holds exactly the
//! local line items.

mod line_item;
pub mod storage;
mod sync;

pub use line_item::CartLineItem;
pub use storage::{CART_KEY, CHECKOUT_KEY, CartStorage, FileStorage, MemoryStorage, StorageError};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use mithadi_core::{Money, Product, Variant, VariantId};
use tokio::sync::{Mutex, broadcast, watch};
use tracing::{debug, instrument, warn};

use crate::catalog::{CatalogBackend, RemoteCheckout};
use crate::error::{CartError, Result, add_breadcrumb};
use crate::notice::{self, Notice};
use crate::payment::{
    CheckoutOptions, OrderRequest, PaymentConfirmation, PaymentError, PaymentGateway,
    PaymentOrder, Prefill,
};

/// Default quiet period before the checkout is reconciled.
pub const DEFAULT_SYNC_DEBOUNCE: Duration = Duration::from_secs(1);

const NOTICE_CAPACITY: usize = 32;

/// Handle to a shopper's cart. Cheap to clone; clones share state.
///
/// Must be built inside a Tokio runtime, which runs its sync worker.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartInner>,
}

struct CartInner {
    backend: Arc<dyn CatalogBackend>,
    storage: Arc<dyn CartStorage>,
    state: RwLock<CartState>,
    revision: watch::Sender<u64>,
    notices: broadcast::Sender<Notice>,
    sync_lock: Mutex<()>,
    syncing: AtomicBool,
}

#[derive(Default)]
struct CartState {
    items: Vec<CartLineItem>,
    checkout: Option<RemoteCheckout>,
    is_open: bool,
    /// Bumped whenever the cart is emptied; in-flight syncs compare it.
    epoch: u64,
    /// Order created for the cart as it is now. Any mutation drops it.
    pending_order: Option<PaymentOrder>,
}

/// Builder for [`CartStore`].
#[derive(Default)]
pub struct CartStoreBuilder {
    backend: Option<Arc<dyn CatalogBackend>>,
    storage: Option<Arc<dyn CartStorage>>,
    sync_debounce: Option<Duration>,
}

impl CartStoreBuilder {
    /// Catalog backend the checkout is mirrored to. Required.
    #[must_use]
    pub fn backend(mut self, backend: Arc<dyn CatalogBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Durable storage. Defaults to [`MemoryStorage`].
    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn CartStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Quiet period before reconciliation. Defaults to [`DEFAULT_SYNC_DEBOUNCE`].
    #[must_use]
    pub const fn sync_debounce(mut self, debounce: Duration) -> Self {
        self.sync_debounce = Some(debounce);
        self
    }

    /// Load persisted state and start the sync worker.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::MissingBackend`] if no backend was set, or
    /// [`CartError::NoRuntime`] outside a Tokio runtime.
    pub fn build(self) -> Result<CartStore> {
        let backend = self.backend.ok_or(CartError::MissingBackend)?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| CartError::NoRuntime)?;
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStorage::new()));
        let debounce = self.sync_debounce.unwrap_or(DEFAULT_SYNC_DEBOUNCE);

        let state = load_state(storage.as_ref());
        debug!(
            backend = backend.name(),
            items = state.items.len(),
            has_checkout = state.checkout.is_some(),
            "Loaded cart"
        );

        let (revision, revisions) = watch::channel(0);
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);

        let inner = Arc::new(CartInner {
            backend,
            storage,
            state: RwLock::new(state),
            revision,
            notices,
            sync_lock: Mutex::new(()),
            syncing: AtomicBool::new(false),
        });

        sync::spawn(&runtime, Arc::downgrade(&inner), revisions, debounce);

        Ok(CartStore { inner })
    }
}

/// Restore persisted state. Unreadable data is logged and ignored.
fn load_state(storage: &dyn CartStorage) -> CartState {
    let items = read_key::<Vec<CartLineItem>>(storage, CART_KEY).unwrap_or_default();
    // A checkout only mirrors a non-empty cart
    let checkout = read_key::<RemoteCheckout>(storage, CHECKOUT_KEY).filter(|_| !items.is_empty());

    CartState {
        items,
        checkout,
        ..CartState::default()
    }
}

fn read_key<T: serde::de::DeserializeOwned>(storage: &dyn CartStorage, key: &str) -> Option<T> {
    let raw = match storage.get(key) {
        Ok(raw) => raw?,
        Err(e) => {
            warn!(key, error = %e, "Failed to read persisted cart state");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "Ignoring corrupt persisted cart state");
            None
        }
    }
}

impl CartStore {
    /// Start building a cart store.
    #[must_use]
    pub fn builder() -> CartStoreBuilder {
        CartStoreBuilder::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, CartState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CartState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units of `variant`, merging with an existing line.
    ///
    /// Opens the cart drawer and emits a success notice. A zero quantity does
    /// nothing.
    #[instrument(skip(self, product, variant), fields(variant_id = %variant.id))]
    pub fn add_to_cart(&self, product: &Product, variant: &Variant, quantity: u32) {
        if quantity == 0 {
            return;
        }

        {
            let mut state = self.write();
            if let Some(item) = state.items.iter_mut().find(|i| i.variant_id == variant.id) {
                item.quantity = item.quantity.saturating_add(quantity);
            } else {
                state
                    .items
                    .push(CartLineItem::new(product, variant, quantity));
            }
            state.is_open = true;
            state.pending_order = None;
            self.persist_items(&state);
        }

        add_breadcrumb(
            "cart",
            "Added to cart",
            Some(&[("variant_id", variant.id.as_str())]),
        );
        self.notify(Notice::success(notice::ADDED_TO_CART));
        self.schedule_sync();
    }

    /// Remove the line for `variant_id`. Emptying the cart drops the checkout.
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub fn remove_from_cart(&self, variant_id: &VariantId) {
        {
            let mut state = self.write();
            let before = state.items.len();
            state.items.retain(|i| &i.variant_id != variant_id);
            if state.items.len() == before {
                return;
            }
            state.pending_order = None;
            if state.items.is_empty() {
                self.discard_checkout(&mut state);
            }
            self.persist_items(&state);
        }

        add_breadcrumb(
            "cart",
            "Removed from cart",
            Some(&[("variant_id", variant_id.as_str())]),
        );
        self.schedule_sync();
    }

    /// Set the quantity of an existing line. Zero removes the line; unknown
    /// variants are ignored.
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub fn update_quantity(&self, variant_id: &VariantId, quantity: u32) {
        if quantity < 1 {
            self.remove_from_cart(variant_id);
            return;
        }

        {
            let mut state = self.write();
            let Some(item) = state.items.iter_mut().find(|i| &i.variant_id == variant_id) else {
                return;
            };
            if item.quantity == quantity {
                return;
            }
            item.quantity = quantity;
            state.pending_order = None;
            self.persist_items(&state);
        }

        self.schedule_sync();
    }

    /// Empty the cart and forget the checkout. Makes no remote call, and a
    /// pending reconciliation finds nothing to do.
    #[instrument(skip(self))]
    pub fn clear_cart(&self) {
        let mut state = self.write();
        state.items.clear();
        state.pending_order = None;
        self.discard_checkout(&mut state);
        if let Err(e) = self.inner.storage.remove(CART_KEY) {
            CartError::from(e).report("Failed to remove persisted cart");
        }
        drop(state);

        add_breadcrumb("cart", "Cleared cart", None);
    }

    pub fn toggle_cart(&self) {
        let mut state = self.write();
        state.is_open = !state.is_open;
    }

    pub fn open_cart(&self) {
        self.write().is_open = true;
    }

    pub fn close_cart(&self) {
        self.write().is_open = false;
    }

    // =========================================================================
    // Reads
    // =========================================================================

    #[must_use]
    pub fn is_cart_open(&self) -> bool {
        self.read().is_open
    }

    /// Snapshot of the line items in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<CartLineItem> {
        self.read().items.clone()
    }

    /// The mirrored remote checkout, if one exists.
    #[must_use]
    pub fn checkout(&self) -> Option<RemoteCheckout> {
        self.read().checkout.clone()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn cart_count(&self) -> u64 {
        self.read().items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of price times quantity. `None` for an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if lines are priced in different currencies.
    pub fn subtotal(&self) -> Result<Option<Money>> {
        let state = self.read();
        let totals = state
            .items
            .iter()
            .map(CartLineItem::line_total)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Money::sum(totals)?)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().items.is_empty()
    }

    /// Whether a remote reconciliation is in flight.
    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.inner.syncing.load(Ordering::Acquire)
    }

    /// Receive notices emitted after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.inner.notices.subscribe()
    }

    // =========================================================================
    // Remote sync
    // =========================================================================

    /// Create the remote checkout, or replace its line items, right now.
    ///
    /// Waits for any reconciliation already in flight. Returns `None` when the
    /// cart is empty or was emptied before the backend answered.
    ///
    /// # Errors
    ///
    /// Returns the backend error; local state is left untouched.
    pub async fn reconcile(&self) -> Result<Option<RemoteCheckout>> {
        let _guard = self.inner.sync_lock.lock().await;

        let (lines, checkout_id, epoch) = {
            let state = self.read();
            if state.items.is_empty() {
                return Ok(None);
            }
            (
                state
                    .items
                    .iter()
                    .map(CartLineItem::to_input)
                    .collect::<Vec<_>>(),
                state.checkout.as_ref().map(|c| c.id.clone()),
                state.epoch,
            )
        };

        let result = {
            let _syncing = SyncingFlag::raise(&self.inner.syncing);
            match &checkout_id {
                Some(id) => self.inner.backend.update_checkout(id, &lines).await,
                None => self.inner.backend.create_checkout(&lines).await,
            }
        };
        let checkout = result?;

        let mut state = self.write();
        if state.epoch != epoch || state.items.is_empty() {
            debug!(checkout_id = %checkout.id, "Cart emptied during sync, discarding checkout");
            return Ok(None);
        }
        if checkout_id.is_none() {
            debug!(checkout_id = %checkout.id, "Created checkout");
        }
        state.checkout = Some(checkout.clone());
        self.persist_checkout(&checkout);
        drop(state);

        Ok(Some(checkout))
    }

    /// Reconcile, reporting failures instead of returning them.
    async fn sync(&self) {
        if let Err(e) = self.reconcile().await {
            e.report("Failed to sync checkout");
            self.notify(Notice::error(notice::SYNC_FAILED));
        }
    }

    fn schedule_sync(&self) {
        self.inner.revision.send_modify(|r| *r = r.wrapping_add(1));
    }

    // =========================================================================
    // Payment
    // =========================================================================

    /// Start paying for the cart.
    ///
    /// Brings the checkout up to date, creates a gateway order for its total
    /// and returns the options to open the hosted widget with. The amount is
    /// the checkout's total price, or the local subtotal when the backend
    /// does not price checkouts.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::EmptyCart`] for an empty cart, or the sync,
    /// pricing or gateway error. Every failure also emits an error notice.
    #[instrument(skip(self, gateway, prefill))]
    pub async fn process_payment(
        &self,
        gateway: &dyn PaymentGateway,
        prefill: Prefill,
    ) -> Result<CheckoutOptions> {
        if self.is_empty() {
            self.notify(Notice::error(notice::CART_EMPTY));
            return Err(CartError::EmptyCart);
        }

        match self.create_payment(gateway, prefill).await {
            Ok(options) => Ok(options),
            Err(e) => {
                e.report("Payment failed");
                self.notify(Notice::error(notice::PAYMENT_FAILED));
                Err(e)
            }
        }
    }

    async fn create_payment(
        &self,
        gateway: &dyn PaymentGateway,
        prefill: Prefill,
    ) -> Result<CheckoutOptions> {
        let (checkout, total) = self.payable_total().await?;

        let receipt = format!("rcpt_{}", uuid::Uuid::new_v4().simple());
        let request = OrderRequest::new(total.minor_units()?, total.currency_code, receipt)?;
        let order = gateway.create_order(&request).await?;

        add_breadcrumb(
            "payment",
            "Created payment order",
            Some(&[("order_id", order.id.as_str()), ("checkout_id", checkout.id.as_str())]),
        );

        let options = gateway.checkout_options(&order, prefill);
        self.write().pending_order = Some(order);
        Ok(options)
    }

    /// Bring the checkout up to date and return it with the amount to charge:
    /// its total price, or the local subtotal when the backend does not
    /// price checkouts.
    async fn payable_total(&self) -> Result<(RemoteCheckout, Money)> {
        let checkout = self.reconcile().await?.ok_or(CartError::EmptyCart)?;
        let total = if checkout.total_price.is_zero() {
            self.subtotal()?.ok_or(CartError::EmptyCart)?
        } else {
            checkout.total_price
        };
        Ok((checkout, total))
    }

    /// Finish a payment from the widget's success callback.
    ///
    /// The confirmation is verified against the order before anything
    /// changes. An order created by this store is trusted only while the
    /// cart is unchanged since [`process_payment`](Self::process_payment).
    /// Any other order is fetched from the gateway, must have a payment
    /// attempt, and must match the current cart total. On success the cart
    /// is cleared and the drawer closed.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the order cannot be found, has not been
    /// paid, does not cover the cart, or the signature does not verify; the
    /// cart is left untouched.
    #[instrument(skip(self, gateway, confirmation), fields(order_id = %confirmation.razorpay_order_id))]
    pub async fn complete_payment(
        &self,
        gateway: &dyn PaymentGateway,
        confirmation: &PaymentConfirmation,
    ) -> Result<()> {
        let pending = self
            .read()
            .pending_order
            .clone()
            .filter(|o| o.id == confirmation.razorpay_order_id);

        if let Err(e) = self.verify_confirmation(gateway, confirmation, pending).await {
            e.report("Payment verification failed");
            self.notify(Notice::error(notice::PAYMENT_UNVERIFIED));
            return Err(e);
        }

        add_breadcrumb(
            "payment",
            "Payment verified",
            Some(&[("payment_id", confirmation.razorpay_payment_id.as_str())]),
        );
        self.clear_cart();
        self.close_cart();
        self.notify(Notice::success(notice::PAYMENT_SUCCEEDED));
        Ok(())
    }

    async fn verify_confirmation(
        &self,
        gateway: &dyn PaymentGateway,
        confirmation: &PaymentConfirmation,
        pending: Option<PaymentOrder>,
    ) -> Result<()> {
        if let Some(order) = pending {
            gateway.verify_payment(&order, confirmation)?;
            return Ok(());
        }

        let order = gateway
            .fetch_order(&confirmation.razorpay_order_id)
            .await?;
        if !order.has_payment_attempt() {
            return Err(PaymentError::OrderNotPaid {
                order_id: order.id,
                status: order.status,
            }
            .into());
        }
        gateway.verify_payment(&order, confirmation)?;

        let (_, total) = self.payable_total().await?;
        let expected = total.minor_units()?;
        if order.amount != expected {
            return Err(PaymentError::AmountMismatch {
                expected,
                paid: order.amount,
            }
            .into());
        }
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn notify(&self, notice: Notice) {
        // No subscribers is fine
        let _ = self.inner.notices.send(notice);
    }

    fn discard_checkout(&self, state: &mut CartState) {
        state.checkout = None;
        state.epoch = state.epoch.wrapping_add(1);
        if let Err(e) = self.inner.storage.remove(CHECKOUT_KEY) {
            CartError::from(e).report("Failed to remove persisted checkout");
        }
    }

    fn persist_items(&self, state: &CartState) {
        let result = serde_json::to_string(&state.items)
            .map_err(StorageError::from)
            .and_then(|json| self.inner.storage.set(CART_KEY, &json));
        if let Err(e) = result {
            CartError::from(e).report("Failed to persist cart");
        }
    }

    fn persist_checkout(&self, checkout: &RemoteCheckout) {
        let result = serde_json::to_string(checkout)
            .map_err(StorageError::from)
            .and_then(|json| self.inner.storage.set(CHECKOUT_KEY, &json));
        if let Err(e) = result {
            CartError::from(e).report("Failed to persist checkout");
        }
    }
}

/// Sets a flag for as long as it lives.
struct SyncingFlag<'a>(&'a AtomicBool);

impl<'a> SyncingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for SyncingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
