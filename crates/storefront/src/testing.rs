//! In-memory test doubles for the catalog backend and payment gateway.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use mithadi_core::{
    CheckoutId, CurrencyCode, ImageId, Image, Money, Product, ProductId, Variant, VariantId,
};

use crate::catalog::{BackendError, CatalogBackend, LineItemInput, RemoteCheckout};
use crate::payment::{
    CheckoutOptions, OrderRequest, PaymentConfirmation, PaymentError, PaymentGateway,
    PaymentOrder, Prefill, Theme, payment_signature, verify_signature,
};
use crate::petpooja::PetpoojaError;

pub const GATEWAY_SECRET: &[u8] = b"gateway-test-secret";

pub fn inr(amount: &str) -> Money {
    Money::parse(amount, CurrencyCode::INR).unwrap()
}

/// A product with one variant per `(variant_id, price)` pair.
pub fn product(handle: &str, variants: &[(&str, &str)]) -> Product {
    Product {
        id: ProductId::new(format!("product-{handle}")),
        title: handle.replace('-', " "),
        description: String::new(),
        handle: handle.to_string(),
        product_type: "Sweets".to_string(),
        tags: vec![],
        images: vec![Image {
            id: ImageId::new(format!("image-{handle}")),
            url: format!("https://cdn.example.com/{handle}.jpg"),
            alt_text: None,
        }],
        variants: variants
            .iter()
            .map(|(id, price)| Variant {
                id: VariantId::new(*id),
                title: "250 g".to_string(),
                price: inr(price),
                available_for_sale: true,
                sku: String::new(),
                quantity_available: 10,
            })
            .collect(),
    }
}

/// Catalog backend that keeps checkouts in memory and counts calls.
#[derive(Default)]
pub struct MemoryBackend {
    products: Vec<Product>,
    /// Price checkouts from the catalog; otherwise return zero totals.
    priced: bool,
    latency: Option<Duration>,
    pub fail: AtomicBool,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub last_lines: Mutex<Vec<LineItemInput>>,
    in_flight: AtomicUsize,
    /// Most checkout calls ever running at once.
    pub peak_in_flight: AtomicUsize,
}

impl MemoryBackend {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            priced: true,
            ..Self::default()
        }
    }

    /// Zero totals, like a backend without a checkout API.
    pub fn unpriced(mut self) -> Self {
        self.priced = false;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn remote_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst) + self.update_calls.load(Ordering::SeqCst)
    }

    pub fn last_lines(&self) -> Vec<LineItemInput> {
        self.last_lines.lock().unwrap().clone()
    }

    async fn checkout(
        &self,
        id: CheckoutId,
        items: &[LineItemInput],
    ) -> Result<RemoteCheckout, BackendError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail.load(Ordering::SeqCst) {
            return Err(PetpoojaError::Api("backend unavailable".to_string()).into());
        }
        *self.last_lines.lock().unwrap() = items.to_vec();

        if !self.priced {
            return Ok(RemoteCheckout::placeholder(id, CurrencyCode::INR));
        }

        let mut total = Money::zero(CurrencyCode::INR);
        for line in items {
            let price = self
                .products
                .iter()
                .flat_map(|p| &p.variants)
                .find(|v| v.id == line.variant_id)
                .map_or_else(|| Money::zero(CurrencyCode::INR), |v| v.price);
            total = total.checked_add(price.checked_mul(line.quantity).unwrap()).unwrap();
        }

        Ok(RemoteCheckout {
            web_url: format!("https://checkout.example.com/{id}"),
            id,
            subtotal_price: total,
            total_price: total,
            total_tax: None,
        })
    }
}

#[async_trait]
impl CatalogBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, BackendError> {
        Ok(self.products.clone())
    }

    async fn fetch_product_by_handle(&self, handle: &str) -> Result<Product, BackendError> {
        self.products
            .iter()
            .find(|p| p.handle == handle)
            .cloned()
            .ok_or_else(|| BackendError::ProductNotFound(handle.to_string()))
    }

    async fn create_checkout(
        &self,
        items: &[LineItemInput],
    ) -> Result<RemoteCheckout, BackendError> {
        let n = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.checkout(CheckoutId::new(format!("checkout-{n}")), items)
            .await
    }

    async fn update_checkout(
        &self,
        id: &CheckoutId,
        items: &[LineItemInput],
    ) -> Result<RemoteCheckout, BackendError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.checkout(id.clone(), items).await
    }
}

/// Payment gateway that signs with [`GATEWAY_SECRET`] and keeps orders in memory.
#[derive(Default)]
pub struct FakeGateway {
    pub orders: Mutex<HashMap<String, PaymentOrder>>,
    pub requests: Mutex<Vec<OrderRequest>>,
    pub fail: AtomicBool,
}

impl FakeGateway {
    pub fn last_request(&self) -> Option<OrderRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Mark `order_id` paid and return the success callback for it.
    pub fn settle(&self, order_id: &str, payment_id: &str) -> PaymentConfirmation {
        if let Some(order) = self.orders.lock().unwrap().get_mut(order_id) {
            order.status = "paid".to_string();
        }
        PaymentConfirmation {
            razorpay_payment_id: payment_id.to_string(),
            razorpay_order_id: order_id.to_string(),
            razorpay_signature: payment_signature(GATEWAY_SECRET, order_id, payment_id).unwrap(),
        }
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(&self, request: &OrderRequest) -> Result<PaymentOrder, PaymentError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PaymentError::Api {
                code: "SERVER_ERROR".to_string(),
                description: "gateway down".to_string(),
            });
        }
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        let order = PaymentOrder {
            id: format!("order_test{}", requests.len()),
            amount: request.amount(),
            currency: request.currency(),
            status: "created".to_string(),
            receipt: Some(request.receipt().to_string()),
        };
        self.orders
            .lock()
            .unwrap()
            .insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn fetch_order(&self, order_id: &str) -> Result<PaymentOrder, PaymentError> {
        self.orders
            .lock()
            .unwrap()
            .get(order_id)
            .cloned()
            .ok_or_else(|| PaymentError::Api {
                code: "BAD_REQUEST_ERROR".to_string(),
                description: "The id provided does not exist".to_string(),
            })
    }

    fn checkout_options(&self, order: &PaymentOrder, prefill: Prefill) -> CheckoutOptions {
        CheckoutOptions {
            key: "rzp_test_key".to_string(),
            amount: order.amount,
            currency: order.currency,
            name: "Mithadi Palace".to_string(),
            description: "Order Payment".to_string(),
            order_id: order.id.clone(),
            prefill,
            theme: Theme {
                color: "#D4A574".to_string(),
            },
        }
    }

    fn verify_payment(
        &self,
        order: &PaymentOrder,
        confirmation: &PaymentConfirmation,
    ) -> Result<(), PaymentError> {
        verify_signature(GATEWAY_SECRET, order, confirmation)
    }
}
