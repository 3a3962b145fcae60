//! Mithadi Palace storefront library.
//!
//! The shopper's cart and everything it talks to:
//! - [`cart`] - Cart store with local persistence and debounced checkout sync
//! - [`catalog`] - The catalog backend port and its checkout types
//! - [`shopify`] - Shopify Storefront API adapter
//! - [`petpooja`] - `PetPooja` menu adapter
//! - [`payment`] - Payment gateway port and the Razorpay adapter
//! - [`config`] - Environment configuration
//!
//! # Example
//!
//! ```rust,ignore
//! let config = StorefrontConfig::from_env()?;
//! let backend = catalog::from_config(&config.backend);
//! let cart = CartStore::builder()
//!     .backend(backend)
//!     .storage(Arc::new(FileStorage::new(&config.cart.storage_dir)))
//!     .build()?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod notice;
pub mod payment;
pub mod petpooja;
pub mod shopify;

#[cfg(test)]
mod testing;

pub use cart::{CartLineItem, CartStore, CartStoreBuilder, FileStorage, MemoryStorage};
pub use catalog::{BackendError, CatalogBackend, LineItemInput, RemoteCheckout};
pub use config::StorefrontConfig;
pub use error::{CartError, Result};
pub use notice::{Notice, NoticeLevel};
pub use payment::{PaymentGateway, RazorpayGateway};
