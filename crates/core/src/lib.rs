//! Mithadi Core - Shared types library.
//!
//! This crate provides the domain types shared by every Mithadi component:
//! - `storefront` - Cart store, catalog backends and payment adapter
//! - `cli` - Command-line driver for the cart store
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! Backend adapters convert their wire formats into these types, so the cart
//! store never depends on which backend produced a product.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money, catalog snapshots and contact details

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
