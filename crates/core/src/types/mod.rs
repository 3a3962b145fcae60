//! Core types for the Mithadi storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod email;
pub mod id;
pub mod money;
pub mod phone;

pub use catalog::{Image, Product, Variant};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::{CurrencyCode, Money, MoneyError};
pub use phone::{Phone, PhoneError};
