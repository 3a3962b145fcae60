//! Backend-agnostic catalog snapshots.
//!
//! Every catalog backend normalizes its products into these types. The cart
//! keeps a copy of the product and variant taken at add time, so they are
//! serialized with the same camelCase shape the cart is persisted in.

use serde::{Deserialize, Serialize};

use super::id::{ImageId, ProductId, VariantId};
use super::money::Money;

/// Title backends give the single variant of a product without options.
pub const DEFAULT_VARIANT_TITLE: &str = "Default Title";

/// Product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Image ID.
    pub id: ImageId,
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
}

/// A purchasable configuration of a product (a size or weight option).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    /// Variant ID.
    pub id: VariantId,
    /// Variant title (e.g. "500 g").
    pub title: String,
    /// Unit price.
    pub price: Money,
    /// Whether the variant can currently be bought.
    pub available_for_sale: bool,
    /// SKU code (empty when the backend has none).
    #[serde(default)]
    pub sku: String,
    /// Units in stock as reported by the backend.
    #[serde(default)]
    pub quantity_available: u32,
}

impl Variant {
    /// Whether this is the implicit variant of an option-less product.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.title == DEFAULT_VARIANT_TITLE || self.title == "Default"
    }
}

/// A product snapshot as surfaced by a catalog backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Product title.
    pub title: String,
    /// Plain text description.
    #[serde(default)]
    pub description: String,
    /// URL handle.
    pub handle: String,
    /// Product type / category.
    #[serde(default)]
    pub product_type: String,
    /// Product tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Product images.
    #[serde(default)]
    pub images: Vec<Image>,
    /// Purchasable variants.
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Product {
    /// Look up a variant by ID.
    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| &v.id == id)
    }

    /// First variant that is available for sale, falling back to the first variant.
    #[must_use]
    pub fn default_variant(&self) -> Option<&Variant> {
        self.variants
            .iter()
            .find(|v| v.available_for_sale)
            .or_else(|| self.variants.first())
    }

    /// Featured (first) image.
    #[must_use]
    pub fn featured_image(&self) -> Option<&Image> {
        self.images.first()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::CurrencyCode;

    fn variant(id: &str, available: bool) -> Variant {
        Variant {
            id: VariantId::new(id),
            title: "250 g".to_string(),
            price: Money::parse("180", CurrencyCode::INR).unwrap(),
            available_for_sale: available,
            sku: String::new(),
            quantity_available: 1,
        }
    }

    fn product(variants: Vec<Variant>) -> Product {
        Product {
            id: ProductId::new("p1"),
            title: "Kaju Katli".to_string(),
            description: String::new(),
            handle: "kaju-katli".to_string(),
            product_type: "Sweets".to_string(),
            tags: vec![],
            images: vec![],
            variants,
        }
    }

    #[test]
    fn test_default_variant_prefers_available() {
        let p = product(vec![variant("a", false), variant("b", true)]);
        assert_eq!(p.default_variant().unwrap().id.as_str(), "b");
    }

    #[test]
    fn test_default_variant_falls_back_to_first() {
        let p = product(vec![variant("a", false)]);
        assert_eq!(p.default_variant().unwrap().id.as_str(), "a");
        assert!(product(vec![]).default_variant().is_none());
    }

    #[test]
    fn test_camel_case_wire_shape() {
        let json = serde_json::to_value(variant("v1", true)).unwrap();
        assert_eq!(json["availableForSale"], serde_json::json!(true));
        assert_eq!(json["quantityAvailable"], serde_json::json!(1));
        assert_eq!(json["price"]["currencyCode"], serde_json::json!("INR"));
    }
}
