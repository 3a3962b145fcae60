//! Cart line items.

use mithadi_core::{Money, MoneyError, Product, Variant, VariantId};
use serde::{Deserialize, Serialize};

use crate::catalog::LineItemInput;

/// One variant in the cart, with the product and variant as they were when
/// the shopper added it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Variant ID; at most one line item per variant.
    pub variant_id: VariantId,
    /// Units in the cart, always at least 1.
    pub quantity: u32,
    /// Product snapshot.
    pub product: Product,
    /// Variant snapshot.
    pub variant: Variant,
}

impl CartLineItem {
    #[must_use]
    pub fn new(product: &Product, variant: &Variant, quantity: u32) -> Self {
        Self {
            variant_id: variant.id.clone(),
            quantity,
            product: product.clone(),
            variant: variant.clone(),
        }
    }

    /// Unit price times quantity.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Overflow`] if the total leaves the decimal range.
    pub fn line_total(&self) -> Result<Money, MoneyError> {
        self.variant.price.checked_mul(self.quantity)
    }

    /// The line as sent to the catalog backend.
    #[must_use]
    pub fn to_input(&self) -> LineItemInput {
        LineItemInput {
            variant_id: self.variant_id.clone(),
            quantity: self.quantity,
        }
    }
}
