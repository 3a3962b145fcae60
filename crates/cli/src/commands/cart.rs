//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! mithadi cart add kaju-katli --variant 7_21 --quantity 2
//! mithadi cart update 7_21 5
//! mithadi cart remove 7_21
//! mithadi cart show
//! mithadi cart clear
//! ```
//!
//! Mutations are saved locally first. The remote checkout is brought up to
//! date before the command exits.

use mithadi_core::{Product, Variant, VariantId};

use super::{CliError, Session};

/// Print line items, totals and the mirrored checkout.
pub fn show(session: &Session) -> Result<(), CliError> {
    let cart = &session.cart;
    let items = cart.items();

    #[allow(clippy::print_stdout)]
    {
        if items.is_empty() {
            println!("{}", mithadi_storefront::notice::CART_EMPTY);
            return Ok(());
        }

        for item in &items {
            println!(
                "{:>4} x {} ({})  {}  [{}]",
                item.quantity,
                item.product.title,
                item.variant.title,
                item.line_total()?,
                item.variant_id
            );
        }
        println!();
        println!("Items:    {}", cart.cart_count());
        if let Some(subtotal) = cart.subtotal()? {
            println!("Subtotal: {subtotal}");
        }
        if let Some(checkout) = cart.checkout() {
            println!("Checkout: {} ({})", checkout.id, checkout.web_url);
            if !checkout.total_price.is_zero() {
                println!("Total:    {}", checkout.total_price);
            }
        }
    }
    Ok(())
}

/// Add a product, picking `variant` or the first variant for sale.
pub async fn add(
    session: &Session,
    handle: &str,
    variant: Option<&str>,
    quantity: u32,
) -> Result<(), CliError> {
    let product = session.backend.fetch_product_by_handle(handle).await?;
    let chosen = pick_variant(&product, variant).ok_or_else(|| CliError::UnknownVariant {
        handle: handle.to_string(),
        variant: variant.unwrap_or("(any)").to_string(),
    })?;

    session.cart.add_to_cart(&product, chosen, quantity);
    session.reconcile().await;
    Ok(())
}

/// Set the quantity of a line; zero removes it.
pub async fn update(session: &Session, variant_id: &str, quantity: u32) {
    let variant_id = VariantId::new(variant_id);
    if !in_cart(session, &variant_id) {
        tracing::warn!(%variant_id, "Variant is not in the cart");
        return;
    }
    session.cart.update_quantity(&variant_id, quantity);
    session.reconcile().await;
}

/// Remove a line.
pub async fn remove(session: &Session, variant_id: &str) {
    let variant_id = VariantId::new(variant_id);
    if !in_cart(session, &variant_id) {
        tracing::warn!(%variant_id, "Variant is not in the cart");
        return;
    }
    session.cart.remove_from_cart(&variant_id);
    session.reconcile().await;
}

/// Empty the cart. Makes no remote call.
pub fn clear(session: &Session) {
    session.cart.clear_cart();
    tracing::info!("Cart cleared");
}

fn in_cart(session: &Session, variant_id: &VariantId) -> bool {
    session
        .cart
        .items()
        .iter()
        .any(|item| &item.variant_id == variant_id)
}

fn pick_variant<'a>(product: &'a Product, variant: Option<&str>) -> Option<&'a Variant> {
    match variant {
        Some(id) => product.variant(&VariantId::new(id)),
        None => product.default_variant(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mithadi_core::{CurrencyCode, Money, ProductId};

    use super::*;

    fn variant(id: &str, available: bool) -> Variant {
        Variant {
            id: VariantId::new(id),
            title: id.to_string(),
            price: Money::parse("120", CurrencyCode::INR).unwrap(),
            available_for_sale: available,
            sku: String::new(),
            quantity_available: 1,
        }
    }

    fn peda(variants: Vec<Variant>) -> Product {
        Product {
            id: ProductId::new("1"),
            title: "Peda".to_string(),
            description: String::new(),
            handle: "peda".to_string(),
            product_type: String::new(),
            tags: vec![],
            images: vec![],
            variants,
        }
    }

    #[test]
    fn test_pick_variant_defaults_to_available() {
        let product = peda(vec![variant("sold-out", false), variant("fresh", true)]);
        assert_eq!(pick_variant(&product, None).unwrap().id.as_str(), "fresh");
    }

    #[test]
    fn test_pick_variant_by_id() {
        let product = peda(vec![variant("a", true), variant("b", true)]);
        assert_eq!(pick_variant(&product, Some("b")).unwrap().id.as_str(), "b");
        assert!(pick_variant(&product, Some("c")).is_none());
    }
}
