//! Catalog commands.
//!
//! # Usage
//!
//! ```bash
//! mithadi products
//! mithadi product motichoor-laddu
//! ```

use mithadi_core::Product;

use super::{CliError, Session};

/// List every product with its starting price.
pub async fn list(session: &Session) -> Result<(), CliError> {
    let products = session.backend.fetch_products().await?;
    tracing::info!(
        backend = session.backend.name(),
        count = products.len(),
        "Fetched products"
    );

    for product in &products {
        let price = product
            .variants
            .first()
            .map_or_else(|| "-".to_string(), |v| v.price.to_string());
        #[allow(clippy::print_stdout)]
        {
            println!("{:<32} {:<40} {price}", product.handle, product.title);
        }
    }
    Ok(())
}

/// Show one product and its variants.
pub async fn show(session: &Session, handle: &str) -> Result<(), CliError> {
    let product = session.backend.fetch_product_by_handle(handle).await?;
    print_product(&product);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_product(product: &Product) {
    println!("{} ({})", product.title, product.handle);
    if !product.product_type.is_empty() {
        println!("Type: {}", product.product_type);
    }
    if !product.tags.is_empty() {
        println!("Tags: {}", product.tags.join(", "));
    }
    if let Some(image) = product.featured_image() {
        println!("Image: {}", image.url);
    }
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }
    println!();
    for variant in &product.variants {
        let availability = if variant.available_for_sale {
            "available"
        } else {
            "sold out"
        };
        let title = if variant.is_default() {
            "-"
        } else {
            variant.title.as_str()
        };
        println!(
            "  {:<40} {title:<16} {:>12}  {availability}",
            variant.id, variant.price
        );
    }
}
