//! Conversions from Storefront API responses into catalog types.

use mithadi_core::{
    CheckoutId, CurrencyCode, Image, ImageId, Money, Product, ProductId, Variant, VariantId,
};

use crate::catalog::RemoteCheckout;
use crate::shopify::ShopifyError;

use super::queries::{CheckoutNode, CheckoutUserError, ImageNode, MoneyV2, ProductNode, VariantNode};

/// The Storefront API does not expose inventory to public tokens.
const UNKNOWN_QUANTITY_AVAILABLE: u32 = 1;

/// Convert a price, defaulting the currency to INR when absent.
pub fn convert_money(money: &MoneyV2) -> Result<Money, ShopifyError> {
    let currency = match money.currency_code.as_deref() {
        Some(code) if !code.is_empty() => code.parse::<CurrencyCode>()?,
        _ => CurrencyCode::INR,
    };
    Ok(Money::parse(&money.amount, currency)?)
}

fn convert_image(index: usize, image: ImageNode) -> Image {
    Image {
        id: ImageId::new(image.id.unwrap_or_else(|| format!("image-{index}"))),
        url: image.url,
        alt_text: image.alt_text,
    }
}

/// A variant whose price cannot be represented is skipped so the rest of the
/// catalog still loads.
fn convert_variant(variant: VariantNode) -> Option<Variant> {
    let price = match convert_money(&variant.price) {
        Ok(price) => price,
        Err(e) => {
            tracing::warn!(variant_id = %variant.id, error = %e, "Skipping Shopify variant with unusable price");
            return None;
        }
    };

    Some(Variant {
        id: VariantId::new(variant.id),
        title: variant.title,
        price,
        available_for_sale: variant.available_for_sale.unwrap_or(false),
        sku: variant.sku.unwrap_or_default(),
        quantity_available: UNKNOWN_QUANTITY_AVAILABLE,
    })
}

/// Convert a product node.
pub fn convert_product(product: ProductNode) -> Product {
    let images = product
        .images
        .map(|c| {
            c.edges
                .into_iter()
                .enumerate()
                .map(|(i, e)| convert_image(i, e.node))
                .collect()
        })
        .unwrap_or_default();

    let variants = product
        .variants
        .map(|c| {
            c.edges
                .into_iter()
                .filter_map(|e| convert_variant(e.node))
                .collect()
        })
        .unwrap_or_default();

    Product {
        id: ProductId::new(product.id),
        title: product.title,
        description: product.description.unwrap_or_default(),
        handle: product.handle,
        product_type: product.product_type.unwrap_or_default(),
        tags: product.tags.unwrap_or_default(),
        images,
        variants,
    }
}

/// Convert a checkout node.
pub fn convert_checkout(checkout: CheckoutNode) -> Result<RemoteCheckout, ShopifyError> {
    Ok(RemoteCheckout {
        id: CheckoutId::new(checkout.id),
        web_url: checkout.web_url,
        subtotal_price: convert_money(&checkout.subtotal_price)?,
        total_price: convert_money(&checkout.total_price)?,
        total_tax: checkout.total_tax.as_ref().map(convert_money).transpose()?,
    })
}

/// Fold mutation user errors into a single error, if there are any.
pub fn user_errors(errors: Vec<CheckoutUserError>) -> Option<ShopifyError> {
    if errors.is_empty() {
        return None;
    }

    Some(ShopifyError::UserError(
        errors
            .into_iter()
            .map(|e| {
                let field = e.field.map(|f| f.join(".")).unwrap_or_default();
                match (e.code, field.is_empty()) {
                    (Some(code), false) => format!("{} ({code} on {field})", e.message),
                    (Some(code), true) => format!("{} ({code})", e.message),
                    (None, false) => format!("{} (on {field})", e.message),
                    (None, true) => e.message,
                }
            })
            .collect::<Vec<_>>()
            .join("; "),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shopify::storefront::queries::{checkout_create, get_products};

    const PRODUCTS_FIXTURE: &str = r#"{
        "products": {
            "edges": [{
                "node": {
                    "id": "gid://shopify/Product/1",
                    "title": "Kaju Katli",
                    "description": "Cashew fudge",
                    "handle": "kaju-katli",
                    "productType": "Sweets",
                    "tags": ["bestseller"],
                    "images": {"edges": [{"node": {
                        "id": "gid://shopify/ProductImage/9",
                        "url": "https://cdn.shopify.com/kaju.jpg",
                        "altText": null
                    }}]},
                    "variants": {"edges": [
                        {"node": {
                            "id": "gid://shopify/ProductVariant/11",
                            "title": "250 g",
                            "sku": null,
                            "availableForSale": true,
                            "price": {"amount": "350.0", "currencyCode": "INR"}
                        }},
                        {"node": {
                            "id": "gid://shopify/ProductVariant/12",
                            "title": "500 g",
                            "sku": "KK-500",
                            "price": {"amount": "680.0"}
                        }}
                    ]}
                }
            }]
        }
    }"#;

    #[test]
    fn test_convert_products_fixture() {
        let data: get_products::ResponseData = serde_json::from_str(PRODUCTS_FIXTURE).unwrap();
        let node = data.products.edges.into_iter().next().unwrap().node;
        let product = convert_product(node);

        assert_eq!(product.handle, "kaju-katli");
        assert_eq!(product.tags, vec!["bestseller".to_string()]);
        assert_eq!(product.images.len(), 1);
        assert_eq!(product.images[0].alt_text, None);

        let first = &product.variants[0];
        assert_eq!(first.sku, "");
        assert!(first.available_for_sale);
        assert_eq!(first.quantity_available, 1);
        assert_eq!(first.price, Money::parse("350", CurrencyCode::INR).unwrap());

        let second = &product.variants[1];
        assert!(!second.available_for_sale);
        assert_eq!(second.sku, "KK-500");
        assert_eq!(second.price.currency_code, CurrencyCode::INR);
    }

    #[test]
    fn test_convert_product_without_connections() {
        let node: ProductNode = serde_json::from_value(serde_json::json!({
            "id": "gid://shopify/Product/2",
            "title": "Gift Box",
            "handle": "gift-box"
        }))
        .unwrap();
        let product = convert_product(node);
        assert!(product.variants.is_empty());
        assert!(product.images.is_empty());
        assert_eq!(product.description, "");
    }

    #[test]
    fn test_unsupported_currency_skips_only_that_variant() {
        let node: ProductNode = serde_json::from_value(serde_json::json!({
            "id": "gid://shopify/Product/3",
            "title": "Soan Papdi",
            "handle": "soan-papdi",
            "variants": {"edges": [
                {"node": {
                    "id": "gid://shopify/ProductVariant/31",
                    "title": "Tokyo export",
                    "price": {"amount": "1200", "currencyCode": "JPY"}
                }},
                {"node": {
                    "id": "gid://shopify/ProductVariant/32",
                    "title": "250 g",
                    "availableForSale": true,
                    "price": {"amount": "180.0", "currencyCode": "INR"}
                }}
            ]}
        }))
        .unwrap();

        let product = convert_product(node);
        assert_eq!(product.variants.len(), 1);
        assert_eq!(
            product.variants[0].id.as_str(),
            "gid://shopify/ProductVariant/32"
        );
    }

    #[test]
    fn test_convert_money_rejects_bad_amount() {
        let money = MoneyV2 {
            amount: "abc".to_string(),
            currency_code: Some("INR".to_string()),
        };
        assert!(matches!(convert_money(&money), Err(ShopifyError::Money(_))));
    }

    #[test]
    fn test_convert_checkout_fixture() {
        let data: checkout_create::ResponseData = serde_json::from_value(serde_json::json!({
            "checkoutCreate": {
                "checkout": {
                    "id": "gid://shopify/Checkout/abc",
                    "webUrl": "https://mithadi.myshopify.com/checkouts/abc",
                    "subtotalPrice": {"amount": "700.0", "currencyCode": "INR"},
                    "totalPrice": {"amount": "735.0", "currencyCode": "INR"},
                    "totalTax": {"amount": "35.0", "currencyCode": "INR"}
                },
                "checkoutUserErrors": []
            }
        }))
        .unwrap();

        let payload = data.checkout_create.unwrap();
        assert!(user_errors(payload.checkout_user_errors).is_none());

        let checkout = convert_checkout(payload.checkout.unwrap()).unwrap();
        assert_eq!(checkout.id.as_str(), "gid://shopify/Checkout/abc");
        assert_eq!(
            checkout.total_price,
            Money::parse("735", CurrencyCode::INR).unwrap()
        );
        assert_eq!(
            checkout.total_tax,
            Some(Money::parse("35", CurrencyCode::INR).unwrap())
        );
    }

    #[test]
    fn test_user_errors_joined() {
        let err = user_errors(vec![
            CheckoutUserError {
                code: Some("INVALID".to_string()),
                field: Some(vec!["input".to_string(), "lineItems".to_string()]),
                message: "Variant is invalid".to_string(),
            },
            CheckoutUserError {
                code: None,
                field: None,
                message: "Quantity too high".to_string(),
            },
        ])
        .unwrap();
        assert_eq!(
            err.to_string(),
            "User error: Variant is invalid (INVALID on input.lineItems); Quantity too high"
        );
    }
}
