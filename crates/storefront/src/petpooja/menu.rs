//! `PetPooja` menu payloads and their normalization into catalog products.
//!
//! The menu API is loosely typed: flags are the strings `"true"`/`"false"`,
//! prices are strings and most fields may be missing or empty.

use mithadi_core::{CurrencyCode, Image, ImageId, Money, Product, ProductId, Variant, VariantId};
use serde::{Deserialize, Serialize};

/// `PetPooja` does not report inventory.
const UNTRACKED_QUANTITY: u32 = 999;
const DEFAULT_PRODUCT_TYPE: &str = "Food";
const DEFAULT_VARIANT_TITLE: &str = "Default";

/// Body of `POST /menu/fetch_menu`.
#[derive(Debug, Serialize)]
pub struct FetchMenuRequest<'a> {
    pub access_token: &'a str,
    pub app_secret: &'a str,
    pub app_key: &'a str,
}

/// Response of `POST /menu/fetch_menu`.
#[derive(Debug, Default, Deserialize)]
pub struct MenuResponse {
    #[serde(default)]
    pub success: serde_json::Value,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub restaurants: Option<Vec<Restaurant>>,
}

impl MenuResponse {
    /// Whether the API reported success (`true`, `1` or `"1"`).
    #[must_use]
    pub fn is_success(&self) -> bool {
        match &self.success {
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
            serde_json::Value::String(s) => !s.is_empty() && s != "0" && s != "false",
            _ => false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Restaurant {
    #[serde(default)]
    pub categories: Option<Vec<Category>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub categoryname: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<MenuItem>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MenuItem {
    #[serde(default)]
    pub itemid: String,
    #[serde(default)]
    pub itemname: Option<String>,
    #[serde(default)]
    pub itemdescription: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub active: Option<String>,
    #[serde(default)]
    pub item_image_url: Option<String>,
    #[serde(default)]
    pub item_tags: Option<Vec<String>>,
    #[serde(default)]
    pub cuisine: Option<Vec<String>>,
    #[serde(default)]
    pub variation: Option<Vec<Variation>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Variation {
    #[serde(default)]
    pub variationid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Turn a menu into catalog products, keeping only active items.
#[must_use]
pub fn normalize_menu(menu: MenuResponse) -> Vec<Product> {
    let Some(restaurants) = menu.restaurants else {
        tracing::warn!("PetPooja menu has no restaurants");
        return Vec::new();
    };

    restaurants
        .into_iter()
        .flat_map(|r| r.categories.unwrap_or_default())
        .flat_map(|category| {
            let category_name = non_empty(category.categoryname);
            category
                .items
                .unwrap_or_default()
                .into_iter()
                .filter(|item| item.active.as_deref() == Some("true"))
                .map(move |item| normalize_item(item, category_name.as_deref()))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn normalize_item(item: MenuItem, category: Option<&str>) -> Product {
    let item_price = non_empty(item.price.clone());
    let name = non_empty(item.itemname.clone());

    let variants = match item.variation {
        Some(variations) => variations
            .into_iter()
            .filter(|v| v.status.as_deref() == Some("true"))
            .filter_map(|v| {
                let amount = non_empty(v.price)
                    .or_else(|| item_price.clone())
                    .unwrap_or_else(|| "0".to_string());
                let variant_id = format!("{}_{}", item.itemid, v.variationid);
                let price = parse_price(&variant_id, &amount)?;
                Some(Variant {
                    id: VariantId::new(variant_id),
                    title: non_empty(v.name).unwrap_or_else(|| DEFAULT_VARIANT_TITLE.to_string()),
                    price,
                    available_for_sale: true,
                    sku: item.itemid.clone(),
                    quantity_available: UNTRACKED_QUANTITY,
                })
            })
            .collect(),
        None => {
            let amount = item_price.unwrap_or_else(|| "0".to_string());
            parse_price(&item.itemid, &amount)
                .map(|price| Variant {
                    id: VariantId::new(item.itemid.clone()),
                    title: DEFAULT_VARIANT_TITLE.to_string(),
                    price,
                    available_for_sale: true,
                    sku: item.itemid.clone(),
                    quantity_available: UNTRACKED_QUANTITY,
                })
                .into_iter()
                .collect()
        }
    };

    let category = category.unwrap_or(DEFAULT_PRODUCT_TYPE);

    let tags = item
        .item_tags
        .unwrap_or_default()
        .into_iter()
        .chain(item.cuisine.unwrap_or_default())
        .chain(std::iter::once(category.to_string()))
        .filter(|t| !t.is_empty())
        .collect();

    let images = non_empty(item.item_image_url)
        .map(|url| Image {
            id: ImageId::new(format!("{}_image", item.itemid)),
            url,
            alt_text: name.clone(),
        })
        .into_iter()
        .collect();

    Product {
        id: ProductId::new(item.itemid),
        title: name.clone().unwrap_or_else(|| "Untitled Item".to_string()),
        description: item.itemdescription.unwrap_or_default(),
        handle: slugify(name.as_deref().unwrap_or("item")),
        product_type: category.to_string(),
        tags,
        images,
        variants,
    }
}

fn parse_price(variant_id: &str, amount: &str) -> Option<Money> {
    match Money::parse(amount, CurrencyCode::INR) {
        Ok(price) => Some(price),
        Err(e) => {
            tracing::warn!(variant_id, error = %e, "Skipping PetPooja variant with invalid price");
            None
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// URL handle for a menu item name.
///
/// Lowercases, replaces every character outside `[a-z0-9]` with `-` and
/// collapses runs of `-`. Leading and trailing dashes are kept.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() {
            c
        } else {
            '-'
        };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }
    slug
}
