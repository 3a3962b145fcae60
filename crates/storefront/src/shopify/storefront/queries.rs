//! GraphQL operation definitions for the Shopify Storefront API.
//!
//! Each operation is a unit struct implementing [`GraphQLQuery`] with its
//! variables and response types in a sibling module, the same layout the
//! `graphql_client` derive produces.

use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

use crate::catalog::LineItemInput;

// =============================================================================
// Shared response types
// =============================================================================

/// Relay connection wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
}

/// Relay edge wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyV2 {
    pub amount: String,
    #[serde(default)]
    pub currency_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageNode {
    #[serde(default)]
    pub id: Option<String>,
    pub url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantNode {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub available_for_sale: Option<bool>,
    pub price: MoneyV2,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductNode {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub handle: String,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub images: Option<Connection<ImageNode>>,
    #[serde(default)]
    pub variants: Option<Connection<VariantNode>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutNode {
    pub id: String,
    pub web_url: String,
    pub subtotal_price: MoneyV2,
    pub total_price: MoneyV2,
    #[serde(default)]
    pub total_tax: Option<MoneyV2>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutUserError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

// =============================================================================
// Product queries
// =============================================================================

pub struct GetProducts;

pub mod get_products {
    use super::{Connection, Deserialize, ProductNode, Serialize};

    pub const OPERATION_NAME: &str = "GetProducts";
    pub const QUERY: &str = r"
query GetProducts($first: Int!) {
  products(first: $first) {
    edges {
      node {
        id
        title
        description
        handle
        productType
        tags
        images(first: 10) {
          edges { node { id url altText } }
        }
        variants(first: 10) {
          edges {
            node {
              id
              title
              sku
              availableForSale
              price { amount currencyCode }
            }
          }
        }
      }
    }
  }
}
";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub first: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub products: Connection<ProductNode>,
    }
}

impl GraphQLQuery for GetProducts {
    type Variables = get_products::Variables;
    type ResponseData = get_products::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: get_products::QUERY,
            operation_name: get_products::OPERATION_NAME,
        }
    }
}

pub struct GetProductByHandle;

pub mod get_product_by_handle {
    use super::{Deserialize, ProductNode, Serialize};

    pub const OPERATION_NAME: &str = "GetProductByHandle";
    pub const QUERY: &str = r"
query GetProductByHandle($handle: String!) {
  productByHandle(handle: $handle) {
    id
    title
    description
    handle
    productType
    tags
    images(first: 10) {
      edges { node { id url altText } }
    }
    variants(first: 10) {
      edges {
        node {
          id
          title
          sku
          availableForSale
          price { amount currencyCode }
        }
      }
    }
  }
}
";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub handle: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub product_by_handle: Option<ProductNode>,
    }
}

impl GraphQLQuery for GetProductByHandle {
    type Variables = get_product_by_handle::Variables;
    type ResponseData = get_product_by_handle::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: get_product_by_handle::QUERY,
            operation_name: get_product_by_handle::OPERATION_NAME,
        }
    }
}

// =============================================================================
// Checkout mutations
// =============================================================================

pub struct CheckoutCreate;

pub mod checkout_create {
    use super::{CheckoutNode, CheckoutUserError, Deserialize, LineItemInput, Serialize};

    pub const OPERATION_NAME: &str = "CheckoutCreate";
    pub const QUERY: &str = r"
mutation CheckoutCreate($input: CheckoutCreateInput!) {
  checkoutCreate(input: $input) {
    checkout {
      id
      webUrl
      subtotalPrice { amount currencyCode }
      totalPrice { amount currencyCode }
      totalTax { amount currencyCode }
    }
    checkoutUserErrors {
      code
      field
      message
    }
  }
}
";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: CheckoutCreateInput,
    }

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CheckoutCreateInput {
        pub line_items: Vec<LineItemInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub checkout_create: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub checkout: Option<CheckoutNode>,
        #[serde(default)]
        pub checkout_user_errors: Vec<CheckoutUserError>,
    }
}

impl GraphQLQuery for CheckoutCreate {
    type Variables = checkout_create::Variables;
    type ResponseData = checkout_create::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: checkout_create::QUERY,
            operation_name: checkout_create::OPERATION_NAME,
        }
    }
}

pub struct CheckoutLineItemsReplace;

pub mod checkout_line_items_replace {
    use super::{CheckoutNode, CheckoutUserError, Deserialize, LineItemInput, Serialize};

    pub const OPERATION_NAME: &str = "CheckoutLineItemsReplace";
    pub const QUERY: &str = r"
mutation CheckoutLineItemsReplace($checkoutId: ID!, $lineItems: [CheckoutLineItemInput!]!) {
  checkoutLineItemsReplace(checkoutId: $checkoutId, lineItems: $lineItems) {
    checkout {
      id
      webUrl
      subtotalPrice { amount currencyCode }
      totalPrice { amount currencyCode }
      totalTax { amount currencyCode }
    }
    userErrors {
      field
      message
    }
  }
}
";

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub checkout_id: String,
        pub line_items: Vec<LineItemInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub checkout_line_items_replace: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub checkout: Option<CheckoutNode>,
        #[serde(default)]
        pub user_errors: Vec<CheckoutUserError>,
    }
}

impl GraphQLQuery for CheckoutLineItemsReplace {
    type Variables = checkout_line_items_replace::Variables;
    type ResponseData = checkout_line_items_replace::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: checkout_line_items_replace::QUERY,
            operation_name: checkout_line_items_replace::OPERATION_NAME,
        }
    }
}
