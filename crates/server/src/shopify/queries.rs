//! GraphQL documents for the Admin API.
//!
//! Queries are hand-written strings sent through the generic JSON
//! envelope in `client`. Shopify's Admin GraphQL schema is versioned;
//! these documents target the version configured at startup.

/// Fetch a page of products with their variants.
pub const GET_PRODUCTS: &str = r"
query GetProducts($first: Int!, $after: String, $query: String) {
  products(first: $first, after: $after, query: $query, sortKey: TITLE) {
    pageInfo {
      hasNextPage
      endCursor
    }
    edges {
      node {
        id
        title
        handle
        featuredImage {
          url
        }
        variants(first: 25) {
          edges {
            node {
              id
              title
              price
              availableForSale
            }
          }
        }
      }
    }
  }
}
";

/// Create a draft order carrying the bundle line items and discount.
///
/// Draft orders are used instead of checkouts because an applied
/// discount can be either percentage or fixed amount, matching the
/// bundle discount rule exactly.
pub const DRAFT_ORDER_CREATE: &str = r"
mutation DraftOrderCreate($input: DraftOrderInput!) {
  draftOrderCreate(input: $input) {
    draftOrder {
      id
      invoiceUrl
      totalPrice
    }
    userErrors {
      field
      message
    }
  }
}
";
