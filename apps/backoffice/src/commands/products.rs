//! # Product Commands
//!
//! Catalog screen: list, search, create, edit, delete.
//!
//! Every product carries its availability so the catalog can grey out
//! pieces that are all away on bags.

use serde::{Deserialize, Serialize};
use tracing::debug;
use vitrine_core::inventory::available_to_sell;
use vitrine_core::{Product, ProductInput};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// A catalog row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRow {
    #[serde(flatten)]
    pub product: Product,
    /// stock − on bags
    pub available: i64,
}

impl From<Product> for ProductRow {
    fn from(product: Product) -> Self {
        ProductRow {
            available: available_to_sell(&product),
            product,
        }
    }
}

/// Products whose name, category, color or size contains `query`.
///
/// ## Arguments
/// * `query` - Search text; empty lists everything
/// * `category` - Exact category filter
/// * `limit` - Max results (default: 50)
pub async fn search_products(
    state: &AppState,
    query: &str,
    category: Option<&str>,
    limit: Option<usize>,
) -> Vec<ProductRow> {
    let limit = limit.unwrap_or(50);
    let needle = query.trim().to_lowercase();
    debug!(query = %needle, ?category, limit, "search_products command");

    let mut products: Vec<Product> = state
        .store
        .products()
        .await
        .into_iter()
        .filter(|p| category.map_or(true, |c| p.category.eq_ignore_ascii_case(c)))
        .filter(|p| {
            needle.is_empty()
                || [&p.name, &p.category, &p.color, &p.size]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect();
    products.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.size.cmp(&b.size)));
    products.into_iter().take(limit).map(ProductRow::from).collect()
}

pub async fn get_product(state: &AppState, id: &str) -> ApiResult<ProductRow> {
    state
        .store
        .product(id)
        .await
        .map(ProductRow::from)
        .ok_or_else(|| ApiError::not_found("Product", id))
}

pub async fn add_product(state: &AppState, input: ProductInput) -> ApiResult<ProductRow> {
    debug!(name = %input.name, "add_product command");
    Ok(state.store.add_product(input).await?.into())
}

pub async fn update_product(state: &AppState, id: &str, input: ProductInput) -> ApiResult<ProductRow> {
    debug!(product_id = %id, "update_product command");
    Ok(state.store.update_product(id, input).await?.into())
}

pub async fn delete_product(state: &AppState, id: &str) -> ApiResult<()> {
    debug!(product_id = %id, "delete_product command");
    Ok(state.store.delete_product(id).await?)
}
