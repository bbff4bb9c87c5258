//! # Sale Commands
//!
//! History screen and the two follow-ups a sale can get: a payment against
//! what is still owed, and the settlement of a bag when it comes back.
//!
//! ```text
//! BAG (PENDING) ──settle_bag(kept)──► SALE (PENDING | PARTIAL | PAID)
//!                                        │
//!                        record_payment ─┘ until PAID
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use vitrine_core::{Money, PaymentMethod, Sale, SaleKind, SaleReceipt, SaleRequest};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// History screen filters. Everything is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleFilter {
    pub client_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<SaleKind>,
    /// Only sales with something left to pay.
    #[serde(default)]
    pub unpaid_only: bool,
}

/// Sales newest first.
pub async fn list_sales(state: &AppState, filter: SaleFilter) -> Vec<Sale> {
    let mut sales: Vec<Sale> = state
        .store
        .sales()
        .await
        .into_iter()
        .filter(|s| filter.client_id.as_ref().map_or(true, |id| &s.client_id == id))
        .filter(|s| filter.kind.map_or(true, |k| s.kind == k))
        .filter(|s| !filter.unpaid_only || s.remaining().is_positive())
        .collect();
    sales.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sales
}

pub async fn get_sale(state: &AppState, id: &str) -> ApiResult<Sale> {
    state
        .store
        .sale(id)
        .await
        .ok_or_else(|| ApiError::not_found("Sale", id))
}

/// Posts a sale built outside the cart (e.g. a repeat order).
pub async fn create_sale(state: &AppState, request: SaleRequest) -> ApiResult<SaleReceipt> {
    debug!(client_id = %request.client_id, lines = request.lines.len(), "create_sale command");
    Ok(state.store.create_sale(request).await?)
}

/// Records money received against a sale.
///
/// ## Arguments
/// * `method` - "cash", "pix", "debit" or "credit" (Portuguese names too)
pub async fn record_payment(
    state: &AppState,
    sale_id: &str,
    amount_cents: i64,
    method: &str,
) -> ApiResult<Sale> {
    debug!(sale_id = %sale_id, amount = amount_cents, method = %method, "record_payment command");
    let method: PaymentMethod = method
        .parse()
        .map_err(|e: vitrine_core::ValidationError| ApiError::validation(e.to_string()))?;
    Ok(state
        .store
        .record_payment(sale_id, Money::from_cents(amount_cents), method)
        .await?)
}

/// Settles a returned bag. `kept` maps product id to quantity kept.
pub async fn settle_bag(
    state: &AppState,
    sale_id: &str,
    kept: HashMap<String, i64>,
) -> ApiResult<Sale> {
    debug!(sale_id = %sale_id, kept = kept.len(), "settle_bag command");
    Ok(state.store.settle_bag(sale_id, &kept).await?)
}
