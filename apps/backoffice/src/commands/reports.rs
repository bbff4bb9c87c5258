//! # Report Commands
//!
//! The dashboard. All of these need the `ViewReports` permission.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use vitrine_core::report::{
    BestSeller, FinancialSummary, InventoryValuation, OpenBags, Period, Receivable,
};

use crate::error::ApiResult;
use crate::state::AppState;

/// Everything the dashboard shows for a date range, in one call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub period: Period,
    pub summary: FinancialSummary,
    pub receivables: Vec<Receivable>,
    pub open_bags: OpenBags,
    pub inventory: InventoryValuation,
    pub best_sellers: Vec<BestSeller>,
}

pub async fn financial_summary(
    state: &AppState,
    from: NaiveDate,
    to: NaiveDate,
) -> ApiResult<FinancialSummary> {
    Ok(state.store.financial_summary(Period::new(from, to)).await?)
}

pub async fn receivables(state: &AppState) -> ApiResult<Vec<Receivable>> {
    Ok(state.store.receivables().await?)
}

pub async fn dashboard(state: &AppState, from: NaiveDate, to: NaiveDate) -> ApiResult<Dashboard> {
    let period = Period::new(from, to);
    Ok(Dashboard {
        period,
        summary: state.store.financial_summary(period).await?,
        receivables: state.store.receivables().await?,
        open_bags: state.store.open_bags().await?,
        inventory: state.store.inventory_valuation().await?,
        best_sellers: state.store.best_sellers(period, 5).await?,
    })
}
