//! Expense commands.

use chrono::NaiveDate;
use tracing::debug;
use vitrine_core::{Expense, NewExpense};

use crate::error::ApiResult;
use crate::state::AppState;

/// Expenses newest first, optionally limited to a date range.
pub async fn list_expenses(
    state: &AppState,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<Expense> {
    let mut expenses: Vec<Expense> = state
        .store
        .expenses()
        .await
        .into_iter()
        .filter(|e| from.map_or(true, |from| e.date >= from))
        .filter(|e| to.map_or(true, |to| e.date <= to))
        .collect();
    expenses.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.created_at.cmp(&a.created_at)));
    expenses
}

pub async fn add_expense(state: &AppState, input: NewExpense) -> ApiResult<Expense> {
    debug!(description = %input.description, amount = input.amount_cents, "add_expense command");
    Ok(state.store.add_expense(input).await?)
}

pub async fn delete_expense(state: &AppState, id: &str) -> ApiResult<()> {
    debug!(expense_id = %id, "delete_expense command");
    Ok(state.store.delete_expense(id).await?)
}
