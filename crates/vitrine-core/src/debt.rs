//! # Debt Ledger
//!
//! What each client owes.
//!
//! ```text
//!   sale created      debt += total − paid         (when positive)
//!   payment received  debt −= amount, floor 0      paid += amount
//!   bag settled       debt −= old − new, floor 0
//! ```
//!
//! ## Source of Truth
//! `Client.current_debt_cents` is a running total, but the unpaid balances
//! of the client's non-cancelled sales are authoritative. The planners in
//! [`crate::books`] apply the incremental rules and then compare the result
//! with [`outstanding_for`]; any difference is reported as a
//! [`crate::changeset::DebtCorrection`] and the derived value wins.

use crate::money::Money;
use crate::types::{Client, Sale, SaleStatus};

/// Adds the unpaid part of a new sale to the client's debt.
pub fn on_sale_created(client: &mut Client, sale: &Sale) {
    let delta = sale.total() - sale.paid();
    if delta.is_positive() {
        client.current_debt_cents += delta.cents();
    }
}

/// Applies a payment to both the client and the sale.
///
/// The caller has already refused overpayments; `paid` is still capped at
/// `total` so the sale invariant holds even if it did not.
pub fn on_payment_received(client: &mut Client, sale: &mut Sale, amount: Money) {
    client.current_debt_cents = client.current_debt().saturating_reduce(amount).cents();

    sale.paid_cents = (sale.paid_cents + amount.cents()).min(sale.total_cents);
    sale.status = SaleStatus::from_amounts(sale.paid(), sale.total());
}

/// Forgives the value of the pieces returned from a bag.
pub fn on_bag_settled(client: &mut Client, reduction: Money) {
    if reduction.is_positive() {
        client.current_debt_cents = client.current_debt().saturating_reduce(reduction).cents();
    }
}

/// Sum of unpaid balances over the client's non-cancelled sales.
pub fn outstanding_for<'a, I>(client_id: &str, sales: I) -> Money
where
    I: IntoIterator<Item = &'a Sale>,
{
    sales
        .into_iter()
        .filter(|s| s.client_id == client_id && s.counts_as_debt())
        .map(Sale::remaining)
        .sum()
}
