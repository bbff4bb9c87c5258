//! # Change Sets
//!
//! The unit of atomic persistence.
//!
//! A planner in [`crate::books`] never mutates the live collections. It
//! returns a `ChangeSet` holding the full new state of every record the
//! transaction touches:
//!
//! ```text
//!   create_sale(BAG, 3 × Vestido)
//!   ┌──────────────────────────────────────────────┐
//!   │ sales:    [Sale{BAG, PENDING, items…}]       │  insert
//!   │ products: [Vestido{on_bag: +3}]              │  upsert
//!   │ clients:  [Ana{debt: +R$ 150}]               │  upsert
//!   │ sessions: []                                 │  (nothing paid)
//!   └──────────────────────────────────────────────┘
//!            │ Backend::apply (one SQL transaction)
//!            ▼
//!       ok? ──► Books::apply (reflect in memory)
//! ```
//!
//! Records are full snapshots, so applying the same change set twice yields
//! the same state. Sessions carry their complete movement list; backends
//! insert movements they have not seen yet and never rewrite old ones.

use serde::{Deserialize, Serialize};

use crate::types::{CashSession, Client, Expense, Product, Sale};

/// A record removed by a change set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id")]
pub enum Deletion {
    Client(String),
    Product(String),
    Expense(String),
}

/// A cached client debt that disagreed with the sale history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtCorrection {
    pub client_id: String,
    /// What the running total said.
    pub cached_cents: i64,
    /// What the unpaid sale balances add up to (the value kept).
    pub derived_cents: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub clients: Vec<Client>,
    pub products: Vec<Product>,
    pub sales: Vec<Sale>,
    pub expenses: Vec<Expense>,
    pub sessions: Vec<CashSession>,
    pub deletions: Vec<Deletion>,
    /// Not persisted as such; carried so the caller can log drift.
    pub debt_corrections: Vec<DebtCorrection>,
}

impl ChangeSet {
    pub fn new() -> Self {
        ChangeSet::default()
    }

    /// Upserts a client, replacing an earlier entry for the same id.
    pub fn put_client(&mut self, client: Client) {
        replace_or_push(&mut self.clients, client, |c| c.id.clone());
    }

    pub fn put_product(&mut self, product: Product) {
        replace_or_push(&mut self.products, product, |p| p.id.clone());
    }

    pub fn put_sale(&mut self, sale: Sale) {
        replace_or_push(&mut self.sales, sale, |s| s.id.clone());
    }

    pub fn put_expense(&mut self, expense: Expense) {
        replace_or_push(&mut self.expenses, expense, |e| e.id.clone());
    }

    pub fn put_session(&mut self, session: CashSession) {
        replace_or_push(&mut self.sessions, session, |s| s.id.clone());
    }

    pub fn delete(&mut self, deletion: Deletion) {
        if !self.deletions.contains(&deletion) {
            self.deletions.push(deletion);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
            && self.products.is_empty()
            && self.sales.is_empty()
            && self.expenses.is_empty()
            && self.sessions.is_empty()
            && self.deletions.is_empty()
    }

    /// Short description for logs: `clients=1 products=2 sales=1 ...`.
    pub fn summary(&self) -> String {
        format!(
            "clients={} products={} sales={} expenses={} sessions={} deletions={}",
            self.clients.len(),
            self.products.len(),
            self.sales.len(),
            self.expenses.len(),
            self.sessions.len(),
            self.deletions.len()
        )
    }
}

fn replace_or_push<T, F>(items: &mut Vec<T>, item: T, key: F)
where
    F: Fn(&T) -> String,
{
    let id = key(&item);
    match items.iter_mut().find(|existing| key(existing) == id) {
        Some(slot) => *slot = item,
        None => items.push(item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debt::tests::client;

    #[test]
    fn test_put_replaces_same_id() {
        let mut cs = ChangeSet::new();
        cs.put_client(client(100));
        cs.put_client(client(300));
        assert_eq!(cs.clients.len(), 1);
        assert_eq!(cs.clients[0].current_debt_cents, 300);
    }

    #[test]
    fn test_empty_and_summary() {
        let mut cs = ChangeSet::new();
        assert!(cs.is_empty());
        cs.delete(Deletion::Expense("e-1".to_string()));
        cs.delete(Deletion::Expense("e-1".to_string()));
        assert!(!cs.is_empty());
        assert_eq!(cs.deletions.len(), 1);
        assert!(cs.summary().ends_with("deletions=1"));
    }
}
