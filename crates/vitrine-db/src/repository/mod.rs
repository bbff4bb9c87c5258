//! # Repository Module
//!
//! Table-level database access for Vitrine.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Reads and Writes                                     │
//! │                                                                         │
//! │  Reads go through a repository handle over the pool:                   │
//! │       db.sales().get_by_id("...")                                       │
//! │                                                                         │
//! │  Entity writes are associated functions over a connection, so the      │
//! │  backend can run every write of a change set in ONE transaction:       │
//! │       let mut tx = pool.begin().await?;                                │
//! │       SaleRepository::upsert(&mut tx, &sale).await?;                   │
//! │       ProductRepository::upsert(&mut tx, &product).await?;             │
//! │       tx.commit().await?;                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`client::ClientRepository`] - Clients and their cached debt
//! - [`product::ProductRepository`] - Catalog and stock counters
//! - [`sale::SaleRepository`] - Sales, bags and line items
//! - [`expense::ExpenseRepository`] - Store expenses
//! - [`cash::CashRepository`] - Cash sessions and movements
//! - [`user::UserRepository`] - Operator logins
//! - [`settings::SettingsRepository`] - Store settings document

pub mod cash;
pub mod client;
pub mod expense;
pub mod product;
pub mod sale;
pub mod settings;
pub mod user;
