//! # Commands Module
//!
//! One function per screen action. Each takes the [`AppState`] and plain
//! arguments, and returns `Result<T, ApiError>` with a serializable `T`.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── auth.rs      ◄─── Login, logout, operators and roles
//! ├── clients.rs   ◄─── Client CRUD
//! ├── products.rs  ◄─── Catalog CRUD and search
//! ├── cart.rs      ◄─── Draft cart and checkout
//! ├── sales.rs     ◄─── Sales, payments, bag settlement
//! ├── cash.rs      ◄─── Register open/close and manual movements
//! ├── expenses.rs  ◄─── Expense CRUD
//! ├── reports.rs   ◄─── Dashboard figures
//! ├── outreach.rs  ◄─── WhatsApp reminder and birthday lists
//! └── settings.rs  ◄─── Store settings
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Presentation layer                                                     │
//! │    invoke('record_payment', { saleId, amountCents, method })           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  commands::sales::record_payment(&state, sale_id, amount, method)      │
//! │         │   parse + log                                                 │
//! │         ▼                                                               │
//! │  state.store.record_payment(...)   ◄── all rules live behind here      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Result<Sale, ApiError>  ──(JSON)──►  presentation layer               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`AppState`]: crate::state::AppState

pub mod auth;
pub mod cart;
pub mod cash;
pub mod clients;
pub mod expenses;
pub mod outreach;
pub mod products;
pub mod reports;
pub mod sales;
pub mod settings;
