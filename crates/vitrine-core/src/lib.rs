//! # vitrine-core: Pure Business Logic for Vitrine
//!
//! This crate is the **heart** of Vitrine, the point-of-sale and back-office
//! core of a small clothing boutique. It owns the rules that keep three
//! things consistent with each other:
//!
//! - how many pieces of each product are on the shelf, sold, or away in a
//!   client's consignment bag,
//! - how much each client owes,
//! - how much cash is physically in the drawer.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vitrine Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Presentation (web / desktop front-end)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands (apps/backoffice)             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          vitrine-store: EntityStore (lock → write → reflect)    │   │
//! │  └─────────────┬───────────────────────────────────┬───────────────┘   │
//! │                │ plan_*()                          │ Backend::apply()   │
//! │  ┌─────────────▼──────────────────┐  ┌─────────────▼───────────────┐   │
//! │  │  ★ vitrine-core (THIS CRATE) ★ │  │   vitrine-db (SQLite, mem)  │   │
//! │  │  inventory · debt · cash · sale│  └─────────────────────────────┘   │
//! │  │  books · cart · policy · report│                                    │
//! │  │  NO I/O • PURE PLANNING        │                                    │
//! │  └────────────────────────────────┘                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Client, Product, Sale, CashSession, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//! - [`inventory`] - Available-to-sell and stock/bag deltas
//! - [`debt`] - Client debt ledger
//! - [`cash`] - Cash session ledger and register state
//! - [`sale`] - Sale / bag lifecycle planning
//! - [`books`] - In-memory collections and change-set planning
//! - [`changeset`] - The unit of atomic persistence
//! - [`cart`] - Draft cart with stock admission
//! - [`policy`] - Role × action permission table
//! - [`report`] - Revenue, profit, receivables, inventory valuation
//! - [`outreach`] - WhatsApp message text and targets
//! - [`clock`] - Injectable time source and business dates
//!
//! ## Example Usage
//!
//! ```rust
//! use vitrine_core::money::Money;
//! use vitrine_core::types::InterestRate;
//!
//! let subtotal = Money::from_cents(20000); // R$ 200,00
//! let surcharge = subtotal.apply_rate(InterestRate::from_bps(500)); // 5%
//! assert_eq!(surcharge.cents(), 1000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod books;
pub mod cart;
pub mod cash;
pub mod changeset;
pub mod clock;
pub mod debt;
pub mod error;
pub mod inventory;
pub mod money;
pub mod outreach;
pub mod policy;
pub mod report;
pub mod sale;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use books::Books;
pub use cart::{Cart, CartItem};
pub use cash::{CloseReport, RegisterState, TenderBreakdown};
pub use changeset::{ChangeSet, DebtCorrection, Deletion};
pub use policy::Action;
pub use sale::{InstallmentPlan, SaleLine, SaleReceipt, SaleRequest};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single product in one cart line.
///
/// ## Business Reason
/// A boutique rarely sells more than a handful of the same piece; this
/// catches typos like 100 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest amount accepted for any single price, payment or movement:
/// R$ 1.000.000.000,00. Sums of these stay far inside `i64`.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000;

/// Maximum number of card installments the store offers.
pub const MAX_INSTALLMENTS: u32 = 12;

/// Lowest and highest client trust score.
pub const TRUST_SCORE_RANGE: (u8, u8) = (1, 5);
