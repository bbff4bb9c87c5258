//! # Error Types
//!
//! Domain-specific error types for vitrine-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vitrine-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule refusals                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vitrine-db errors (separate crate)                                    │
//! │  └── DbError          - Persistence failures                           │
//! │                                                                         │
//! │  vitrine-store errors                                                  │
//! │  └── StoreError       - CoreError | RemoteWriteFailed(DbError)         │
//! │                                                                         │
//! │  backoffice app                                                        │
//! │  └── ApiError         - What the presentation layer sees (serialized)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Every refusal is a typed variant, never a String
//! 2. Include context in messages (product, sale id, amounts)
//! 3. No error here is fatal: each one refuses a single operation and
//!    leaves prior state intact

use chrono::NaiveDate;
use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    #[error("Expense not found: {0}")]
    ExpenseNotFound(String),

    /// Requested cart quantity exceeds available-to-sell.
    ///
    /// ## User Workflow
    /// ```text
    /// Add "Vestido Midi" (qty: 9)
    ///      │
    ///      ▼
    /// stock 10, on bags 2 → available 8
    ///      │
    ///      ▼
    /// InsufficientStock { available: 8, requested: 9 }
    ///      │
    ///      ▼
    /// UI shows: "Only 8 Vestido Midi available"
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// A sale or movement needs an OPEN cash session and there is none.
    #[error("The cash register is closed; open it before selling")]
    RegisterClosed,

    /// An OPEN session from a previous day blocks new sales and openings.
    #[error("Cash session {session_id} from {opened_on} is still open; close it first")]
    StaleSessionOpen {
        session_id: String,
        opened_on: NaiveDate,
    },

    #[error("A cash session is already open: {session_id}")]
    AlreadyOpen { session_id: String },

    #[error("There is no open cash session")]
    NoOpenSession,

    /// A payment would exceed what is left on the sale.
    #[error("Payment of {attempted} exceeds remaining balance {remaining} on sale {sale_id}")]
    OverPayment {
        sale_id: String,
        remaining: Money,
        attempted: Money,
    },

    /// A payment would clear a bag whose pieces are still out with the
    /// client. The bag has to be settled first.
    #[error("Bag {sale_id} must be settled before its last {remaining} is paid")]
    BagNotSettled { sale_id: String, remaining: Money },

    /// Cash handed over does not cover the sale.
    #[error("Tendered {tendered} does not cover total {total}")]
    InsufficientTender { total: Money, tendered: Money },

    /// Sale is not in a state that allows the requested operation.
    #[error("Sale {sale_id} is {current_status}, cannot perform operation")]
    InvalidSaleStatus {
        sale_id: String,
        current_status: String,
    },

    /// Bag settlement input does not match the bag.
    #[error("Invalid bag settlement: {reason}")]
    InvalidSettlement { reason: String },

    /// Delete refused because sale history references the record.
    #[error("{entity} {id} is referenced by {references} sale(s) and cannot be deleted")]
    InUse {
        entity: String,
        id: String,
        references: usize,
    },

    #[error("Permission denied: {role} cannot {action}")]
    PermissionDenied { role: String, action: String },

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InsufficientStock error.
    pub fn insufficient_stock(product: impl Into<String>, available: i64, requested: i64) -> Self {
        CoreError::InsufficientStock {
            product: product.into(),
            available,
            requested,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
