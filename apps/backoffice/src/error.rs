//! # API Error Type
//!
//! Unified error type for back-office commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Vitrine                                │
//! │                                                                         │
//! │  Command Function  Result<T, ApiError>                                  │
//! │         │                                                               │
//! │         ├── StoreError::Core(CoreError) ─────► code from the rule       │
//! │         ├── StoreError::NotAuthenticated ────► NOT_AUTHENTICATED        │
//! │         ├── StoreError::RemoteWriteFailed ───► DATABASE_ERROR           │
//! │         │        (nothing changed; the operator may retry)              │
//! │         └── DbError ─────────────────────────► DATABASE_ERROR / ...     │
//! │                                                                         │
//! │  Presentation layer receives:                                           │
//! │    { "code": "INSUFFICIENT_STOCK",                                      │
//! │      "message": "Insufficient stock for Vestido Midi: ..." }            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use vitrine_core::CoreError;
use vitrine_db::DbError;
use vitrine_store::StoreError;

use crate::config::ConfigError;

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "REGISTER_CLOSED",
///   "message": "The cash register is closed; open it before selling"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    NotAuthenticated,
    PermissionDenied,
    InsufficientStock,
    /// Closed, stale or already-open register.
    RegisterClosed,
    /// Overpayment or short cash tender.
    PaymentError,
    /// A delete refused because sale history references the record.
    InUse,
    BusinessLogic,
    DatabaseError,
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        let code = match err {
            CoreError::ClientNotFound(_)
            | CoreError::ProductNotFound(_)
            | CoreError::SaleNotFound(_)
            | CoreError::ExpenseNotFound(_) => ErrorCode::NotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::RegisterClosed
            | CoreError::StaleSessionOpen { .. }
            | CoreError::AlreadyOpen { .. }
            | CoreError::NoOpenSession => ErrorCode::RegisterClosed,
            CoreError::OverPayment { .. } | CoreError::InsufficientTender { .. } => {
                ErrorCode::PaymentError
            }
            CoreError::InUse { .. } => ErrorCode::InUse,
            CoreError::PermissionDenied { .. } => ErrorCode::PermissionDenied,
            CoreError::InvalidCredentials => ErrorCode::NotAuthenticated,
            CoreError::Validation(_)
            | CoreError::EmptyCart
            | CoreError::CartTooLarge { .. }
            | CoreError::QuantityTooLarge { .. } => ErrorCode::ValidationError,
            CoreError::InvalidSaleStatus { .. }
            | CoreError::InvalidSettlement { .. }
            | CoreError::BagNotSettled { .. } => ErrorCode::BusinessLogic,
        };
        ApiError::new(code, message)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::InvalidCredentials => {
                ApiError::new(ErrorCode::NotAuthenticated, "Invalid email or password")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::InUse, "Record is referenced by sale history")
            }
            DbError::ConnectionFailed(_) | DbError::Unavailable(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database unavailable")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!("Database operation failed: {}", other);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Core(e) => e.into(),
            StoreError::NotAuthenticated => {
                ApiError::new(ErrorCode::NotAuthenticated, "Log in to continue")
            }
            StoreError::RemoteWriteFailed(e) => {
                tracing::error!("Remote write failed: {}", e);
                ApiError::new(
                    ErrorCode::DatabaseError,
                    "The change could not be saved; nothing was changed. Try again.",
                )
            }
            StoreError::Backend(e) => e.into(),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::internal(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::Money;

    #[test]
    fn test_rule_refusals_keep_their_message() {
        let err = ApiError::from(CoreError::insufficient_stock("Vestido Midi", 8, 9));
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(err.message.contains("available 8, requested 9"));

        let err = ApiError::from(CoreError::OverPayment {
            sale_id: "s1".into(),
            remaining: Money::from_cents(100),
            attempted: Money::from_cents(200),
        });
        assert_eq!(err.code, ErrorCode::PaymentError);
    }

    #[test]
    fn test_remote_failure_hides_database_details() {
        let err = ApiError::from(StoreError::RemoteWriteFailed(DbError::Unavailable(
            "socket closed".into(),
        )));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("socket"));
    }

    #[test]
    fn test_serializes_for_the_presentation_layer() {
        let err = ApiError::from(StoreError::NotAuthenticated);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOT_AUTHENTICATED");
        assert_eq!(json["message"], "Log in to continue");
    }
}
