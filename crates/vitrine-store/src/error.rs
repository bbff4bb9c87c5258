//! # Store Error Types
//!
//! ```text
//! CoreError   a rule refused the action          (nothing written)
//! RemoteWriteFailed   the backend refused the change set (nothing reflected)
//! Backend     a read or login call failed
//! ```

use thiserror::Error;
use vitrine_core::CoreError;
use vitrine_db::DbError;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Refused by a business rule, validation or permission check.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// No operator is logged in.
    #[error("Not logged in")]
    NotAuthenticated,

    /// The backend rejected the change set. The books were left untouched.
    #[error("Remote write failed: {0}")]
    RemoteWriteFailed(#[source] DbError),

    /// A backend read, login or user-management call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] DbError),
}

impl StoreError {
    /// The core error behind this one, if any.
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            StoreError::Core(e) => Some(e),
            _ => None,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
