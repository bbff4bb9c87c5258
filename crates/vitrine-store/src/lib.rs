//! # vitrine-store: The Entity Store
//!
//! Owns the in-memory books and is the only code that changes them.
//! Each action is planned by `vitrine-core`, written through a
//! [`vitrine_db::Backend`] as one transaction, and only then reflected in
//! memory. A refused write leaves the books exactly as they were.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vitrine_core::SystemClock;
//! use vitrine_db::MemoryBackend;
//! use vitrine_store::EntityStore;
//!
//! # async fn demo() -> vitrine_store::StoreResult<()> {
//! let store = EntityStore::open(Arc::new(MemoryBackend::new()), Arc::new(SystemClock)).await?;
//! store.login("dona@vitrine.local", "secret").await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::EntityStore;
