//! # vitrine-db: Persistence Layer for Vitrine
//!
//! This crate makes the store's change sets durable. It uses SQLite with
//! sqlx for the real store and an in-memory backend for tests.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vitrine Data Flow                                │
//! │                                                                         │
//! │  EntityStore::create_sale()                                            │
//! │       │  plan (vitrine-core) → ChangeSet                               │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     vitrine-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Backend     │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │ (backend.rs)  │    │ client, sale  │    │  (embedded)  │  │   │
//! │  │   │               │    │ product, cash │    │              │  │   │
//! │  │   │ Database      │───►│ expense, user │    │ 001_init.sql │  │   │
//! │  │   │ MemoryBackend │    │ settings      │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (vitrine.db)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vitrine_db::{Backend, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("vitrine.db")).await?;
//! let books = db.load_all().await?.into_books();
//! db.apply(&change_set).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod backend;
pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use auth::{hash_password, verify_password};
pub use backend::{Backend, Snapshot};
pub use error::{DbError, DbResult};
pub use memory::MemoryBackend;
pub use pool::{Database, DbConfig};

pub use repository::cash::CashRepository;
pub use repository::client::ClientRepository;
pub use repository::expense::ExpenseRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::settings::SettingsRepository;
pub use repository::user::UserRepository;
