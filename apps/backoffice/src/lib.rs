//! # Vitrine Back-Office Library
//!
//! The application shell around the entity store: configuration, logging,
//! shared state and one command function per screen action.
//!
//! ## Module Organization
//! ```text
//! vitrine_backoffice/
//! ├── lib.rs          ◄─── You are here (logging setup, exports)
//! ├── config.rs       ◄─── vitrine.toml + VITRINE_* overrides
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState (store, cart, config)
//! │   └── cart.rs     ◄─── Draft cart behind a Mutex
//! ├── commands/       ◄─── Screen actions, see commands/mod.rs
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing()          RUST_LOG or "info,vitrine=debug,sqlx=warn" │
//! │  2. AppConfig::load()       defaults → vitrine.toml → environment      │
//! │  3. AppState::open()        SQLite + migrations, seed settings,        │
//! │                             load every collection into the books        │
//! │  4. commands::*             called by the presentation layer            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use tracing::Level;
use tracing_subscriber::EnvFilter;

pub use config::AppConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;

/// Installs the global tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=vitrine_store=trace` - Trace the entity store only
/// - Default: INFO, DEBUG for vitrine crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,vitrine=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .init();
}
