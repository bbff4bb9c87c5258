//! # State Module
//!
//! Everything a command may touch, built once at startup.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              AppState                                   │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────────┐  │
//! │  │ Arc<EntityStore> │  │    CartState     │  │      AppConfig       │  │
//! │  │                  │  │                  │  │                      │  │
//! │  │  books, backend, │  │  Arc<Mutex<      │  │  read-only after     │  │
//! │  │  acting operator │  │    Cart>>        │  │  startup             │  │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • EntityStore: its own Mutex serializes every action                  │
//! │  • CartState: Arc<Mutex<T>> for exclusive access                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;

use std::sync::Arc;

use tracing::{info, warn};
use vitrine_core::{Clock, SystemClock};
use vitrine_db::{Backend, Database};
use vitrine_store::EntityStore;

use crate::config::AppConfig;
use crate::error::ApiResult;

pub use cart::CartState;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EntityStore>,
    pub cart: CartState,
    pub config: AppConfig,
    /// The SQLite handle when opened from a file; `None` over other backends.
    database: Option<Database>,
}

impl AppState {
    /// Opens the SQLite database named by the config and loads the store.
    pub async fn open(config: AppConfig) -> ApiResult<Self> {
        let db_config = config.db_config()?;
        info!(path = ?db_config.database_path, "Opening database");
        let db = Database::new(db_config).await?;
        let mut state =
            Self::with_backend(config, Arc::new(db.clone()), Arc::new(SystemClock)).await?;
        state.database = Some(db);
        Ok(state)
    }

    /// Loads the store from any backend.
    ///
    /// A backend without saved settings is seeded with the config's.
    pub async fn with_backend(
        config: AppConfig,
        backend: Arc<dyn Backend>,
        clock: Arc<dyn Clock>,
    ) -> ApiResult<Self> {
        if backend.load_settings().await?.is_none() {
            info!("No saved store settings, seeding them from config");
            backend.save_settings(&config.initial_settings()).await?;
        }

        let store = EntityStore::open(backend, clock).await?;
        Ok(AppState {
            store: Arc::new(store),
            cart: CartState::new(),
            config,
            database: None,
        })
    }

    /// Whether the database answers. Always true without one.
    pub async fn database_healthy(&self) -> bool {
        match &self.database {
            Some(db) => db.health_check().await,
            None => true,
        }
    }

    /// Closes the database pool before the process exits.
    pub async fn shutdown(&self) {
        if let Some(db) = &self.database {
            db.close().await;
        } else {
            warn!("Shutdown requested on a state without a database");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_open_and_shut_down_sqlite_store() {
        let mut config = AppConfig::default();
        config.database.path = Some(PathBuf::from(":memory:"));
        // each connection to :memory: is its own database
        config.database.max_connections = 1;

        let state = AppState::open(config).await.unwrap();
        assert!(state.database_healthy().await);
        assert_eq!(state.store.settings().await, state.config.initial_settings());

        state.shutdown().await;
        assert!(!state.database_healthy().await);
    }
}
