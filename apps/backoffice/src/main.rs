//! # Vitrine Back-Office Entry Point
//!
//! Opens the store named by the configuration and reports its state.
//! The presentation layer links the library and drives the commands.
//!
//! ```text
//! $ VITRINE_DB_PATH=/tmp/loja.db vitrine-backoffice
//! INFO Vitrine ready store="Vitrine Boutique" clients=0 products=0 register=Closed
//! ```

use std::process::ExitCode;

use tracing::{error, info, warn};
use vitrine_core::RegisterState;

use vitrine_backoffice::{init_tracing, ApiResult, AppConfig, AppState};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    info!("Starting Vitrine back-office");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Startup failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ApiResult<()> {
    let config = AppConfig::load(None)?;
    let state = AppState::open(config).await?;

    if !state.database_healthy().await {
        warn!("Database did not answer the health check");
    }

    let settings = state.store.settings().await;
    let register = state.store.register_state().await;
    if let RegisterState::Stale { opened_on, .. } = &register {
        warn!(%opened_on, "A register session from an earlier day is still open; close it first");
    }

    info!(
        store = %settings.store_name,
        clients = state.store.clients().await.len(),
        products = state.store.products().await.len(),
        sales = state.store.sales().await.len(),
        register = ?register,
        "Vitrine ready"
    );

    state.shutdown().await;
    Ok(())
}
