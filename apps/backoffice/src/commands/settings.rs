//! Settings screen.

use tracing::debug;
use vitrine_core::StoreSettings;

use crate::config::AppConfig;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn get_settings(state: &AppState) -> StoreSettings {
    state.store.settings().await
}

pub async fn update_settings(state: &AppState, settings: StoreSettings) -> ApiResult<StoreSettings> {
    debug!(store_name = %settings.store_name, "update_settings command");
    Ok(state.store.update_settings(settings).await?)
}

/// The startup configuration, read-only.
pub fn get_config(state: &AppState) -> AppConfig {
    state.config.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::app;
    use crate::error::ErrorCode;
    use vitrine_db::Backend;

    #[tokio::test]
    async fn test_config_seeds_settings_once() {
        let (state, backend) = app().await;
        let saved = backend.load_settings().await.unwrap().unwrap();
        assert_eq!(saved, state.config.initial_settings());

        let mut settings = get_settings(&state).await;
        settings.max_installments = 6;
        update_settings(&state, settings).await.unwrap();
        assert_eq!(get_settings(&state).await.max_installments, 6);

        let mut bad = get_settings(&state).await;
        bad.store_name = String::new();
        let err = update_settings(&state, bad).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(get_config(&state), state.config);
    }
}
