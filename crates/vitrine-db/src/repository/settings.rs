//! # Settings Repository
//!
//! Store settings are one JSON document under the `store` key, so adding a
//! setting never needs a migration.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::DbResult;
use vitrine_core::StoreSettings;

const STORE_KEY: &str = "store";

#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// The saved settings, or `None` on a fresh database.
    pub async fn load(&self) -> DbResult<Option<StoreSettings>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
            .bind(STORE_KEY)
            .fetch_optional(&self.pool)
            .await?;

        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub async fn save(&self, settings: &StoreSettings) -> DbResult<()> {
        let json = serde_json::to_string(settings)?;

        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(STORE_KEY)
        .bind(json)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
