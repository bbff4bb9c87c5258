//! # Application Configuration
//!
//! Settings read once at startup.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     VITRINE_STORE_NAME="Ateliê Marta"                                  │
//! │     VITRINE_DB_PATH=/srv/vitrine/vitrine.db                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/vitrine/vitrine.toml (Linux)                             │
//! │     ~/Library/Application Support/br.vitrine.Vitrine/vitrine.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! name = "Ateliê Marta"
//! utc_offset_minutes = -180
//!
//! [database]
//! path = "/srv/vitrine/vitrine.db"
//! max_connections = 5
//! connect_timeout_secs = 30
//!
//! [sales]
//! installment_interest_bps = 500   # 5% above the interest-free count
//! interest_free_installments = 1
//! max_installments = 12
//!
//! [outreach]
//! debt_reminder_template = "Olá {name}! Seu saldo é {debt}."
//! birthday_template = "Feliz aniversário, {name}!"
//! ```
//!
//! The `[store]`, `[sales]` and `[outreach]` sections only seed the store
//! settings the first time a database is opened. After that the settings
//! screen owns them.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use vitrine_core::types::InterestRate;
use vitrine_core::validation::validate_settings;
use vitrine_core::StoreSettings;
use vitrine_db::DbConfig;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine the application data directory")]
    NoDataDir,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub name: String,
    /// Offset from UTC used to decide the business day.
    pub utc_offset_minutes: i32,
}

impl Default for StoreSection {
    fn default() -> Self {
        let defaults = StoreSettings::default();
        StoreSection {
            name: defaults.store_name,
            utc_offset_minutes: defaults.utc_offset_minutes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// SQLite file. Defaults to the platform data directory.
    pub path: Option<PathBuf>,
    pub max_connections: u32,
    /// Seconds to wait for a free pooled connection.
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        DatabaseSection {
            path: None,
            max_connections: 5,
            connect_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesSection {
    pub installment_interest_bps: u32,
    pub interest_free_installments: u32,
    pub max_installments: u32,
}

impl Default for SalesSection {
    fn default() -> Self {
        let defaults = StoreSettings::default();
        SalesSection {
            installment_interest_bps: defaults.installment_interest.bps(),
            interest_free_installments: defaults.interest_free_installments,
            max_installments: defaults.max_installments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutreachSection {
    pub debt_reminder_template: String,
    pub birthday_template: String,
}

impl Default for OutreachSection {
    fn default() -> Self {
        let defaults = StoreSettings::default();
        OutreachSection {
            debt_reminder_template: defaults.debt_reminder_template,
            birthday_template: defaults.birthday_template,
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub sales: SalesSection,
    #[serde(default)]
    pub outreach: OutreachSection,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (vitrine.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Rejects values the store would refuse later anyway.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }
        if self.database.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "database.connect_timeout_secs must be greater than 0".into(),
            ));
        }
        validate_settings(&self.initial_settings())
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `VITRINE_*` overrides read through `var`.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(name) = var("VITRINE_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(offset) = var("VITRINE_UTC_OFFSET_MINUTES") {
            match offset.parse::<i32>() {
                Ok(minutes) => self.store.utc_offset_minutes = minutes,
                Err(_) => warn!(value = %offset, "Ignoring VITRINE_UTC_OFFSET_MINUTES"),
            }
        }

        if let Some(path) = var("VITRINE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(max) = var("VITRINE_DB_MAX_CONNECTIONS") {
            if let Ok(max) = max.parse::<u32>() {
                self.database.max_connections = max;
            }
        }

        if let Some(bps) = var("VITRINE_INSTALLMENT_INTEREST_BPS") {
            match bps.parse::<u32>() {
                Ok(bps) => self.sales.installment_interest_bps = bps,
                Err(_) => warn!(value = %bps, "Ignoring VITRINE_INSTALLMENT_INTEREST_BPS"),
            }
        }

        if let Some(max) = var("VITRINE_MAX_INSTALLMENTS") {
            if let Ok(max) = max.parse::<u32>() {
                self.sales.max_installments = max;
            }
        }
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("br", "vitrine", "Vitrine")
    }

    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("vitrine.toml"))
    }

    /// The SQLite file to open, creating the data directory if needed.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }

        let dirs = Self::project_dirs().ok_or(ConfigError::NoDataDir)?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        Ok(data_dir.join("vitrine.db"))
    }

    pub fn db_config(&self) -> ConfigResult<DbConfig> {
        Ok(DbConfig::new(self.database_path()?)
            .max_connections(self.database.max_connections)
            .connect_timeout(Duration::from_secs(self.database.connect_timeout_secs)))
    }

    /// Store settings used when the database has none saved yet.
    pub fn initial_settings(&self) -> StoreSettings {
        StoreSettings {
            store_name: self.store.name.clone(),
            installment_interest: InterestRate::from_bps(self.sales.installment_interest_bps),
            interest_free_installments: self.sales.interest_free_installments,
            max_installments: self.sales.max_installments,
            utc_offset_minutes: self.store.utc_offset_minutes,
            debt_reminder_template: self.outreach.debt_reminder_template.clone(),
            birthday_template: self.outreach.birthday_template.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_matches_store_defaults() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.initial_settings(), StoreSettings::default());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [store]
            name = "Ateliê Marta"

            [sales]
            max_installments = 6
            "#,
        )
        .unwrap();

        assert_eq!(config.store.name, "Ateliê Marta");
        assert_eq!(config.store.utc_offset_minutes, -180);
        assert_eq!(config.sales.max_installments, 6);
        assert_eq!(config.sales.installment_interest_bps, 500);
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_env_overrides_win_over_file() {
        let mut config = AppConfig::from_toml("[store]\nname = \"Arquivo\"\n").unwrap();
        let env: HashMap<&str, &str> = HashMap::from([
            ("VITRINE_STORE_NAME", "Ambiente"),
            ("VITRINE_DB_PATH", "/tmp/vitrine-test.db"),
            ("VITRINE_UTC_OFFSET_MINUTES", "not-a-number"),
        ]);
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.store.name, "Ambiente");
        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/vitrine-test.db")));
        // unparsable values are ignored
        assert_eq!(config.store.utc_offset_minutes, -180);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.database.connect_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.sales.interest_free_installments = config.sales.max_installments + 1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_explicit_database_path_is_used() {
        let mut config = AppConfig::default();
        config.database.path = Some(PathBuf::from("/tmp/loja.db"));
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/loja.db"));

        config.database.connect_timeout_secs = 4;
        let db_config = config.db_config().unwrap();
        assert_eq!(db_config.database_path, PathBuf::from("/tmp/loja.db"));
        assert_eq!(db_config.connect_timeout, Duration::from_secs(4));
        assert_eq!(db_config.max_connections, 5);
    }
}
