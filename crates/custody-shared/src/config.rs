//! Configuration management

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SESSION_TTL_HOURS, DEFAULT_SWEEP_INTERVAL_SECS,
    MAX_SESSION_TTL_HOURS,
};
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub storage: StorageSettings,
    pub session: SessionSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    /// Accounts created at startup. Memory backend only.
    #[serde(default)]
    pub seed_accounts: Vec<SeedAccount>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SeedAccount {
    pub id: String,
    pub owner: String,
    pub balance: i64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenStrategyKind {
    /// Opaque random token, tracked server-side.
    Stateful,
    /// Self-contained signed token (JWT).
    Stateless,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    pub strategy: TokenStrategyKind,
    pub ttl_hours: i64,
    pub sweep_interval_secs: u64,
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub format: LogFormat,
    /// Daily rolling log files are written here when set.
    pub directory: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("CUSTODY")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override("app.env", env)?
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "custody-server")?
            .set_default("app.request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS)?
            .set_default("database.url", "")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.acquire_timeout_secs", 3)?
            .set_default("storage.backend", "memory")?
            .set_default("session.strategy", "stateful")?
            .set_default("session.ttl_hours", DEFAULT_SESSION_TTL_HOURS)?
            .set_default("session.sweep_interval_secs", DEFAULT_SWEEP_INTERVAL_SECS)?
            .set_default("session.jwt_secret", "")?
            .set_default("log.format", "json")
    }

    /// Rejects combinations the server cannot start with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.storage.backend == StorageBackend::Postgres && self.database.url.trim().is_empty() {
            return Err(AppError::InvalidConfig(
                "database.url is required for the postgres backend".into(),
            ));
        }
        if self.session.strategy == TokenStrategyKind::Stateless
            && self.session.jwt_secret.trim().is_empty()
        {
            return Err(AppError::InvalidConfig(
                "session.jwt_secret is required for stateless tokens".into(),
            ));
        }
        if self.session.ttl_hours <= 0 || self.session.ttl_hours > MAX_SESSION_TTL_HOURS {
            return Err(AppError::InvalidConfig(format!(
                "session.ttl_hours must be between 1 and {}",
                MAX_SESSION_TTL_HOURS
            )));
        }
        for seed in &self.storage.seed_accounts {
            if seed.id.trim().is_empty() || seed.owner.trim().is_empty() {
                return Err(AppError::InvalidConfig(
                    "storage.seed_accounts entries need an id and an owner".into(),
                ));
            }
            if seed.balance < 0 {
                return Err(AppError::InvalidConfig(format!(
                    "storage.seed_accounts balance for {} must not be negative",
                    seed.id
                )));
            }
        }
        if self.session.sweep_interval_secs == 0 {
            return Err(AppError::InvalidConfig(
                "session.sweep_interval_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}
