//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! `config/default`, an environment overlay, and `SKILLCALL__*` variables.
//! Each sub-module represents a logical configuration section.

pub mod app;
pub mod auth;
pub mod call;
pub mod logging;
pub mod realtime;
pub mod worker;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::auth::AuthConfig;
use self::call::{CallConfig, RoomConfig};
use self::logging::LoggingConfig;
use self::realtime::RealtimeConfig;
use self::worker::WorkerConfig;

use crate::error::AppError;

/// Database URL value that selects the in-process store.
pub const MEMORY_DATABASE_URL: &str = "memory";

/// Environment name in which development credentials are refused.
pub const PRODUCTION_ENV: &str = "production";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Access-token settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Request, session, and notification timing rules.
    #[serde(default)]
    pub call: CallConfig,
    /// Call-room token issuer settings.
    #[serde(default)]
    pub room: RoomConfig,
    /// Real-time WebSocket settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Background worker settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL, or `"memory"` for the in-process store.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

impl DatabaseConfig {
    /// Whether this configuration selects the in-process store.
    pub fn is_memory(&self) -> bool {
        self.url == MEMORY_DATABASE_URL
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: MEMORY_DATABASE_URL.to_string(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration for the named environment.
    ///
    /// Merges `config/default` with `config/{env}` and environment variables
    /// prefixed with `SKILLCALL__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SKILLCALL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        config.validate(env)?;
        Ok(config)
    }

    /// Reject development credentials when running in production.
    pub fn validate(&self, env: &str) -> Result<(), AppError> {
        if env != PRODUCTION_ENV {
            return Ok(());
        }

        let mut placeholders = Vec::new();
        if self.auth.uses_placeholder_secret() {
            placeholders.push("auth.jwt_secret");
        }
        if self.room.uses_placeholder_credentials() {
            placeholders.push("room.api_key/room.api_secret");
        }
        if placeholders.is_empty() {
            Ok(())
        } else {
            Err(AppError::configuration(format!(
                "Development placeholder values are not allowed in production: {}",
                placeholders.join(", ")
            )))
        }
    }
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}
