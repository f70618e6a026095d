//! Opening the PostgreSQL pool behind [`PgStore`](crate::PgStore).

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::info;

use skillcall_core::config::DatabaseConfig;
use skillcall_core::error::{AppError, ErrorKind};
use skillcall_core::result::AppResult;

/// Parse `database.url`. The password never reaches the logs because only
/// the parsed host, port and database name are reported.
pub fn connect_options(url: &str) -> AppResult<PgConnectOptions> {
    PgConnectOptions::from_str(url).map_err(|e| {
        AppError::with_source(
            ErrorKind::Configuration,
            "database.url is not a valid PostgreSQL URL",
            e,
        )
    })
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
}

/// Connect the store's pool. An unreachable server is `Unavailable`.
pub async fn connect_pool(config: &DatabaseConfig) -> AppResult<PgPool> {
    let options = connect_options(&config.url)?;
    info!(
        host = options.get_host(),
        port = options.get_port(),
        database = options.get_database().unwrap_or("<default>"),
        max_connections = config.max_connections,
        "Connecting call store to PostgreSQL"
    );

    let pool = pool_options(config)
        .connect_with(options)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Unavailable,
                format!("Call store unreachable: {e}"),
                e,
            )
        })?;

    info!("Call store connected");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_parts_are_read() {
        let options = connect_options("postgres://call:secret@db:6543/skillcall").expect("parse");
        assert_eq!(options.get_host(), "db");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_database(), Some("skillcall"));
    }

    #[tokio::test]
    async fn test_bad_url_is_configuration_error() {
        let config = DatabaseConfig {
            url: "not a url".to_string(),
            ..DatabaseConfig::default()
        };
        let err = connect_pool(&config).await.expect_err("bad url");
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
