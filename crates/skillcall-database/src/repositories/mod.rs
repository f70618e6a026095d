//! PostgreSQL implementations of the store traits.
//!
//! One [`PgStore`] backs every trait; each table's queries live in their
//! own module.

pub mod notification;
pub mod request;
pub mod session;
pub mod user;

use async_trait::async_trait;
use sqlx::PgPool;

use skillcall_core::error::{AppError, ErrorKind};
use skillcall_core::result::AppResult;

use crate::store::CallStore;

/// PostgreSQL error code for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Store backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new store over the pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CallStore for PgStore {
    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| db_error("Health check failed", e))
    }
}

/// Map a sqlx error into the application taxonomy.
///
/// Unique violations become `Conflict`, connectivity problems become
/// `Unavailable`, everything else is a `Database` error.
pub(crate) fn db_error(context: &str, err: sqlx::Error) -> AppError {
    let kind = match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            ErrorKind::Conflict
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            ErrorKind::Unavailable
        }
        _ => ErrorKind::Database,
    };
    AppError::with_source(kind, context.to_string(), err)
}

/// Like [`db_error`] but with a caller-facing message for unique violations.
pub(crate) fn db_error_or_conflict(context: &str, conflict: &str, err: sqlx::Error) -> AppError {
    let mapped = db_error(context, err);
    if mapped.kind == ErrorKind::Conflict {
        AppError {
            message: conflict.to_string(),
            ..mapped
        }
    } else {
        mapped
    }
}
