//! Storage layer: one [`Storage`] trait, PostgreSQL and SQLite backends.
//!
//! The backend is picked once at startup from the database URL scheme;
//! everything above this crate talks to `Arc<dyn Storage>` and never
//! branches on which engine is underneath.

use std::str::FromStr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub mod models;
pub mod postgres;
pub mod sqlite;
pub mod storage;

pub use models::{Application, BlacklistEntry};
pub use postgres::PgStorage;
pub use sqlite::SqliteStorage;
pub use storage::{ResolveOutcome, Storage};

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Unsupported database URL scheme: {0}")]
    UnsupportedScheme(String),
}

/// Connect to the database named by `url` and bootstrap the schema.
///
/// `postgres://` (or `postgresql://`) selects the PostgreSQL backend,
/// `sqlite://` the SQLite one. Anything else is a startup error.
pub async fn connect(url: &str) -> Result<Arc<dyn Storage>, DbError> {
    let storage: Arc<dyn Storage> = if url.starts_with("postgres://")
        || url.starts_with("postgresql://")
    {
        let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
        tracing::info!("Connected to PostgreSQL");
        Arc::new(PgStorage::new(pool))
    } else if url.starts_with("sqlite:") {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        tracing::info!("Connected to SQLite");
        Arc::new(SqliteStorage::new(pool))
    } else {
        let scheme = url.split(':').next().unwrap_or("").to_string();
        return Err(DbError::UnsupportedScheme(scheme));
    };
    storage.bootstrap().await?;
    Ok(storage)
}
