//! Async database connection pool implementation.
//!
//! Uses bb8 connection pool manager with diesel_async for PostgreSQL connections.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::Pool;

use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};

/// Async connection pool type alias.
///
/// bb8::Pool internally uses Arc, so Clone is cheap (just reference count increment).
/// Structures holding AsyncDbPool can derive Clone without additional Arc wrapping.
pub type AsyncDbPool = Pool<AsyncPgConnection>;

/// Creates an async database connection pool from the database settings.
///
/// The pool is sized once here and handed to every repository by the caller;
/// nothing else opens connections during request handling.
///
/// | setting | bb8 option |
/// |---|---|
/// | `max_connections` | `max_size` |
/// | `max_idle_connections` | `min_idle` (0 disables it) |
/// | `connection_timeout` | `connection_timeout` (checkout wait) |
/// | `idle_timeout` | `idle_timeout` (0 keeps idle connections forever) |
///
/// # Errors
///
/// - `AppError::ConnectionPool` - If no connection can be established within
///   `connection_timeout`, even when `max_idle_connections` is 0
///
/// # Example
///
/// ```ignore
/// let pool = establish_async_connection_pool(&settings.database).await?;
/// let mut conn = pool.get().await?;
/// ```
pub async fn establish_async_connection_pool(config: &DatabaseConfig) -> AppResult<AsyncDbPool> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.url.clone());

    let pool = builder(config)
        .build(manager)
        .await
        .map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })?;

    // min_idle may be 0, so check one connection out before handing the pool over
    pool.get().await.map_err(|e| AppError::ConnectionPool {
        source: anyhow::Error::from(e),
    })?;

    tracing::debug!(
        max_connections = config.max_connections,
        max_idle_connections = config.max_idle_connections,
        "Database connection pool established"
    );

    Ok(pool)
}

fn builder(config: &DatabaseConfig) -> bb8::Builder<AsyncDieselConnectionManager<AsyncPgConnection>> {
    let min_idle = (config.max_idle_connections > 0)
        .then(|| config.max_idle_connections.min(config.max_connections));
    let idle_timeout = (config.idle_timeout > 0).then(|| Duration::from_secs(config.idle_timeout));

    Pool::builder()
        .max_size(config.max_connections)
        .min_idle(min_idle)
        .connection_timeout(Duration::from_secs(config.connection_timeout))
        .idle_timeout(idle_timeout)
}

/// Builds a pool without opening any connection.
///
/// Used where a pool value is required but the database is never reached,
/// such as router tests backed by in-memory repositories.
#[cfg(test)]
pub(crate) fn lazy_pool(config: &DatabaseConfig) -> AsyncDbPool {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.url.clone());
    builder(config).min_idle(None).build_unchecked(manager)
}
