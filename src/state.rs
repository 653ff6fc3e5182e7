//! Application state for Axum web framework.
//!
//! Contains shared services and resources that are accessible
//! across all request handlers.

use crate::db::AsyncDbPool;
use crate::repositories::Repositories;
use crate::services::Services;

/// Application state containing all shared services and resources.
///
/// This struct is designed to be used with Axum's State extractor.
/// Cloning is cheap since both Services and AsyncDbPool use Arc internally.
#[derive(Clone)]
pub struct AppState {
    /// All business logic services
    pub services: Services,
    /// Direct access to the database connection pool, used by health checks
    pub db_pool: AsyncDbPool,
}

impl AppState {
    /// Creates a new AppState from a database connection pool.
    ///
    /// Wires the Diesel repositories and the services on top of them; the
    /// pool is the only shared resource and is injected here once.
    ///
    /// # Example
    /// ```ignore
    /// let pool = establish_async_connection_pool(&settings.database).await?;
    /// let state = AppState::new(pool);
    /// ```
    pub fn new(pool: AsyncDbPool) -> Self {
        let repos = Repositories::new(pool.clone());
        Self::from_parts(repos, pool)
    }

    /// Creates an AppState over arbitrary repository implementations.
    pub fn from_parts(repos: Repositories, pool: AsyncDbPool) -> Self {
        Self {
            services: Services::new(repos),
            db_pool: pool,
        }
    }
}
