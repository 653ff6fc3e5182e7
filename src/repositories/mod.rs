//! Repository layer for data access operations.
//!
//! Each resource has one async trait describing its persistence capabilities
//! and one Diesel implementation backed by the shared connection pool. This is
//! the only layer that talks to the database.

mod product_repo;
mod user_repo;

#[cfg(test)]
pub mod memory;

pub use product_repo::{DieselProductRepository, ProductRepository};
pub use user_repo::{DieselUserRepository, UserRepository};

use std::sync::Arc;

use crate::db::AsyncDbPool;

/// Aggregates all repositories for convenient access.
///
/// Repositories are held as trait objects so services never depend on the
/// persistence technology. Cloning only bumps reference counts.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
}

impl Repositories {
    /// Creates a new Repositories instance with all Diesel repositories
    /// sharing the given pool.
    ///
    /// # Arguments
    /// * `pool` - The async database connection pool
    pub fn new(pool: AsyncDbPool) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            products: Arc::new(DieselProductRepository::new(pool)),
        }
    }

    /// Builds the aggregate from arbitrary implementations.
    pub fn from_parts(users: Arc<dyn UserRepository>, products: Arc<dyn ProductRepository>) -> Self {
        Self { users, products }
    }
}
