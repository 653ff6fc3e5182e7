//! Service layer for business logic operations.
//!
//! Services encapsulate business logic and coordinate between
//! repositories and handlers.

mod product_service;
mod user_service;

pub use product_service::ProductService;
pub use user_service::UserService;

use crate::repositories::Repositories;

/// Aggregates all services for convenient access.
///
/// This struct is designed to be used as Axum application state.
/// Cloning is cheap since repositories are held behind `Arc`.
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub products: ProductService,
}

impl Services {
    /// Creates a new Services instance from Repositories.
    pub fn new(repos: Repositories) -> Self {
        Self {
            users: UserService::new(repos.users),
            products: ProductService::new(repos.products),
        }
    }
}
