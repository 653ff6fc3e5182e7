//! User service for business logic operations.

use std::sync::Arc;

use crate::error::AppResult;
use crate::models::{NewUser, User};
use crate::repositories::UserRepository;

/// User service for handling user-related business logic.
///
/// Registration performs no content checks on name or email; both are stored
/// as given.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    /// Creates a new UserService with the given repository.
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Registers a new user.
    ///
    /// # Returns
    /// The created user with its generated id
    pub async fn register_user(&self, name: String, email: String) -> AppResult<User> {
        let user = self.repo.create(NewUser::new(name, email)).await?;
        tracing::debug!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Gets a user by their ID. `None` if no such user exists.
    pub async fn get_user(&self, id: i64) -> AppResult<Option<User>> {
        self.repo.find_by_id(id).await
    }
}
