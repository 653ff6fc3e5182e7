//! User-related DTOs for API requests and responses.

use crate::models::User;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for registering a new user.
///
/// Content is not validated beyond the column width; registration accepts
/// any name and email.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateUserRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    #[schema(max_length = 255)]
    pub name: String,
    #[validate(length(max = 255, message = "Email must be at most 255 characters"))]
    #[schema(max_length = 255)]
    pub email: String,
}

/// Response body for user data.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}
