//! User request handlers.

use axum::{Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::USER_TAG;
use crate::api::dto::{CreateUserRequest, ErrorResponse, UserResponse};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::utils::validate::{ApiPath, ValidatedJson};

/// Creates user-related routes.
pub fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_user))
        .routes(routes!(get_user))
}

/// POST /api/v1/users - Register a new user
#[utoipa::path(
    post,
    path = "/",
    tag = USER_TAG,
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    )
)]
async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state.services.users.register_user(req.name, req.email).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /api/v1/users/{id} - Get user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = USER_TAG,
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, description = "Invalid user ID", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .services
        .users
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::not_found_by_id("user", id))?;
    Ok(Json(UserResponse::from(user)))
}
