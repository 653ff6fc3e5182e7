//! Error handler for converting AppError to HTTP responses.
//!
//! `AppError` renders itself as a JSON `ErrorResponse`. Server-side failures
//! are logged with their source chain and answered with a generic message.
//! `global_error_handler` then normalizes every error response leaving the
//! router: non-JSON bodies produced by axum or tower-http (404 fallback, 405,
//! 408 timeout) are rewritten to the same shape, and the request ID is added.

use axum::{
    Json,
    body::Body,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::RequestId;
use crate::api::dto::ErrorResponse;
use crate::error::AppError;

/// Error bodies larger than this are passed through untouched.
const MAX_ERROR_BODY: usize = 64 * 1024;

impl IntoResponse for AppError {
    /// Converts an AppError into an HTTP response.
    ///
    /// # Status Code Mapping
    /// - BadRequest → 400 BAD_REQUEST
    /// - Validation / ValidationErrors → 400 VALIDATION_ERROR
    /// - NotFound → 404 NOT_FOUND
    /// - Database → 500 DATABASE_ERROR
    /// - Configuration → 500 CONFIGURATION_ERROR
    /// - ConnectionPool → 503 SERVICE_UNAVAILABLE
    /// - Internal → 500 INTERNAL_ERROR
    fn into_response(self) -> Response {
        let status = error_to_status_code(&self);

        let error_response = match &self {
            AppError::NotFound { entity, field, value } => {
                ErrorResponse::not_found_error(entity, field, value)
            }
            AppError::Validation { field, reason } => ErrorResponse::validation_error(field, reason),
            AppError::ValidationErrors { errors } => ErrorResponse::validation_errors(errors),
            AppError::BadRequest { message } => ErrorResponse::new("BAD_REQUEST", message),
            AppError::Database { operation, source } => {
                tracing::error!(operation = %operation, error = ?source, "Database operation failed");
                ErrorResponse::new(
                    "DATABASE_ERROR",
                    &format!("Database operation failed: {}", operation),
                )
                .with_details(json!({ "operation": operation }))
            }
            AppError::Configuration { key, source } => {
                tracing::error!(key = %key, error = ?source, "Configuration error");
                ErrorResponse::new("CONFIGURATION_ERROR", "Server configuration error")
            }
            AppError::ConnectionPool { source } => {
                tracing::error!(error = ?source, "Database connection unavailable");
                ErrorResponse::new("SERVICE_UNAVAILABLE", "Database connection unavailable")
            }
            AppError::Internal { source } => {
                tracing::error!(error = ?source, "Internal error");
                ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred")
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Maps an AppError variant to its corresponding HTTP status code.
pub fn error_to_status_code(error: &AppError) -> StatusCode {
    match error {
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::Validation { .. } => StatusCode::BAD_REQUEST,
        AppError::ValidationErrors { .. } => StatusCode::BAD_REQUEST,
        AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        AppError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::ConnectionPool { .. } => StatusCode::SERVICE_UNAVAILABLE,
        AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Maps an AppError variant to its error code string.
pub fn error_to_code(error: &AppError) -> &'static str {
    match error {
        AppError::NotFound { .. } => "NOT_FOUND",
        AppError::Validation { .. } => "VALIDATION_ERROR",
        AppError::ValidationErrors { .. } => "VALIDATION_ERROR",
        AppError::BadRequest { .. } => "BAD_REQUEST",
        AppError::Database { .. } => "DATABASE_ERROR",
        AppError::Configuration { .. } => "CONFIGURATION_ERROR",
        AppError::ConnectionPool { .. } => "SERVICE_UNAVAILABLE",
        AppError::Internal { .. } => "INTERNAL_ERROR",
    }
}

fn code_for_status(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "BAD_REQUEST",
        StatusCode::NOT_FOUND => "NOT_FOUND",
        StatusCode::METHOD_NOT_ALLOWED => "METHOD_NOT_ALLOWED",
        StatusCode::REQUEST_TIMEOUT => "REQUEST_TIMEOUT",
        StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        StatusCode::SERVICE_UNAVAILABLE => "SERVICE_UNAVAILABLE",
        s if s.is_server_error() => "INTERNAL_ERROR",
        _ => "UNKNOWN_ERROR",
    }
}

fn default_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::NOT_FOUND => "The requested resource was not found",
        StatusCode::METHOD_NOT_ALLOWED => "HTTP method not allowed for this endpoint",
        StatusCode::REQUEST_TIMEOUT => "Request timeout",
        StatusCode::SERVICE_UNAVAILABLE => "Service temporarily unavailable",
        s if s.is_server_error() => "An internal server error occurred",
        _ => "Bad request - invalid or malformed request",
    }
}

/// Global error handling middleware.
///
/// Must run inside `request_id_middleware` so the request ID extension is
/// present.
pub async fn global_error_handler(request: Request, next: Next) -> Response {
    let request_id = request.extensions().get::<RequestId>().map(|r| r.0.clone());

    let response = next.run(request).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    let (mut parts, body) = response.into_parts();
    let Ok(bytes) = axum::body::to_bytes(body, MAX_ERROR_BODY).await else {
        return (status, Json(ErrorResponse::new(code_for_status(status), default_message(status))))
            .into_response();
    };

    let mut error_response = match serde_json::from_slice::<ErrorResponse>(&bytes) {
        Ok(existing) if is_json => existing,
        _ if is_json => {
            // JSON that is not ours (e.g. a health payload); leave it alone
            return Response::from_parts(parts, Body::from(bytes));
        }
        _ => {
            let original = String::from_utf8_lossy(&bytes).trim().to_string();
            let message = if original.is_empty() || status.is_server_error() {
                default_message(status).to_string()
            } else {
                original
            };
            ErrorResponse::new(code_for_status(status), &message)
        }
    };

    if let Some(id) = request_id.as_deref() {
        if error_response.request_id.is_none() {
            error_response = error_response.with_request_id(id);
        }
    }

    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.remove(header::CONTENT_TYPE);
    let mut response = (status, Json(error_response)).into_response();
    for (name, value) in parts.headers.iter() {
        response.headers_mut().entry(name).or_insert_with(|| value.clone());
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, middleware, routing::get};
    use tower::ServiceExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_and_code_mapping() {
        let cases = [
            (AppError::not_found_by_id("product", 1), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (AppError::validation("price", "bad"), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (
                AppError::ValidationErrors { errors: vec![] },
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (
                AppError::BadRequest { message: "bad".to_string() },
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
            ),
            (
                AppError::Database {
                    operation: "insert product".to_string(),
                    source: anyhow::anyhow!("boom"),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
            ),
            (
                AppError::Configuration {
                    key: "database.url".to_string(),
                    source: anyhow::anyhow!("missing"),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
            ),
            (
                AppError::ConnectionPool { source: anyhow::anyhow!("timed out") },
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
            ),
            (
                AppError::Internal { source: anyhow::anyhow!("oops") },
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];

        for (error, status, code) in cases {
            assert_eq!(error_to_status_code(&error), status, "{:?}", error);
            assert_eq!(error_to_code(&error), code, "{:?}", error);
        }
    }

    #[tokio::test]
    async fn test_server_errors_hide_source_text() {
        let error = AppError::Database {
            operation: "list products".to_string(),
            source: anyhow::anyhow!("password authentication failed for user secret"),
        };

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["code"], "DATABASE_ERROR");
        assert!(!body.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let body = body_json(AppError::not_found_by_id("product", 9).into_response()).await;

        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["details"]["value"], "9");
    }

    fn app() -> Router {
        Router::new()
            .route("/fail", get(|| async { AppError::not_found_by_id("user", 1) }))
            .route("/plain", get(|| async { (StatusCode::BAD_REQUEST, "plain text problem") }))
            .layer(middleware::from_fn(global_error_handler))
            .layer(middleware::from_fn(super::super::request_id_middleware))
    }

    #[tokio::test]
    async fn test_global_handler_adds_request_id_to_app_errors() {
        let request = axum::http::Request::builder()
            .uri("/fail")
            .header("x-request-id", "req-123")
            .body(Body::empty())
            .unwrap();

        let body = body_json(app().oneshot(request).await.unwrap()).await;
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["request_id"], "req-123");
    }

    #[tokio::test]
    async fn test_global_handler_wraps_plain_text_errors() {
        let request = axum::http::Request::builder()
            .uri("/plain")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().contains_key("x-request-id"));

        let body = body_json(response).await;
        assert_eq!(body["code"], "BAD_REQUEST");
        assert_eq!(body["message"], "plain text problem");
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_global_handler_wraps_unknown_route() {
        let request = axum::http::Request::builder()
            .uri("/missing")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
