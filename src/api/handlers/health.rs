//! Health checks.
//!
//! All checks that touch the store go straight to the connection pool and
//! run `SELECT 1`; the repositories are not involved.

use std::time::Instant;

use axum::{Json, extract::State, http::StatusCode};
use diesel_async::RunQueryDsl;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::HEALTH_TAG;
use crate::state::AppState;

/// Full health report returned by `GET /health`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    /// Time of the check, RFC 3339 in UTC
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: String,
    pub database: DatabaseHealth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

impl HealthStatus {
    fn status_code(self) -> StatusCode {
        match self {
            HealthStatus::Up => StatusCode::OK,
            HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Outcome of the database round trip.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DatabaseHealth {
    pub status: HealthStatus,
    pub latency_ms: u64,
    /// Pool connections currently open, idle ones included
    pub connections: u32,
    pub idle_connections: u32,
    /// Fixed reason when down; the underlying error is only logged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Creates the health routes: `/health`, `/health/ready` and `/health/live`.
pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health_report))
        .routes(routes!(readiness_check))
        .routes(routes!(liveness_check))
}

/// Version, time and database reachability in one document.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Database reachable", body = HealthReport),
        (status = 503, description = "Database unreachable", body = HealthReport)
    ),
    tag = HEALTH_TAG
)]
pub async fn health_report(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let database = check_database(&state).await;
    let status = database.status;

    let report = HealthReport {
        status,
        version: crate::pkg_version().to_string(),
        timestamp: jiff::Timestamp::now().to_string(),
        database,
    };

    (status.status_code(), Json(report))
}

/// Readiness check: 200 when a pooled connection can run a query, else 503.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Ready to serve traffic"),
        (status = 503, description = "Database unreachable")
    ),
    tag = HEALTH_TAG
)]
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    check_database(&state).await.status.status_code()
}

/// Liveness check. Always 200 while the process can answer.
#[utoipa::path(
    get,
    path = "/health/live",
    responses((status = 200, description = "Process is alive")),
    tag = HEALTH_TAG
)]
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

const UNAVAILABLE: &str = "unavailable";

async fn check_database(state: &AppState) -> DatabaseHealth {
    let started = Instant::now();

    let outcome = match state.db_pool.get().await {
        Ok(mut conn) => diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| format!("query failed: {}", e)),
        Err(e) => Err(format!("connection unavailable: {}", e)),
    };

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let pool_state = state.db_pool.state();

    let (status, error) = match outcome {
        Ok(()) => (HealthStatus::Up, None),
        Err(error) => {
            tracing::warn!(error = %error, latency_ms, "Database health check failed");
            (HealthStatus::Down, Some(UNAVAILABLE.to_string()))
        }
    };

    DatabaseHealth {
        status,
        latency_ms,
        connections: pool_state.connections,
        idle_connections: pool_state.idle_connections,
        error,
    }
}
