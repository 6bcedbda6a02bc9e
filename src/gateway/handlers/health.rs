//! Health check handler

use std::sync::Arc;
use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use utoipa::ToSchema;

use crate::gateway::state::AppState;
use crate::gateway::types::ApiResponse;

const DB_PING_TIMEOUT: Duration = Duration::from_secs(2);

/// Health check response data
#[derive(serde::Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: &'static str,
    /// Git revision the binary was built from
    #[schema(example = "a1b2c3d")]
    pub build: &'static str,
    #[schema(example = 1703494800000_i64)]
    pub timestamp_ms: i64,
}

/// Health check endpoint
///
/// Pings PostgreSQL when configured; the in-memory backend is always
/// healthy. Internal details are logged, not returned.
///
/// - Healthy: 200 OK
/// - Unhealthy: 503 Service Unavailable
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = ApiResponse<HealthResponse>),
        (status = 503, description = "Service unavailable")
    ),
    tag = "System"
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let healthy = match &state.pg_db {
        Some(db) => match tokio::time::timeout(DB_PING_TIMEOUT, db.health_check()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::error!("[HEALTH] PostgreSQL ping failed: {}", e);
                false
            }
            Err(_) => {
                tracing::error!("[HEALTH] PostgreSQL ping timed out");
                false
            }
        },
        None => true,
    };

    if healthy {
        (
            StatusCode::OK,
            Json(ApiResponse::success(HealthResponse {
                status: "ok",
                build: env!("GIT_HASH"),
                timestamp_ms: Utc::now().timestamp_millis(),
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                message: None,
                data: None,
                error: Some("unavailable".to_string()),
            }),
        )
    }
}
