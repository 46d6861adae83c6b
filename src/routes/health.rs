//! Health check endpoints for load balancers and monitoring.

use axum::{Json, extract::State, response::IntoResponse};
use http::StatusCode;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// "ok" or "unhealthy"
    pub status: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<ComponentStatus>,
}

#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub latency_ms: u64,
}

/// Report service and database health. Returns 503 when the database is
/// configured but unreachable.
#[tracing::instrument(name = "health.check", skip(state))]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match &state.db {
        Some(db) => {
            let start = std::time::Instant::now();
            let result = db.health_check().await;
            let latency_ms = start.elapsed().as_millis() as u64;
            if let Err(e) = &result {
                tracing::warn!(error = %e, "Database health check failed");
            }
            Some(ComponentStatus {
                healthy: result.is_ok(),
                message: result
                    .err()
                    .map(|_| "Database connection failed".to_string()),
                latency_ms,
            })
        }
        None => None,
    };

    let healthy = database.as_ref().is_none_or(|d| d.healthy);
    let health = HealthStatus {
        status: if healthy { "ok" } else { "unhealthy" },
        version: env!("CARGO_PKG_VERSION"),
        database,
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(health))
}

/// Liveness probe; succeeds while the process is serving requests.
#[tracing::instrument(name = "health.liveness")]
pub async fn liveness() -> impl IntoResponse {
    StatusCode::OK
}
