//! Monitoring and health check handlers.

use std::sync::Arc;
use std::time::SystemTime;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use remindd_queue::WorkQueue;
use remindd_store::Store;

use crate::state::AppState;

/// Health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Service is healthy.
    Healthy,
    /// Service is unhealthy.
    Unhealthy,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: HealthStatus,
    /// Version information.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
    /// Component health checks.
    pub components: Vec<ComponentHealth>,
}

/// Component health status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name.
    pub name: String,
    /// Component status.
    pub status: HealthStatus,
    /// Optional message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentHealth {
    fn from_probe(name: &str, failure: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            status: if failure.is_none() {
                HealthStatus::Healthy
            } else {
                HealthStatus::Unhealthy
            },
            message: failure,
        }
    }
}

/// Start time for uptime calculation.
static START_TIME: std::sync::OnceLock<SystemTime> = std::sync::OnceLock::new();

/// Initialize start time (call on server start).
pub fn init_start_time() {
    START_TIME.get_or_init(SystemTime::now);
}

fn uptime_seconds() -> u64 {
    START_TIME
        .get()
        .and_then(|start| start.elapsed().ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Detailed health check: store and queue connectivity.
///
/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let components = vec![
        ComponentHealth::from_probe("store", state.store.ping().await.err().map(|e| e.to_string())),
        ComponentHealth::from_probe("queue", state.queue.ping().await.err().map(|e| e.to_string())),
    ];

    let unhealthy = components
        .iter()
        .any(|c| c.status == HealthStatus::Unhealthy);
    let response = HealthResponse {
        status: if unhealthy {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Healthy
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime_seconds(),
        components,
    };

    let code = if unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (code, Json(response))
}

/// Liveness probe.
///
/// GET /livez
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe: ready once the store and queue answer.
///
/// GET /readyz
pub async fn readyz(State(state): State<Arc<AppState>>) -> StatusCode {
    let store_ok = state.store.ping().await.is_ok();
    let queue_ok = state.queue.ping().await.is_ok();
    if store_ok && queue_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
#[path = "monitoring_tests.rs"]
mod tests;
