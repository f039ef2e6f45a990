//! Tests for monitoring handlers.

use super::*;
use axum::response::IntoResponse;
use remindd_config::{QueueSettings, SchedulerSettings};
use remindd_queue::MemoryQueue;
use remindd_scheduler::Scheduler;
use remindd_store::MemoryStore;

fn state() -> Arc<AppState> {
    let store = Arc::new(MemoryStore::new());
    let queue = Arc::new(MemoryQueue::new(QueueSettings::default()));
    let scheduler = Arc::new(Scheduler::new(
        store.clone(),
        queue.clone(),
        SchedulerSettings::default(),
    ));
    Arc::new(AppState::new(store, queue, scheduler))
}

#[tokio::test]
async fn test_health_reports_healthy_components() {
    let response = health(State(state())).await.into_response();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_probes() {
    assert_eq!(livez().await, StatusCode::OK);
    assert_eq!(readyz(State(state())).await, StatusCode::OK);
}

#[test]
fn test_health_response_serialization() {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: "0.1.0".to_string(),
        uptime_seconds: 42,
        components: vec![ComponentHealth {
            name: "store".to_string(),
            status: HealthStatus::Healthy,
            message: None,
        }],
    };
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["uptime_seconds"], 42);
    assert_eq!(json["components"][0]["name"], "store");
    // `message: None` is omitted entirely.
    assert!(json["components"][0].get("message").is_none());
}

#[test]
fn test_component_from_probe() {
    let healthy = ComponentHealth::from_probe("queue", None);
    assert_eq!(healthy.status, HealthStatus::Healthy);

    let broken = ComponentHealth::from_probe("store", Some("unreachable".to_string()));
    assert_eq!(broken.status, HealthStatus::Unhealthy);
    assert_eq!(broken.message.as_deref(), Some("unreachable"));
}
