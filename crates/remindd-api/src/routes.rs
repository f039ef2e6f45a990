//! HTTP route definitions.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::trace::TraceLayer;

use crate::charges::{
    add_participant, cancel_charge, create_charge, get_charge, list_charges, list_participants,
    update_charge,
};
use crate::jobs::{get_job, job_attempts, list_jobs};
use crate::monitoring::{health, livez, readyz};
use crate::state::AppState;

/// Create the main router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let charge_routes = Router::new()
        .route("/", post(create_charge).get(list_charges))
        .route("/{id}", get(get_charge))
        .route("/{id}", put(update_charge))
        .route("/{id}/cancel", post(cancel_charge))
        .route("/{id}/participants", post(add_participant).get(list_participants));

    let job_routes = Router::new()
        .route("/", get(list_jobs))
        .route("/{id}", get(get_job))
        .route("/{id}/attempts", get(job_attempts));

    Router::new()
        .route("/health", get(health))
        .route("/livez", get(livez))
        .route("/readyz", get(readyz))
        .nest("/charges", charge_routes)
        .nest("/jobs", job_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
