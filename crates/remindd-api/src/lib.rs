//! # Remindd API
//!
//! HTTP surface of the reminder service.
//!
//! ## Route Structure
//!
//! ```text
//! /health  - Detailed health check (store + queue connectivity)
//! /livez   - Liveness probe
//! /readyz  - Readiness probe
//!
//! /charges
//!   POST   /charges                     - Create charge with participants
//!   GET    /charges                     - List charges
//!   GET    /charges/{id}                - Get charge with participants
//!   PUT    /charges/{id}                - Mutate charge (amount, cadence, due date, status)
//!   POST   /charges/{id}/cancel         - Cancel charge and its pending reminders
//!   POST   /charges/{id}/participants   - Add participant
//!   GET    /charges/{id}/participants   - List participants
//!
//! /jobs
//!   GET    /jobs?state=                 - List reminder jobs
//!   GET    /jobs/{id}                   - Get job
//!   GET    /jobs/{id}/attempts          - Get the job's delivery audit log
//! ```
//!
//! Every mutating charge route runs a reconcile, so the pending-job window
//! is consistent by the time the response leaves.

pub mod charges;
pub mod error;
pub mod jobs;
pub mod monitoring;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use server::ApiServer;
pub use state::AppState;
