//! API error types and their HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use remindd_model::ValidationError;
use remindd_scheduler::SchedulerError;
use remindd_store::StoreError;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request payload failed domain validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed request parameter.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Scheduler error.
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Scheduler(SchedulerError::ChargeNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(_) | ApiError::Scheduler(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_validation_maps_to_422() {
        let err = ApiError::Validation(ValidationError::NonPositiveAmount(0));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_missing_charge_maps_to_404() {
        let err = ApiError::Scheduler(SchedulerError::ChargeNotFound(Uuid::new_v4()));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

        let err = ApiError::NotFound("job x".to_string());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_store_maps_to_500() {
        let err = ApiError::Store(StoreError::Storage("disk full".to_string()));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
