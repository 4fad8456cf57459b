//! API error types with HTTP response mapping.
//!
//! Every error renders as `{"success": false, "message": "..."}` with the
//! appropriate status code. Internal errors are logged and returned as a
//! generic 500 without leaking details.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::WorkflowError;
use record_store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Missing, invalid or expired credentials.
    Unauthenticated(String),
    /// Authenticated but not allowed.
    Forbidden(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Resource not found (or not owned by the caller).
    NotFound(String),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({ "success": false, "message": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Validation(_) => ApiError::BadRequest(err.to_string()),
            WorkflowError::Forbidden { .. } => ApiError::Forbidden(err.to_string()),
            WorkflowError::OrderNotFound
            | WorkflowError::ShopNotFound
            | WorkflowError::ProductNotFound => ApiError::NotFound(err.to_string()),
            WorkflowError::ShopNotApproved => ApiError::Forbidden(err.to_string()),
            WorkflowError::InvalidTransition { .. } => ApiError::BadRequest(err.to_string()),
            WorkflowError::Store(store_err) => store_err.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ProductNotFound(_) => ApiError::NotFound(err.to_string()),
            StoreError::ProductUnavailable(_)
            | StoreError::InsufficientStock { .. }
            | StoreError::DuplicateEmail(_) => ApiError::BadRequest(err.to_string()),
            StoreError::Database(_) | StoreError::Serialization(_) | StoreError::Decode(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ProductId;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn workflow_errors_map_to_expected_status_codes() {
        assert_eq!(
            status_of(WorkflowError::Validation("x".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(
                WorkflowError::Forbidden {
                    allowed: "dealer".into()
                }
                .into()
            ),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(WorkflowError::OrderNotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(
                WorkflowError::Store(StoreError::InsufficientStock {
                    product_id: ProductId::new(),
                    available: 5,
                    requested: 6,
                })
                .into()
            ),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn internal_errors_hide_details() {
        let response = ApiError::Internal("connection pool exhausted".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
