//! Error types for the HTTP API.
//!
//! [`ApiError`] maps engine failures onto HTTP responses via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Dataset
//! failures reach clients as a bare 503; the cause was already logged by
//! the dataset adapter.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pitwall_stats::StatsError;

/// Message sent to clients when the dataset cannot answer.
const UNAVAILABLE_MESSAGE: &str = "Database unavailable";

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A request parameter was missing or invalid.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The dataset could not be reached or a scan failed.
    #[error("dataset unavailable")]
    Unavailable,
}

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::Validation(msg) => Self::Validation(msg),
            StatsError::DatasetUnavailable => Self::Unavailable,
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                UNAVAILABLE_MESSAGE.to_owned(),
            ),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
