use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

/// HTTP face of [`ServiceError`]: every failure becomes
/// `{"success": false, "message": ...}` with the matching status.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            ServiceError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self { Self(e) }
}

impl From<JsonRejection> for ApiError {
    fn from(r: JsonRejection) -> Self { Self(ServiceError::InvalidArgument(r.body_text())) }
}

impl From<QueryRejection> for ApiError {
    fn from(r: QueryRejection) -> Self { Self(ServiceError::InvalidArgument(r.body_text())) }
}

impl From<PathRejection> for ApiError {
    fn from(r: PathRejection) -> Self { Self(ServiceError::InvalidArgument(r.body_text())) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self.0 {
            ServiceError::Internal(detail) => {
                error!(error = %detail, "store product request failed");
                serde_json::json!({"success": false, "message": "Server error", "error": detail})
            }
            other => serde_json::json!({"success": false, "message": other.to_string()}),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
