use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use models::errors::ModelError;
use service::auth::AuthError;
use service::ServiceError;

/// Error response with body `{"error": <title>, "detail": <message>}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: String,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: impl Into<String>) -> Self {
        Self { status, title, detail: detail.into() }
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", detail)
    }

    pub fn validation(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "validation_failed", detail)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, detail = %self.detail, "request_failed");
        }
        let body = serde_json::json!({ "error": self.title, "detail": self.detail });
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let detail = e.to_string();
        match e {
            ServiceError::Validation(_) | ServiceError::Model(_) => Self::validation(detail),
            ServiceError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "not_found", detail),
            ServiceError::Conflict(_) => Self::new(StatusCode::CONFLICT, "conflict", detail),
            ServiceError::Forbidden(_) => Self::new(StatusCode::FORBIDDEN, "forbidden", detail),
            ServiceError::Db(_) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", detail),
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        let detail = e.to_string();
        match e {
            AuthError::Validation(msg) => Self::validation(msg),
            AuthError::Conflict => Self::new(StatusCode::CONFLICT, "conflict", detail),
            AuthError::Unauthorized => Self::unauthorized(detail),
            AuthError::HashError(_) | AuthError::TokenError(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "auth_error", detail)
            }
            AuthError::Service(inner) => inner.into(),
        }
    }
}

impl From<ModelError> for JsonApiError {
    fn from(e: ModelError) -> Self {
        Self::validation(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

impl StartupError {
    pub fn code(&self) -> u16 {
        match self {
            StartupError::InvalidConfig(_) => 9001,
            StartupError::Database(_) => 9002,
            StartupError::Any(_) => 9100,
        }
    }
}
