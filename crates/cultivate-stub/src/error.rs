//! # Application Error
//!
//! Maps stub failures to JSON error responses:
//! `{"error": {"code": <status>, "message": <text>}}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed request (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Input failed validation (422).
    #[error("validation error: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Business or compliance rule rejected the request (409).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::NotFound(m)
            | AppError::BadRequest(m)
            | AppError::Validation(m)
            | AppError::Unauthorized(m)
            | AppError::Conflict(m) => m,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "message": self.message(),
            }
        });
        (status, axum::Json(body)).into_response()
    }
}
