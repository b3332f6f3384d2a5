//! # Custom Extractors
//!
//! [`ValidatedJson`] wraps axum's `Json` so a malformed or ill-typed body is
//! reported through [`AppError`] in the same `{"error": {...}}` shape as
//! every other failure, instead of axum's plain-text rejection.

use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON request body. Syntax errors map to 400, type errors to 422.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        if rejection.status() == StatusCode::UNPROCESSABLE_ENTITY {
            AppError::Validation(message)
        } else {
            AppError::BadRequest(message)
        }
    }
}
