//! Validation utilities for web DTOs.

use axum::{
    async_trait,
    extract::{rejection::FormRejection, FromRequest, Request},
    http::StatusCode,
    Form,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::web::error::ApiError;

/// A form extractor that validates the decoded body.
///
/// Oversized bodies become 413, other decoding failures 400, and
/// validation failures 422 with field-level details.
pub struct ValidatedForm<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Form<T>: FromRequest<S, Rejection = FormRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|e| {
                if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    ApiError::payload_too_large("Request body is too large")
                } else {
                    ApiError::bad_request(format!("Invalid form: {}", e))
                }
            })?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedForm(value))
    }
}

/// Validate that a string is not empty after trimming whitespace.
pub fn not_empty_trimmed(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("not_empty_trimmed")
            .with_message("Must not be empty".into()));
    }
    Ok(())
}

/// Whether `target` is a path on this site, safe to redirect to.
///
/// Only absolute paths qualify; scheme-relative (`//host`) and
/// backslash forms that browsers treat as external are refused.
pub fn is_local_path(target: &str) -> bool {
    target.starts_with('/')
        && !target.starts_with("//")
        && !target.starts_with("/\\")
        && !target.chars().any(|c| c.is_control())
}
