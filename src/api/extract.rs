//! Request extractors that fail with typed application errors.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::error::ApiError;
use crate::error::AppError;

/// JSON body whose rejections map to `AppError::invalid_json()`.
///
/// Covers a missing content type, malformed JSON and type mismatches alike; the
/// rejection is kept as the (never serialized) cause.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::invalid_json().with_source(rejection).into()),
        }
    }
}

/// Task identifier taken from the `:id` path segment.
///
/// Runs before any body extractor, so a malformed id is reported even when the body
/// is also broken.
#[derive(Debug, Clone, Copy)]
pub struct TaskId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for TaskId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::Http {
                status: rejection.status(),
                message: rejection.body_text(),
            })?;
        Ok(Self(parse_task_id(&raw)?))
    }
}

/// Check that a path identifier is a syntactically valid UUID.
///
/// # Errors
///
/// Returns `AppError::invalid_input()` with an `id` detail.
pub fn parse_task_id(raw: &str) -> Result<Uuid, AppError> {
    if raw.is_empty() {
        return Err(AppError::invalid_input().with_detail("id", "Task ID is required"));
    }
    Uuid::parse_str(raw)
        .map_err(|e| {
            AppError::invalid_input()
                .with_detail("id", "Task ID must be a valid UUID")
                .with_source(e)
        })
}
