//! Error-to-HTTP mapping.
//!
//! Every handler returns `Result<_, ApiError>`. This module is the only place where
//! failures become response bodies:
//!
//! | Variant | Status | `error` field |
//! |---------|--------|---------------|
//! | `App` | the error's own status | `Application Error` |
//! | `Http` | framework status | `HTTP Error` |
//! | `Unexpected` | 500 | `Internal Server Error` |
//!
//! Unexpected failures (and handler panics) are logged in full and reduced to a fixed
//! message so internal causes never reach the client.

use std::any::Any;

use axum::{
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};

use super::types::ErrorResponse;
use crate::error::AppError;

const APPLICATION_ERROR: &str = "Application Error";
const HTTP_ERROR: &str = "HTTP Error";
const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";
const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred";

/// Failure of a request handler.
#[derive(Debug)]
pub enum ApiError {
    /// One of our typed application errors
    App(AppError),
    /// Framework-level failure with an intrinsic status and message
    Http { status: StatusCode, message: String },
    /// Anything else; rendered opaquely
    Unexpected(anyhow::Error),
}

/// Result type for request handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Framework error using the status' canonical reason as message.
    pub fn http(status: StatusCode) -> Self {
        Self::Http {
            status,
            message: status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::App(err) => err.status(),
            ApiError::Http { status, .. } => *status,
            ApiError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::App(err)
    }
}

/// Typed errors travelling inside `anyhow` keep their identity.
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<AppError>() {
            Ok(app) => ApiError::App(app),
            Err(other) => ApiError::Unexpected(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::App(err) => {
                if err.is_server_error() {
                    tracing::error!(error = %err, status = err.status().as_u16(), "Application error");
                } else {
                    tracing::debug!(error = %err, status = err.status().as_u16(), "Request rejected");
                }
                let status = err.status();
                let body = ErrorResponse {
                    error: APPLICATION_ERROR.to_string(),
                    message: err.message().to_string(),
                    code: status.as_u16(),
                    details: err.details().cloned(),
                };
                (status, body)
            }
            ApiError::Http { status, message } => {
                tracing::debug!(status = status.as_u16(), "{}", message);
                let body = ErrorResponse {
                    error: HTTP_ERROR.to_string(),
                    message,
                    code: status.as_u16(),
                    details: None,
                };
                (status, body)
            }
            ApiError::Unexpected(err) => {
                tracing::error!(error = ?err, "Unhandled error");
                (StatusCode::INTERNAL_SERVER_ERROR, unexpected_body())
            }
        };
        (status, Json(body)).into_response()
    }
}

fn unexpected_body() -> ErrorResponse {
    ErrorResponse {
        error: INTERNAL_SERVER_ERROR.to_string(),
        message: UNEXPECTED_MESSAGE.to_string(),
        code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        details: None,
    }
}

/// Panic handler for `CatchPanicLayer`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "Handler panicked");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(unexpected_body())).into_response()
}

/// Fallback for routes that do not exist.
pub async fn route_not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::Http {
        status: StatusCode::NOT_FOUND,
        message: format!("Cannot {} {}", method, uri.path()),
    }
}

/// Give bodiless framework errors (405, 408, ...) the uniform error body.
///
/// Responses we rendered ourselves always carry a content type, so only raw
/// framework responses are rewritten.
pub async fn normalize_framework_error(response: Response) -> Response {
    let status = response.status();
    let is_error = status.is_client_error() || status.is_server_error();
    if is_error && !response.headers().contains_key(header::CONTENT_TYPE) {
        let mut rendered = ApiError::http(status).into_response();
        for (name, value) in response.headers() {
            if !rendered.headers().contains_key(name) {
                rendered.headers_mut().insert(name.clone(), value.clone());
            }
        }
        return rendered;
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_app_error_body() {
        let err = AppError::validation_failed().with_detail("title", "This field is required");
        let (status, json) = render(err.into()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"], "Application Error");
        assert_eq!(json["message"], "Validation failed");
        assert_eq!(json["code"], 422);
        assert_eq!(json["details"]["title"], "This field is required");
    }

    #[tokio::test]
    async fn test_app_error_without_details_omits_field() {
        let (status, json) = render(AppError::task_not_found().into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_wrapped_cause_is_not_serialized() {
        let cause = std::io::Error::new(std::io::ErrorKind::Other, "connection refused on 10.0.0.7");
        let err = AppError::wrap(cause, StatusCode::INTERNAL_SERVER_ERROR, "Database error");
        let (_, json) = render(err.into()).await;
        assert_eq!(json["message"], "Database error");
        assert!(!json.to_string().contains("10.0.0.7"));
    }

    #[tokio::test]
    async fn test_http_error_body() {
        let (status, json) = render(ApiError::http(StatusCode::METHOD_NOT_ALLOWED)).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json["error"], "HTTP Error");
        assert_eq!(json["message"], "Method Not Allowed");
        assert_eq!(json["code"], 405);
    }

    #[tokio::test]
    async fn test_unexpected_error_is_opaque() {
        let err = anyhow::anyhow!("secret stack detail").context("loading row 42");
        let (status, json) = render(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Internal Server Error");
        assert_eq!(json["message"], "An unexpected error occurred");
        assert_eq!(json["code"], 500);
        let text = json.to_string();
        assert!(!text.contains("secret"));
        assert!(!text.contains("row 42"));
    }

    #[test]
    fn test_anyhow_keeps_app_error_identity() {
        let err: ApiError = anyhow::Error::new(AppError::task_not_found()).into();
        assert!(matches!(err, ApiError::App(ref e) if e.status() == StatusCode::NOT_FOUND));

        let err: ApiError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, ApiError::Unexpected(_)));
    }

    #[tokio::test]
    async fn test_panic_response_is_generic() {
        let response = panic_response(Box::new("index out of bounds".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "An unexpected error occurred");
    }

    #[tokio::test]
    async fn test_normalize_rewrites_bare_framework_errors() {
        let bare = StatusCode::REQUEST_TIMEOUT.into_response();
        let response = normalize_framework_error(bare).await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );

        let ok = StatusCode::OK.into_response();
        let response = normalize_framework_error(ok).await;
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    }
}
