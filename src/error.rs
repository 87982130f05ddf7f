//! Application error taxonomy.
//!
//! Every failure a handler detects on purpose is an [`AppError`]: an HTTP status, a
//! client-facing message, optional per-field details and an optional cause. The cause is
//! only ever logged; the HTTP layer never serializes it.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use axum::http::StatusCode;

/// Field name → human-readable violation message.
pub type ErrorDetails = BTreeMap<String, String>;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Classification of application errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Request data is syntactically fine but unusable (400)
    InvalidInput,
    /// Request body could not be decoded (400)
    InvalidPayload,
    /// Requested resource does not exist (404)
    NotFound,
    /// Field-level validation rejected the payload (422)
    ValidationFailed,
    /// Unexpected server-side failure (500)
    Internal,
    /// Backing store failure (500)
    Storage,
    /// Any other status built through [`AppError::new`]
    Other,
}

impl ErrorKind {
    /// Best-effort classification for an arbitrary status code.
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_REQUEST => ErrorKind::InvalidInput,
            StatusCode::NOT_FOUND => ErrorKind::NotFound,
            StatusCode::UNPROCESSABLE_ENTITY => ErrorKind::ValidationFailed,
            StatusCode::INTERNAL_SERVER_ERROR => ErrorKind::Internal,
            _ => ErrorKind::Other,
        }
    }
}

/// Typed application error.
#[derive(Debug)]
pub struct AppError {
    kind: ErrorKind,
    status: StatusCode,
    message: Cow<'static, str>,
    details: Option<ErrorDetails>,
    source: Option<BoxError>,
}

impl AppError {
    /// Create an error with an explicit status and message.
    pub fn new(status: StatusCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_kind(ErrorKind::from_status(status), status, message)
    }

    /// Wrap an underlying cause. The cause is kept for logging only.
    pub fn wrap<E>(source: E, status: StatusCode, message: impl Into<Cow<'static, str>>) -> Self
    where
        E: Into<BoxError>,
    {
        Self::new(status, message).with_source(source)
    }

    fn with_kind(kind: ErrorKind, status: StatusCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// 400 - request data rejected by a business rule.
    pub fn invalid_input() -> Self {
        Self::with_kind(ErrorKind::InvalidInput, StatusCode::BAD_REQUEST, "Invalid input data")
    }

    /// 400 - body is not valid JSON for the expected shape.
    pub fn invalid_json() -> Self {
        Self::with_kind(ErrorKind::InvalidPayload, StatusCode::BAD_REQUEST, "Invalid JSON format")
    }

    /// 404 - no task with the requested id.
    pub fn task_not_found() -> Self {
        Self::with_kind(ErrorKind::NotFound, StatusCode::NOT_FOUND, "Task not found")
    }

    /// 404 - generic missing resource.
    pub fn not_found() -> Self {
        Self::with_kind(ErrorKind::NotFound, StatusCode::NOT_FOUND, "Resource not found")
    }

    /// 422 - field validation failed; attach the violations with [`Self::with_details`].
    pub fn validation_failed() -> Self {
        Self::with_kind(
            ErrorKind::ValidationFailed,
            StatusCode::UNPROCESSABLE_ENTITY,
            "Validation failed",
        )
    }

    /// 500 - unexpected failure.
    pub fn internal() -> Self {
        Self::with_kind(
            ErrorKind::Internal,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
        )
    }

    /// 500 - storage layer failure.
    pub fn database() -> Self {
        Self::with_kind(ErrorKind::Storage, StatusCode::INTERNAL_SERVER_ERROR, "Database error")
    }

    /// Attach field-level details, replacing any previous ones.
    pub fn with_details<I, K, V>(mut self, details: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.details = Some(
            details
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Attach a single detail entry.
    pub fn with_detail(self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.with_details([(field.into(), message.into())])
    }

    /// Attach the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&ErrorDetails> {
        self.details.as_ref()
    }

    /// Whether this is a server-side failure that must be logged.
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {}", self.message, source),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}
