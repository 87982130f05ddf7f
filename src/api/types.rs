//! API request and response types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ErrorDetails;
use crate::validation::{FieldRules, FieldValue, Rule, Validate};

/// Accepted priority values, in the order shown to clients.
pub const PRIORITIES: &[&str] = &["low", "medium", "high"];

/// Task priority.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        };
        f.write_str(s)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a task.
///
/// Fields left out of the body deserialize to their zero value and are treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateTaskRequest {
    /// Task title (1-100 characters)
    pub title: String,

    /// Free-form description (up to 500 characters)
    pub description: String,

    /// One of `low`, `medium`, `high`; defaults to `medium`
    pub priority: String,

    /// Optional RFC 3339 due date
    pub due_date: String,
}

impl Validate for CreateTaskRequest {
    fn rules() -> &'static [FieldRules] {
        const RULES: &[FieldRules] = &[
            FieldRules::new("title", &[Rule::Required, Rule::Min(1), Rule::Max(100)]),
            FieldRules::new("description", &[Rule::Max(500)]),
            FieldRules::new("priority", &[Rule::OneOf(PRIORITIES)]),
            FieldRules::new("due_date", &[Rule::DateTime]),
        ];
        RULES
    }

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "title" => FieldValue::from_value(&self.title),
            "description" => FieldValue::from_value(&self.description),
            "priority" => FieldValue::from_value(&self.priority),
            "due_date" => FieldValue::from_value(&self.due_date),
            _ => FieldValue::Absent,
        }
    }
}

/// Partial update of a task. Only supplied fields change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub completed: Option<bool>,
}

impl UpdateTaskRequest {
    /// True when the body names no field at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.completed.is_none()
    }
}

impl Validate for UpdateTaskRequest {
    fn rules() -> &'static [FieldRules] {
        const RULES: &[FieldRules] = &[
            FieldRules::new("title", &[Rule::Min(1), Rule::Max(100)]),
            FieldRules::new("description", &[Rule::Max(500)]),
            FieldRules::new("priority", &[Rule::OneOf(PRIORITIES)]),
            FieldRules::new("due_date", &[Rule::DateTime]),
        ];
        RULES
    }

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "title" => FieldValue::from_option(self.title.as_deref()),
            "description" => FieldValue::from_option(self.description.as_deref()),
            "priority" => FieldValue::from_option(self.priority.as_deref()),
            "due_date" => FieldValue::from_option(self.due_date.as_deref()),
            _ => FieldValue::Absent,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Responses
// ─────────────────────────────────────────────────────────────────────────────

/// A task as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Paginated task listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskResponse>,
    pub total: usize,
    pub page: u32,
    pub limit: u32,
}

/// Envelope for single-resource responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> SuccessResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

/// Payload returned after a delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedTask {
    pub deleted_id: String,
}

/// Uniform error body for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error category ("Application Error", "HTTP Error", "Internal Server Error")
    pub error: String,

    /// Human-readable message
    pub message: String,

    /// HTTP status code
    pub code: u16,

    /// Per-field violations, when any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub message: String,
    /// Local server time, `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
    pub version: String,
}

/// Version response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
    pub environment: String,
    pub build_time: String,
}

/// Non-secret configuration dump served in debug mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConfigResponse {
    pub app_name: String,
    pub app_version: String,
    pub environment: String,
    pub debug: bool,
    pub host: String,
    pub port: u16,
    pub read_timeout: String,
    pub write_timeout: String,
}
