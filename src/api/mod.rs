//! HTTP API for the Tasks service.
//!
//! ## Endpoints
//!
//! - `GET /health/ping` - Liveness check
//! - `GET /api/v1/version` - Version and environment
//! - `GET /api/v1/tasks` - List tasks
//! - `POST /api/v1/tasks` - Create a task
//! - `GET /api/v1/tasks/{id}` - Get a task
//! - `PUT /api/v1/tasks/{id}` - Update a task
//! - `DELETE /api/v1/tasks/{id}` - Delete a task
//! - `GET /debug/config` - Non-secret config dump (debug mode only)

pub mod error;
pub mod extract;
mod routes;
mod system;
mod tasks;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use routes::{router, serve, AppState};
pub use types::*;
