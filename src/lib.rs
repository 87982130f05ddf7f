//! # Tasks API
//!
//! Minimal HTTP API for a "task" resource. Nothing is persisted: handlers fabricate
//! the tasks a store would return. The interesting part is the request pipeline:
//!
//! ```text
//!   request body ──► typed shape ──► rule table ──► AppError ──► ApiError ──► JSON body
//!                    (api::types)    (validation)   (error)      (api::error)
//! ```
//!
//! ## Modules
//! - `config`: environment-driven server configuration
//! - `error`: application error taxonomy
//! - `validation`: declarative per-field rules and the engine that runs them
//! - `api`: routes, handlers and the error-to-HTTP mapping

pub mod api;
pub mod config;
pub mod error;
pub mod validation;

pub use config::Config;
pub use error::{AppError, ErrorKind};
