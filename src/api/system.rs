//! Service-level endpoints: liveness, version and (debug only) config dump.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::{Json, Response},
};
use chrono::Local;

use super::routes::AppState;
use super::types::{DebugConfigResponse, HealthResponse, VersionResponse};

pub const API_VERSION_HEADER: HeaderName = HeaderName::from_static("x-api-version");

/// GET /health/ping
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: state.config.app_name.clone(),
        message: "Pong!".to_string(),
        timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        version: state.config.app_version.clone(),
    })
}

/// GET /api/v1/version
pub async fn version(State(state): State<Arc<AppState>>) -> Json<VersionResponse> {
    let build_time = if state.config.is_production() {
        "production"
    } else {
        "development"
    };
    Json(VersionResponse {
        version: state.config.app_version.clone(),
        environment: state.config.environment.clone(),
        build_time: build_time.to_string(),
    })
}

/// GET /debug/config - only routed when `DEBUG` is on. Never includes secrets.
pub async fn debug_config(State(state): State<Arc<AppState>>) -> Json<DebugConfigResponse> {
    let config = &state.config;
    Json(DebugConfigResponse {
        app_name: config.app_name.clone(),
        app_version: config.app_version.clone(),
        environment: config.environment.clone(),
        debug: config.debug,
        host: config.host.clone(),
        port: config.port,
        read_timeout: format!("{:?}", config.read_timeout),
        write_timeout: format!("{:?}", config.write_timeout),
    })
}

/// Stamp every versioned response with `X-API-Version`.
pub async fn api_version_header(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    match HeaderValue::from_str(&state.config.app_version) {
        Ok(value) => {
            response.headers_mut().insert(API_VERSION_HEADER, value);
        }
        Err(e) => {
            tracing::warn!("APP_VERSION is not a valid header value: {}", e);
        }
    }
    response
}
