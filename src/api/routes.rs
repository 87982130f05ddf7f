//! Router assembly and server lifecycle.

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::error;
use super::system;
use super::tasks as tasks_api;
use crate::config::Config;

/// Shared application state.
pub struct AppState {
    pub config: Config,
}

/// Build the full application router.
pub fn router(config: Config) -> Router {
    let state = Arc::new(AppState { config });

    let v1_routes = Router::new()
        .route("/version", get(system::version))
        .merge(tasks_api::routes())
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            system::api_version_header,
        ));

    let mut app = Router::new()
        .route("/health/ping", get(system::health))
        .nest("/api/v1", v1_routes);

    if state.config.debug {
        app = app.route("/debug/config", get(system::debug_config));
    }

    with_layers(app, state)
}

/// Attach the fallback, the middleware stack and the state to a set of routes.
fn with_layers(app: Router<Arc<AppState>>, state: Arc<AppState>) -> Router {
    app.fallback(error::route_not_found)
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(middleware::map_response(error::normalize_framework_error))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = config.addr();
    let app = router(config);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Resolve on SIGINT/SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const TASK_ID: &str = "4f6c1a0e-8d8b-4f5e-9c3a-2b7d1e9f0a11";
    const NIL_ID: &str = "00000000-0000-0000-0000-000000000000";

    fn app() -> Router {
        router(Config::default())
    }

    async fn send(
        app: Router,
        method: Method,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, axum::http::HeaderMap, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, json)
    }

    // ==================== Tasks ====================

    #[tokio::test]
    async fn test_list_tasks() {
        let (status, headers, json) = send(app(), Method::GET, "/api/v1/tasks", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["x-api-version"], "1.0.0");
        assert_eq!(json["total"], 2);
        assert_eq!(json["page"], 1);
        assert_eq!(json["limit"], 10);
        assert_eq!(json["tasks"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_task_defaults() {
        let (status, _, json) = send(
            app(),
            Method::POST,
            "/api/v1/tasks",
            Some(r#"{"title":"Write docs"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["title"], "Write docs");
        assert_eq!(json["data"]["priority"], "medium");
        assert_eq!(json["data"]["completed"], false);
        assert!(json["data"].get("due_date").is_none());
        let id = json["data"]["id"].as_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn test_create_task_with_all_fields() {
        let (status, _, json) = send(
            app(),
            Method::POST,
            "/api/v1/tasks",
            Some(r#"{"title":"Ship","description":"v1","priority":"high","due_date":"2025-01-31T17:00:00Z"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["data"]["priority"], "high");
        assert_eq!(json["data"]["due_date"], "2025-01-31T17:00:00Z");
    }

    #[tokio::test]
    async fn test_create_task_missing_title() {
        let (status, _, json) =
            send(app(), Method::POST, "/api/v1/tasks", Some(r#"{"priority":"low"}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"], "Application Error");
        assert_eq!(json["message"], "Validation failed");
        assert_eq!(json["code"], 422);
        assert_eq!(json["details"]["title"], "This field is required");
    }

    #[tokio::test]
    async fn test_create_task_reports_all_violations() {
        let body = serde_json::json!({
            "title": "t".repeat(101),
            "description": "d".repeat(501),
            "priority": "urgent",
            "due_date": "31/01/2025",
        })
        .to_string();
        let (status, _, json) = send(app(), Method::POST, "/api/v1/tasks", Some(&body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let details = json["details"].as_object().unwrap();
        assert_eq!(details.len(), 4);
        assert!(details["title"].as_str().unwrap().contains("100"));
        assert!(details["description"].as_str().unwrap().contains("500"));
        assert_eq!(details["priority"], "This field must be one of: low medium high");
        assert!(details["due_date"].as_str().unwrap().contains("datetime"));
    }

    #[tokio::test]
    async fn test_create_task_malformed_json() {
        let (status, _, json) =
            send(app(), Method::POST, "/api/v1/tasks", Some(r#"{"title": "#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Invalid JSON format");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_create_task_wrong_type_is_invalid_json() {
        let (status, _, json) =
            send(app(), Method::POST, "/api/v1/tasks", Some(r#"{"title": 42}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Invalid JSON format");
        assert!(!json.to_string().contains("invalid type"));
    }

    #[tokio::test]
    async fn test_create_task_without_content_type() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/tasks")
            .body(Body::from(r#"{"title":"x"}"#))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_task() {
        let uri = format!("/api/v1/tasks/{}", TASK_ID);
        let (status, _, json) = send(app(), Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["id"], TASK_ID);
    }

    #[tokio::test]
    async fn test_get_task_is_repeatable() {
        let uri = format!("/api/v1/tasks/{}", TASK_ID);
        let (_, _, mut first) = send(app(), Method::GET, &uri, None).await;
        let (_, _, mut second) = send(app(), Method::GET, &uri, None).await;
        for json in [&mut first, &mut second] {
            let data = json["data"].as_object_mut().unwrap();
            data.remove("created_at");
            data.remove("updated_at");
        }
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_invalid_uuid_is_rejected_for_every_method() {
        for method in [Method::GET, Method::PUT, Method::DELETE] {
            let body = (method == Method::PUT).then_some(r#"{"completed":true}"#);
            let (status, _, json) =
                send(app(), method.clone(), "/api/v1/tasks/not-a-uuid", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "method {}", method);
            assert!(json["details"]["id"]
                .as_str()
                .unwrap()
                .contains("valid UUID"));
        }
    }

    #[tokio::test]
    async fn test_invalid_uuid_checked_before_body() {
        let (status, _, json) =
            send(app(), Method::PUT, "/api/v1/tasks/nope", Some("not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Invalid input data");
        assert!(json["details"]["id"].is_string());
    }

    #[tokio::test]
    async fn test_sentinel_id_is_not_found() {
        let uri = format!("/api/v1/tasks/{}", NIL_ID);
        for method in [Method::GET, Method::DELETE] {
            let (status, _, json) = send(app(), method, &uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(json["message"], "Task not found");
        }
        let (status, _, _) = send(app(), Method::PUT, &uri, Some(r#"{"title":"x"}"#)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_task_applies_fields() {
        let uri = format!("/api/v1/tasks/{}", TASK_ID);
        let (status, _, json) = send(
            app(),
            Method::PUT,
            &uri,
            Some(r#"{"priority":"low","description":"rewritten","completed":false}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["priority"], "low");
        assert_eq!(json["data"]["description"], "rewritten");
        assert_eq!(json["data"]["completed"], false);
        assert_eq!(json["data"]["id"], TASK_ID);
    }

    #[tokio::test]
    async fn test_update_description_does_not_touch_priority() {
        let uri = format!("/api/v1/tasks/{}", TASK_ID);
        let (status, _, json) =
            send(app(), Method::PUT, &uri, Some(r#"{"description":"medium"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["priority"], "high");
    }

    #[tokio::test]
    async fn test_update_requires_a_field() {
        let uri = format!("/api/v1/tasks/{}", TASK_ID);
        let (status, _, json) = send(app(), Method::PUT, &uri, Some("{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Invalid input data");
        assert!(json["details"]["update"].is_string());
    }

    #[tokio::test]
    async fn test_update_validates_supplied_fields() {
        let uri = format!("/api/v1/tasks/{}", TASK_ID);
        let (status, _, json) =
            send(app(), Method::PUT, &uri, Some(r#"{"priority":"urgent"}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["details"]["priority"].is_string());
    }

    #[tokio::test]
    async fn test_delete_task() {
        let uri = format!("/api/v1/tasks/{}", TASK_ID);
        let (status, _, json) = send(app(), Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["deleted_id"], TASK_ID);
    }

    // ==================== System ====================

    #[tokio::test]
    async fn test_health_ping() {
        let (status, headers, json) = send(app(), Method::GET, "/health/ping", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "Tasks API");
        assert_eq!(json["version"], "1.0.0");
        assert_eq!(json["timestamp"].as_str().unwrap().len(), 19);
        assert!(headers.get("x-api-version").is_none());
    }

    #[tokio::test]
    async fn test_version() {
        let (status, _, json) = send(app(), Method::GET, "/api/v1/version", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["version"], "1.0.0");
        assert_eq!(json["environment"], "development");
        assert_eq!(json["build_time"], "development");
    }

    #[tokio::test]
    async fn test_debug_config_only_in_debug_mode() {
        let (status, _, _) = send(app(), Method::GET, "/debug/config", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let config = Config {
            debug: true,
            jwt_secret: Some("s3cret".to_string()),
            ..Config::default()
        };
        let (status, _, json) = send(router(config), Method::GET, "/debug/config", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["debug"], true);
        assert!(!json.to_string().contains("s3cret"));
    }

    // ==================== Framework errors ====================

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, _, json) = send(app(), Method::GET, "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "HTTP Error");
        assert_eq!(json["message"], "Cannot GET /nope");
        assert_eq!(json["code"], 404);
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let (status, _, json) = send(app(), Method::PATCH, "/api/v1/tasks", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json["error"], "HTTP Error");
        assert_eq!(json["code"], 405);
    }

    #[tokio::test]
    async fn test_panicking_handler_yields_generic_500() {
        async fn explode() -> &'static str {
            panic!("database password is hunter2")
        }

        let state = Arc::new(AppState {
            config: Config::default(),
        });
        let app = with_layers(Router::new().route("/explode", get(explode)), state);
        let (status, _, json) = send(app, Method::GET, "/explode", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Internal Server Error");
        assert_eq!(json["message"], "An unexpected error occurred");
        assert_eq!(json["code"], 500);
        assert!(!json.to_string().contains("hunter2"));
    }

    #[tokio::test]
    async fn test_task_collection_accepts_trailing_slash() {
        let (status, _, json) = send(app(), Method::GET, "/api/v1/tasks/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 2);

        let (status, headers, json) = send(
            app(),
            Method::POST,
            "/api/v1/tasks/",
            Some(r#"{"title":"Trailing"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["data"]["title"], "Trailing");
        assert_eq!(headers["x-api-version"], "1.0.0");
    }
}
