//! `TaskServer`: Axum router and serve loop.

use std::future::Future;
use std::time::Instant;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use taskd_store::TaskStore;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::handlers::{create_task, delete_task, read_task, update_task};
use crate::health::health_handler;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Storage handle; each handler checks out its own session.
    pub store: TaskStore,
    /// When the server started.
    pub start_time: Instant,
}

/// The task HTTP server.
pub struct TaskServer {
    config: ServerConfig,
    store: TaskStore,
    start_time: Instant,
}

impl TaskServer {
    /// Create a new server over `store`.
    pub fn new(config: ServerConfig, store: TaskStore) -> Self {
        Self {
            config,
            store,
            start_time: Instant::now(),
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            store: self.store.clone(),
            start_time: self.start_time,
        };

        Router::new()
            .route("/tasks", post(create_task))
            .route("/tasks/", post(create_task))
            .route(
                "/tasks/{id}",
                get(read_task).put(update_task).delete(delete_task),
            )
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.config.request_timeout(),
            ))
            .layer(TraceLayer::new_for_http())
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> std::io::Result<TcpListener> {
        TcpListener::bind(self.config.bind_addr()).await
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, "taskd server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("taskd server stopped");
        Ok(())
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn make_server() -> TaskServer {
        TaskServer::new(ServerConfig::default(), TaskStore::in_memory().unwrap())
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    #[tokio::test]
    async fn full_lifecycle() {
        let app = make_server().router();

        let (status, created) = send(
            &app,
            Method::POST,
            "/tasks/",
            Some(json!({"title": "A", "description": "d", "completed": false})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["id"], 1);
        assert_eq!(created["title"], "A");
        assert_eq!(created["description"], "d");
        assert_eq!(created["completed"], false);
        assert!(created["created_at"].is_string());

        let (status, updated) = send(
            &app,
            Method::PUT,
            "/tasks/1",
            Some(json!({"title": "B", "description": "d2", "completed": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], 1);
        assert_eq!(updated["title"], "B");
        assert_eq!(updated["description"], "d2");
        assert_eq!(updated["completed"], true);
        assert_eq!(updated["created_at"], created["created_at"]);

        let (status, body) = send(&app, Method::DELETE, "/tasks/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Task deleted successfully"}));

        let (status, body) = send(&app, Method::GET, "/tasks/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"detail": "Task not found"}));
    }

    #[tokio::test]
    async fn read_after_create_matches() {
        let app = make_server().router();
        let (_, created) = send(
            &app,
            Method::POST,
            "/tasks",
            Some(json!({"title": "Buy milk", "description": "2L"})),
        )
        .await;
        assert_eq!(created["completed"], false);

        let uri = format!("/tasks/{}", created["id"]);
        let (status, fetched) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn created_ids_are_unique() {
        let app = make_server().router();
        let mut seen = std::collections::HashSet::new();
        for i in 0..5 {
            let (_, task) = send(
                &app,
                Method::POST,
                "/tasks/",
                Some(json!({"title": format!("t{i}"), "description": ""})),
            )
            .await;
            assert!(seen.insert(task["id"].as_i64().unwrap()));
        }
    }

    #[tokio::test]
    async fn read_missing_on_empty_store() {
        let app = make_server().router();
        let (status, body) = send(&app, Method::GET, "/tasks/999999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Task not found");
    }

    #[tokio::test]
    async fn update_missing_is_404() {
        let app = make_server().router();
        let (status, body) = send(
            &app,
            Method::PUT,
            "/tasks/42",
            Some(json!({"title": "B", "description": "d2", "completed": true})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Task not found");
    }

    #[tokio::test]
    async fn delete_twice_is_404_second_time() {
        let app = make_server().router();
        let _ = send(
            &app,
            Method::POST,
            "/tasks/",
            Some(json!({"title": "A", "description": "d"})),
        )
        .await;

        let (first, _) = send(&app, Method::DELETE, "/tasks/1", None).await;
        let (second, body) = send(&app, Method::DELETE, "/tasks/1", None).await;
        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Task not found");
    }

    #[tokio::test]
    async fn partial_update_rejected() {
        let app = make_server().router();
        let _ = send(
            &app,
            Method::POST,
            "/tasks/",
            Some(json!({"title": "A", "description": "d"})),
        )
        .await;

        let (status, _) = send(&app, Method::PUT, "/tasks/1", Some(json!({"title": "B"}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, unchanged) = send(&app, Method::GET, "/tasks/1", None).await;
        assert_eq!(unchanged["title"], "A");
    }

    #[tokio::test]
    async fn create_rejects_unknown_fields() {
        let app = make_server().router();
        let (status, _) = send(
            &app,
            Method::POST,
            "/tasks/",
            Some(json!({"title": "A", "description": "d", "owner": "bob"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn create_rejects_malformed_json() {
        let app = make_server().router();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/tasks/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"title\": "))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_numeric_id_rejected() {
        let app = make_server().router();
        let (status, _) = send(&app, Method::GET, "/tasks/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = make_server().router();
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["uptime_secs"].is_number());
    }

    #[tokio::test]
    async fn health_reports_unavailable_when_pool_exhausted() {
        let store = TaskStore::in_memory().unwrap();
        let app = TaskServer::new(ServerConfig::default(), store.clone()).router();
        let _held = store.session().unwrap();

        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unavailable");
    }

    #[tokio::test]
    async fn slow_request_times_out() {
        let store = TaskStore::in_memory().unwrap();
        let config = ServerConfig {
            request_timeout_secs: 1,
            ..ServerConfig::default()
        };
        let app = TaskServer::new(config, store.clone()).router();
        let _held = store.session().unwrap();

        let (status, _) = send(&app, Method::GET, "/tasks/1", None).await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let app = make_server().router();
        let (status, _) = send(&app, Method::GET, "/nonexistent", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn wrong_method_returns_405() {
        let app = make_server().router();
        let (status, _) = send(&app, Method::GET, "/tasks/", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn config_accessible() {
        let server = make_server();
        assert_eq!(server.config().port, 0);
    }
}
