//! Live Chess Cloud capture server
//!
//! A local Axum server that a capture front end (browser extension, proxy)
//! posts viewer responses to. It keeps one capture session in memory and
//! serves it back as a merged PGN or as raw JSON.

mod api;
mod error;
mod session;

use anyhow::Context;
use axum::routing::{delete, get};
use axum::Router;
use lcc_core::CaptureFilter;
use lcc_export::config::LccConfig;
use lcc_server::middleware::timing_layer;
use session::SessionHandle;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the task owning the capture session.
    pub session: SessionHandle,
    /// URLs outside this filter are logged on capture.
    pub filter: Arc<CaptureFilter>,
}

/// Health check endpoint.
///
/// Returns "ok" to indicate the server is running.
async fn health() -> &'static str {
    "ok"
}

fn app(state: AppState) -> Router {
    // The extension posts from its own origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route(
            "/api/captures",
            get(api::captures::list_captures).post(api::captures::post_capture),
        )
        .route("/api/export/pgn", get(api::export::export_pgn))
        .route("/api/export/json", get(api::export::export_json))
        .route("/api/session", delete(api::session::reset_session))
        .with_state(state)
        .layer(axum::middleware::from_fn(timing_layer))
        .layer(cors)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = LccConfig::load().context("Failed to load configuration")?;
    let state = AppState {
        session: SessionHandle::spawn(),
        filter: Arc::new(config.capture.clone()),
    };

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    tracing::info!("Capture server running on http://{}", addr);

    axum::serve(listener, app(state)).await.context("Server error")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const BASE: &str = "https://1.pool.livechesscloud.com/get/5e1d/";

    fn test_app() -> Router {
        app(AppState {
            session: SessionHandle::spawn(),
            filter: Arc::new(CaptureFilter::default()),
        })
    }

    fn post_capture(path: &str, data: Value) -> Request<Body> {
        let body = json!({ "url": format!("{}{}", BASE, path), "data": data });
        Request::builder()
            .method(Method::POST)
            .uri("/api/captures")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health_returns_ok() {
        let result = health().await;
        assert_eq!(result, "ok");
    }

    #[tokio::test]
    async fn test_capture_export_reset_flow() {
        let app = test_app();

        for request in [
            post_capture("tournament.json", json!({ "name": "Spring Open" })),
            post_capture(
                "round-1/index.json",
                json!({ "pairings": [
                    { "white": { "fname": "Anna", "lname": "Muzychuk" },
                      "black": { "fname": "Ju", "lname": "Wenjun" } },
                    { "white": { "lname": "Second" }, "black": { "lname": "Board" } }
                ] }),
            ),
            post_capture("round-1/game-1.json", json!({ "moves": ["e4 100", "c5 99"] })),
            post_capture("round-1/game-2.json", json!({ "moves": ["d4"], "result": "DRAW" })),
        ] {
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::ACCEPTED);
        }

        let response = app.clone().oneshot(get("/api/captures")).await.unwrap();
        let captured: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(captured["count"], 4);
        assert_eq!(captured["data"].as_array().unwrap().len(), 4);

        let response = app.clone().oneshot(get("/api/export/pgn")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"SpringOpen.pgn\""
        );
        let pgn = body_text(response).await;
        assert_eq!(pgn.matches("[Event \"Spring Open\"]").count(), 2);
        assert!(pgn.contains("[White \"Anna Muzychuk\"]"));
        assert!(pgn.contains("[White \"Second\"]"));
        assert!(pgn.contains("1. e4 c5 *"));
        assert!(pgn.ends_with("1. d4 1/2-1/2"));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/api/session")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.oneshot(get("/api/export/pgn")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let detail: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(detail, json!({ "detail": "No game data captured yet" }));
    }

    #[tokio::test]
    async fn test_malformed_capture_is_rejected() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/captures")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"url\": 1}"))
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_cors_allows_extension_origin() {
        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "chrome-extension://abcdef")
            .body(Body::empty())
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }
}
