// Web server: Axum-based JSON API over the classification pipeline.
//
// The pipeline is loaded once before the server starts and shared
// read-only by every handler through AppState. Inference is CPU-bound and
// synchronous, so handlers run it on the blocking thread pool.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::classify::Pipeline;

pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(pipeline: Arc<Pipeline>, port: u16, bind: &str) -> Result<()> {
    let app = build_router(AppState { pipeline });

    let addr = format!("{bind}:{port}");
    info!("youtoxic API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/classifications",
            post(handlers::classify::classify_texts),
        )
        .route(
            "/api/text-classifications",
            post(handlers::classify::classify_text),
        )
        .route(
            "/api/ulm-classifications",
            post(handlers::ulm::classify_texts_ulm),
        )
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin may call the API; only GET and JSON POST are allowed.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// Only reachable once every model has loaded, so a 200 means ready.
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "threshold": state.pipeline.threshold(),
    }))
}

/// JSON error body: `{"error": message}`.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
