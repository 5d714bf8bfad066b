use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tabgroup_core::{CompletionBackend, Error, RetryPolicy, Tab};

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn CompletionBackend>,
    pub model: String,
    pub retry: RetryPolicy,
    pub started: Instant,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/group-tabs", post(group_tabs))
        .route("/health", get(health))
        .layer(cors_layer())
        .with_state(state)
}

/// Permissive on purpose: the expected caller is a browser extension whose
/// origin is not knowable ahead of time.
fn cors_layer() -> tower_http::cors::CorsLayer {
    use tower_http::cors::Any;
    tower_http::cors::CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[derive(Debug, Deserialize)]
pub struct GroupTabsBody {
    /// Absent `tabs` is treated the same as an empty list.
    #[serde(default)]
    pub tabs: Vec<Tab>,
}

async fn group_tabs(
    State(state): State<AppState>,
    Json(body): Json<GroupTabsBody>,
) -> (StatusCode, Json<serde_json::Value>) {
    match tabgroup_local::group_tabs(
        state.backend.as_ref(),
        &state.model,
        &body.tabs,
        &state.retry,
    )
    .await
    {
        Ok(groups) => {
            tracing::info!(tabs = body.tabs.len(), groups = groups.len(), "grouped tabs");
            (StatusCode::OK, Json(serde_json::Value::Object(groups)))
        }
        Err(err) => {
            tracing::error!(error = %err, "grouping failed");
            error_response(&err)
        }
    }
}

/// One stable message per failure class, plus a bounded diagnostic field
/// where the pipeline captured one.
fn error_response(err: &Error) -> (StatusCode, Json<serde_json::Value>) {
    let (status, body) = match err {
        Error::EmptyBatch => (
            StatusCode::BAD_REQUEST,
            json!({"error": "No tabs provided"}),
        ),
        Error::Extraction { keys } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "Unexpected API response structure", "keys": keys}),
        ),
        Error::Parse { excerpt } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "Failed to parse AI response as JSON", "raw": excerpt}),
        ),
        Error::NoJson { excerpt } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "No valid JSON found in AI response", "raw": excerpt}),
        ),
        Error::NotAnObject { found } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "Invalid response structure from AI", "found": found}),
        ),
        Error::Upstream(msg) | Error::NotConfigured(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "Something went wrong", "message": msg}),
        ),
    };
    (status, Json(body))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "uptime": state.started.elapsed().as_secs(),
    }))
}
