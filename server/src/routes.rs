use aspexis_shared::ClientConfig;
use axum::Json;
use axum::extract::State;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "static_dir_present": state.static_dir.join("index.html").is_file(),
    }))
}

/// Deployment-time settings for the browser bundle, sent with `no-store`.
pub async fn client_config(State(state): State<AppState>) -> Response {
    let config: &ClientConfig = &state.client_config;
    let mut response = Json(config.clone()).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
