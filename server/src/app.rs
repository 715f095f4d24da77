use std::path::Path;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use tower_http::compression::CompressionLayer;
use tower_http::services::{ServeDir, ServeFile};

use crate::routes;
use crate::state::AppState;

/// Static host for the client bundle. Unknown paths (`/player/Notch`,
/// `/favorites`) get `index.html` so the client router can take over.
pub(crate) fn build_app(state: AppState) -> Router {
    let static_dir = state.static_dir.as_path();
    let static_assets = Router::new()
        .fallback_service(
            ServeDir::new(static_dir)
                .precompressed_br()
                .precompressed_gzip()
                .fallback(ServeFile::new(static_dir.join("index.html"))),
        )
        .layer(middleware::from_fn(set_static_cache_control));

    Router::new()
        .route("/config.json", get(routes::client_config))
        .route("/healthz", get(routes::health))
        .layer(CompressionLayer::new())
        .fallback_service(static_assets)
        .with_state(state)
}

async fn set_static_cache_control(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;

    if response.status().is_success() {
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(cache_control_for_path(&path)),
        );
    }

    response
}

fn cache_control_for_path(path: &str) -> &'static str {
    if is_hashed_bundle_asset(path) {
        return "public, max-age=31536000, immutable";
    }

    if path.starts_with("/icons/") || path.starts_with("/fonts/") || path.starts_with("/images/") {
        return "public, max-age=86400";
    }

    // index.html and client-side routes must revalidate to pick up new bundles.
    "no-cache"
}

fn is_hashed_bundle_asset(path: &str) -> bool {
    let Some(ext) = Path::new(path).extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    if !matches!(ext, "wasm" | "js" | "css") {
        return false;
    }

    let Some(filename) = Path::new(path).file_name().and_then(|name| name.to_str()) else {
        return false;
    };

    filename
        .split(['-', '_', '.'])
        .any(|segment| segment.len() >= 8 && segment.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;

    fn test_app(api_base_url: Option<&str>) -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(
            dir.path().join("index.html"),
            "<!doctype html><title>Aspexis</title>",
        )
        .expect("write index");
        std::fs::write(
            dir.path().join("aspexis-client-71578f6b278221f3_bg.wasm"),
            b"\0asm",
        )
        .expect("write wasm");
        let state = AppState::new(api_base_url.map(str::to_owned), dir.path().to_path_buf());
        (build_app(state), dir)
    }

    async fn get(app: Router, uri: &str) -> axum::response::Response {
        app.oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("router is infallible")
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), 1 << 20)
            .await
            .expect("body should be readable");
        String::from_utf8(bytes.to_vec()).expect("utf-8 body")
    }

    #[test]
    fn immutable_cache_for_hashed_bundle_assets() {
        assert_eq!(
            cache_control_for_path("/aspexis-client-71578f6b278221f3_bg.wasm"),
            "public, max-age=31536000, immutable"
        );
        assert_eq!(
            cache_control_for_path("/input-a93762ff3bf6d63a.css"),
            "public, max-age=31536000, immutable"
        );
    }

    #[test]
    fn short_cache_for_unhashed_static_assets() {
        assert_eq!(cache_control_for_path("/icons/star.svg"), "public, max-age=86400");
        assert_eq!(cache_control_for_path("/app.js"), "no-cache");
    }

    #[test]
    fn html_and_routes_revalidate() {
        assert_eq!(cache_control_for_path("/"), "no-cache");
        assert_eq!(cache_control_for_path("/player/Notch"), "no-cache");
    }

    #[tokio::test]
    async fn config_exposes_backend_url() {
        let (app, _dir) = test_app(Some("https://api.aspexis.test"));
        let response = get(app, "/config.json").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-store"))
        );
        let config: aspexis_shared::ClientConfig =
            serde_json::from_str(&body_string(response).await).expect("config JSON");
        assert_eq!(config.api_base_url.as_deref(), Some("https://api.aspexis.test"));
    }

    #[tokio::test]
    async fn config_without_backend_url_means_same_origin() {
        let (app, _dir) = test_app(None);
        let body = body_string(get(app, "/config.json").await).await;
        assert_eq!(body, r#"{"api_base_url":null}"#);
    }

    #[tokio::test]
    async fn client_routes_fall_back_to_index() {
        let (app, _dir) = test_app(None);
        let response = get(app, "/player/Notch").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("<title>Aspexis</title>"));
    }

    #[tokio::test]
    async fn bundle_assets_are_immutable() {
        let (app, _dir) = test_app(None);
        let response = get(app, "/aspexis-client-71578f6b278221f3_bg.wasm").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("public, max-age=31536000, immutable"))
        );
    }

    #[tokio::test]
    async fn healthz_reports_ok() {
        let (app, _dir) = test_app(None);
        let response = get(app, "/healthz").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_str(&body_string(response).await).expect("health JSON");
        assert_eq!(body["status"], "ok");
        assert_eq!(body["static_dir_present"], true);
    }
}
