//! REST API module using Axum
//!
//! HTTP surface for the test bench:
//! - `/api/start`, `/api/stop` - session lifecycle
//! - `/api/post` - sensor ingestion (single scan, burst envelope, or flat record)
//! - `/api/status` - poll-driven status snapshot (each poll advances one tick)
//! - `/api/plot_img`, `/api/download_csv` - derived exports
//! - Operator pages served via `rust-embed` (compiled into the binary)

pub mod handlers;

pub use handlers::ApiState;

use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use rust_embed::Embed;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Operator frontend compiled from `static/`.
#[derive(Embed)]
#[folder = "static/"]
struct FrontendAssets;

/// Serve a named embedded asset.
fn serve_named(path: &str) -> Response {
    match FrontendAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            axum::Json(serde_json::json!({ "error": "File not found" })),
        )
            .into_response(),
    }
}

/// Serve a static asset, falling back to `index.html` for the root path.
async fn serve_asset(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    if path.is_empty() {
        return serve_named("index.html");
    }
    serve_named(path)
}

async fn serve_hardness() -> Response {
    serve_named("hardness.html")
}

async fn serve_fruit() -> Response {
    serve_named("fruit.html")
}

async fn serve_download() -> Response {
    serve_named("download.html")
}

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// Set `TACTUS_CORS_ORIGINS` to a comma-separated list of allowed origins
/// for development.
fn build_cors_layer() -> CorsLayer {
    match std::env::var("TACTUS_CORS_ORIGINS") {
        Ok(origins) => {
            let allowed: Vec<_> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE])
        }
        Err(_) => CorsLayer::new()
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
    }
}

/// Create the complete application router with API and page serving.
pub fn create_app(state: ApiState) -> Router {
    let cors = build_cors_layer();

    Router::new()
        .route("/api/start", post(handlers::start_test))
        .route("/api/stop", post(handlers::stop_test))
        .route("/api/post", post(handlers::receive_scans))
        .route("/api/status", get(handlers::get_status))
        .route("/api/plot_img", get(handlers::plot_img))
        .route("/api/download_csv", get(handlers::download_csv))
        .route("/hardness", get(serve_hardness))
        .route("/fruit", get(serve_fruit))
        .route("/download", get(serve_download))
        .with_state(state)
        // Any other path resolves against the embedded frontend
        .fallback(serve_asset)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TactusConfig;
    use crate::session::TestSession;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use tower::ServiceExt;

    fn create_test_state() -> ApiState {
        ApiState::new(
            Arc::new(RwLock::new(TestSession::new())),
            &TactusConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_status_route() {
        let app = create_app(create_test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_page_routes() {
        for path in ["/", "/hardness", "/fruit", "/download"] {
            let app = create_app(create_test_state());
            let response = app
                .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "GET {path}");
        }
    }

    #[tokio::test]
    async fn test_unknown_asset_is_404() {
        let app = create_app(create_test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/missing.js")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
