//! Request handlers for the test-bench API.
//!
//! Every error is recovered here and surfaced as an `{"error": "..."}` body
//! with a 4xx/5xx status; nothing on this path is fatal to the process.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::{DeviceConfig, TactusConfig, TestDefaults};
use crate::export::{chart, csv, ExportError};
use crate::session::{ingest, report, SessionConfig, TestSession};
use crate::types::ClassificationKind;

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    /// The single process-wide test session
    pub session: Arc<RwLock<TestSession>>,
    /// Flat-record geometry
    pub device: DeviceConfig,
    /// Parameters applied when a start request omits them
    pub defaults: TestDefaults,
}

impl ApiState {
    pub fn new(session: Arc<RwLock<TestSession>>, config: &TactusConfig) -> Self {
        Self {
            session,
            device: config.device,
            defaults: config.test,
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

fn message_response(message: &str) -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "message": message })),
    )
        .into_response()
}

// ============================================================================
// Start / Stop
// ============================================================================

/// Body of `POST /api/start`. Optional fields fall back to the configured
/// deployment defaults.
#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub classification_type: String,
    pub cycles: Option<u32>,
    pub duration: Option<u32>,
    pub soft_threshold: Option<f64>,
    pub fresh_threshold: Option<f64>,
}

/// POST /api/start - begin a new test, replacing any prior session.
pub async fn start_test(State(state): State<ApiState>, body: String) -> Response {
    let req: StartRequest = match serde_json::from_str(&body) {
        Ok(req) => req,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, format!("invalid start request: {e}")),
    };

    let config = match SessionConfig::new(
        ClassificationKind::parse(&req.classification_type),
        req.cycles.unwrap_or(state.defaults.cycles),
        req.duration.unwrap_or(state.defaults.duration_secs),
        req.soft_threshold.unwrap_or(state.defaults.soft_threshold),
        req.fresh_threshold.unwrap_or(state.defaults.fresh_threshold),
    ) {
        Ok(config) => config,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    state.session.write().await.start(config);
    message_response("Test started")
}

/// POST /api/stop - force the session to finished without a verdict.
pub async fn stop_test(State(state): State<ApiState>) -> Response {
    state.session.write().await.stop();
    message_response("Test stopped")
}

// ============================================================================
// Ingestion
// ============================================================================

/// POST /api/post - ingest a sensor payload in any of the supported shapes.
pub async fn receive_scans(State(state): State<ApiState>, body: String) -> Response {
    match ingest::normalize(&body, state.device.channels, state.device.readings_per_channel) {
        Ok(scans) => {
            debug!(count = scans.len(), "scans ingested");
            state.session.write().await.ingest(scans);
            message_response("Data received")
        }
        Err(e) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

// ============================================================================
// Status
// ============================================================================

/// GET /api/status - advance one tick (when running) and report the session.
pub async fn get_status(State(state): State<ApiState>) -> Response {
    let snapshot = report::poll(&mut *state.session.write().await);
    (StatusCode::OK, Json(snapshot)).into_response()
}

// ============================================================================
// Exports
// ============================================================================

/// GET /api/plot_img - PNG line chart of readings over time.
pub async fn plot_img(State(state): State<ApiState>) -> Response {
    let session = state.session.read().await;
    match chart::render_png(session.scans()) {
        Ok(png) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/png")],
            png,
        )
            .into_response(),
        Err(e @ ExportError::EmptyDataset) => error_response(StatusCode::NOT_FOUND, e.to_string()),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// GET /api/download_csv - scan table as a CSV attachment.
pub async fn download_csv(State(state): State<ApiState>) -> Response {
    let session = state.session.read().await;
    match csv::render(session.scans()) {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"sensor_data.csv\"",
                ),
            ],
            body,
        )
            .into_response(),
        Err(e @ ExportError::EmptyDataset) => error_response(StatusCode::NOT_FOUND, e.to_string()),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> ApiState {
        ApiState::new(
            Arc::new(RwLock::new(TestSession::new())),
            &TactusConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_start_with_defaults() {
        let state = test_state();
        let resp = start_test(
            State(state.clone()),
            r#"{"classification_type": "soft_hard"}"#.to_string(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let session = state.session.read().await;
        assert_eq!(session.config().cycles, 3);
        assert_eq!(session.config().phase_duration_secs, 5);
    }

    #[tokio::test]
    async fn test_start_rejects_zero_duration() {
        let state = test_state();
        let resp = start_test(
            State(state),
            r#"{"classification_type": "soft_hard", "duration": 0}"#.to_string(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_start_rejects_missing_type() {
        let state = test_state();
        let resp = start_test(State(state), r#"{"cycles": 2}"#.to_string()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ingest_rejects_malformed_and_keeps_scans() {
        let state = test_state();
        let ok = receive_scans(
            State(state.clone()),
            r#"{"time": 1, "tx": 0, "rx": [5.0]}"#.to_string(),
        )
        .await;
        assert_eq!(ok.status(), StatusCode::OK);

        let bad = receive_scans(State(state.clone()), r#"{"time": 2}"#.to_string()).await;
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        assert_eq!(state.session.read().await.scans().len(), 1);
    }

    #[tokio::test]
    async fn test_exports_404_when_empty() {
        let state = test_state();
        let png = plot_img(State(state.clone())).await;
        assert_eq!(png.status(), StatusCode::NOT_FOUND);

        let csv = download_csv(State(state)).await;
        assert_eq!(csv.status(), StatusCode::NOT_FOUND);
    }
}
