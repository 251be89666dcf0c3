//! Analysis API handlers
//!
//! POST /api/analyze, POST /api/reset, GET /api/state

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::controller::{PrimaryPhase, StateView};
use crate::error::ApiResult;
use crate::models::UploadedImage;
use crate::AppState;

/// Optional header carrying the original file name (URI-encoded by the page)
pub const FILE_NAME_HEADER: &str = "x-file-name";

/// POST /api/analyze response
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis_id: Uuid,
    pub phase: PrimaryPhase,
}

/// POST /api/reset response
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub phase: PrimaryPhase,
}

/// POST /api/analyze
///
/// Body is the raw image; `Content-Type` must be png, jpeg or webp.
/// Returns 202 Accepted once the controller is LOADING; the analysis runs
/// in the background and completion is announced over `/events`.
pub async fn start_analysis(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<AnalyzeResponse>)> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let file_name = headers
        .get(FILE_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let image = UploadedImage::new(body, content_type, file_name)?;
    let ticket = state.controller.submit_image(image).await?;
    let analysis_id = ticket.analysis_id;

    let controller = state.controller.clone();
    tokio::spawn(async move {
        let phase = controller.run_analysis(ticket).await;
        tracing::debug!(analysis_id = %analysis_id, phase = ?phase, "Background analysis task finished");
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(AnalyzeResponse {
            analysis_id,
            phase: PrimaryPhase::Loading,
        }),
    ))
}

/// POST /api/reset
pub async fn reset(State(state): State<AppState>) -> Json<ResetResponse> {
    state.controller.reset().await;
    Json(ResetResponse {
        phase: PrimaryPhase::Idle,
    })
}

/// GET /api/state
pub async fn get_state(State(state): State<AppState>) -> Json<StateView> {
    Json(state.controller.snapshot().await.view())
}

/// Build analysis routes
pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/api/analyze", post(start_analysis))
        .route("/api/reset", post(reset))
        .route("/api/state", get(get_state))
}
