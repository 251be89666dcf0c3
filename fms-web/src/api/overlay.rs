//! Follow-up overlay API handlers
//!
//! POST /api/matches/:index/more-info, POST /api/overlay/close

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::controller::OverlayPhase;
use crate::error::ApiResult;
use crate::AppState;

/// POST /api/matches/:index/more-info response
#[derive(Debug, Serialize)]
pub struct MoreInfoResponse {
    pub request_id: Uuid,
    pub title: String,
    pub phase: OverlayPhase,
}

/// POST /api/overlay/close response
#[derive(Debug, Serialize)]
pub struct CloseOverlayResponse {
    pub phase: OverlayPhase,
}

/// POST /api/matches/:index/more-info
///
/// Opens the overlay for the match at `index` of the current result and
/// fetches follow-up info in the background. 404 if there is no such match.
pub async fn request_more_info(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> ApiResult<(StatusCode, Json<MoreInfoResponse>)> {
    let location = state.controller.match_at(index).await?;
    let ticket = state.controller.request_more_info(&location).await;

    let response = MoreInfoResponse {
        request_id: ticket.request_id,
        title: ticket.label.clone(),
        phase: OverlayPhase::LoadingInfo,
    };

    let controller = state.controller.clone();
    tokio::spawn(async move {
        controller.run_more_info(ticket).await;
    });

    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// POST /api/overlay/close
pub async fn close_overlay(State(state): State<AppState>) -> Json<CloseOverlayResponse> {
    state.controller.close_overlay().await;
    Json(CloseOverlayResponse {
        phase: OverlayPhase::Closed,
    })
}

/// Build overlay routes
pub fn overlay_routes() -> Router<AppState> {
    Router::new()
        .route("/api/matches/:index/more-info", post(request_more_info))
        .route("/api/overlay/close", post(close_overlay))
}
