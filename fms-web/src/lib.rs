//! fms-web library interface
//!
//! Exposes the router and state for the binary and integration tests

pub mod api;
pub mod controller;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use fms_common::events::EventBus;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::controller::SpotController;
use crate::services::ModelGateway;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// The single UI state controller
    pub controller: SpotController,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Request body limit for image uploads
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(gateway: Arc<dyn ModelGateway>, event_bus: EventBus, max_upload_bytes: usize) -> Self {
        Self {
            controller: SpotController::new(gateway, event_bus.clone()),
            event_bus,
            startup_time: Utc::now(),
            max_upload_bytes,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let body_limit = state.max_upload_bytes;

    Router::new()
        // UI routes (HTML pages, fragments, static assets)
        .merge(api::ui_routes())
        // API routes
        .merge(api::analysis_routes())
        .merge(api::overlay_routes())
        .merge(api::health_routes())
        .route("/events", get(api::event_stream))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
