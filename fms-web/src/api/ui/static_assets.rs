//! Static asset handlers for the fms-web UI
//!
//! Embeds and serves CSS/JS files at compile time

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

const APP_JS: &str = include_str!("../../../static/find-my-spot.js");
const APP_CSS: &str = include_str!("../../../static/find-my-spot.css");

fn asset(content_type: &'static str, body: &'static str) -> Response {
    (
        StatusCode::OK,
        [
            ("content-type", content_type),
            ("cache-control", "no-cache, no-store, must-revalidate"),
        ],
        body,
    )
        .into_response()
}

/// GET /static/find-my-spot.js
///
/// Upload, drag-and-drop, button actions and the SSE refresh loop
pub async fn serve_app_js() -> Response {
    asset("application/javascript", APP_JS)
}

/// GET /static/find-my-spot.css
pub async fn serve_app_css() -> Response {
    asset("text/css", APP_CSS)
}
