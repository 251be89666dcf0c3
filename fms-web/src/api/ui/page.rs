//! Page handlers: full page, view fragment, current image

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};

use super::render::{escape_html, render_view};
use crate::AppState;

/// GET /
///
/// Page shell with the current view already rendered into `<main>`
pub async fn root_page(State(state): State<AppState>) -> Html<String> {
    let version = env!("CARGO_PKG_VERSION");
    let git_hash = env!("GIT_HASH");
    let build_profile = env!("BUILD_PROFILE");
    let build_timestamp = env!("BUILD_TIMESTAMP");

    let snapshot = state.controller.snapshot().await;
    let view = render_view(&snapshot);

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Find My Spot</title>
    <link rel="stylesheet" href="/static/find-my-spot.css">
</head>
<body>
    <header>
        <div class="header-content">
            <div class="header-left">
                <h1>
                    Find My Spot
                    <span class="connection-status status-connecting" id="connection-status">Connecting...</span>
                </h1>
                <p class="subtitle">Upload a photo of a place, and let AI tell you where it is.</p>
            </div>
            <div class="header-right">
                <div class="build-info-line">fms-web v{version}</div>
                <div class="build-info-line">{git_hash} ({build_profile})</div>
                <div class="build-info-line">{build_timestamp}</div>
            </div>
        </div>
    </header>
    <main id="view">
{view}
    </main>
    <script src="/static/find-my-spot.js"></script>
</body>
</html>
"#,
        version = version,
        git_hash = escape_html(short_hash(git_hash)),
        build_profile = escape_html(build_profile),
        build_timestamp = escape_html(build_timestamp),
        view = view,
    ))
}

/// GET /ui/view
///
/// Inner HTML of `<main id="view">` for the current state
pub async fn view_fragment(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.controller.snapshot().await;
    Html(render_view(&snapshot))
}

/// GET /ui/image
///
/// Bytes of the uploaded image, 404 when none is held
pub async fn current_image(State(state): State<AppState>) -> Response {
    let snapshot = state.controller.snapshot().await;
    match snapshot.image {
        Some(image) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, image.media_type.as_mime()),
                (header::CACHE_CONTROL, "no-store"),
            ],
            image.bytes,
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "No image uploaded").into_response(),
    }
}

fn short_hash(hash: &str) -> &str {
    hash.get(..8).unwrap_or(hash)
}
