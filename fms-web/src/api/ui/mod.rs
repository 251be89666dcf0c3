//! UI Routes - server-rendered HTML for the Find My Spot page
//!
//! # Structure
//! - **Static Assets** (`static_assets`): CSS/JS file serving
//! - **Page** (`page`): full page shell, `/ui/view` fragment, `/ui/image`
//! - **Render** (`render`): pure `ControllerState` → HTML functions
//!
//! The page script re-fetches `/ui/view` whenever `/events` reports a change,
//! so every phase is rendered here from the controller state.

use crate::AppState;
use axum::{routing::get, Router};

mod page;
pub mod render;
mod static_assets;

use page::{current_image, root_page, view_fragment};
use static_assets::{serve_app_css, serve_app_js};

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        // Page routes
        .route("/", get(root_page))
        .route("/ui/view", get(view_fragment))
        .route("/ui/image", get(current_image))
        // Static assets
        .route("/static/find-my-spot.js", get(serve_app_js))
        .route("/static/find-my-spot.css", get(serve_app_css))
}
