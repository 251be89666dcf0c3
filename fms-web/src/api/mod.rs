//! HTTP API handlers for fms-web
//!
//! - `analysis`: upload, reset, state snapshot
//! - `overlay`: follow-up info overlay
//! - `health`: health check
//! - `sse`: state-change event stream
//! - `ui`: server-rendered pages, fragments and static assets

pub mod analysis;
pub mod health;
pub mod overlay;
pub mod sse;
pub mod ui;

pub use analysis::analysis_routes;
pub use health::health_routes;
pub use overlay::overlay_routes;
pub use sse::event_stream;
pub use ui::ui_routes;
