//! # Find My Spot Common Library
//!
//! Shared code for the Find My Spot service:
//! - Error type
//! - TOML configuration loading and API key resolution
//! - Event types (SpotEvent enum) and EventBus
//! - SSE streaming helpers

pub mod config;
pub mod error;
pub mod events;
pub mod sse;

pub use error::{Error, Result};
