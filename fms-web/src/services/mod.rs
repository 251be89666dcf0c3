//! External model integration
//!
//! - `gemini_client`: HTTP client and wire types for `generateContent`
//! - `model_gateway`: prompts, the `ModelGateway` trait and its Gemini implementation
//! - `analysis_parser`: structural validation of the analysis JSON

pub mod analysis_parser;
pub mod gemini_client;
pub mod model_gateway;

pub use gemini_client::{GeminiClient, GeminiError};
pub use model_gateway::{GatewayConfig, GatewayError, GeminiGateway, ModelGateway};
