//! Model gateway: prompts, Gemini calls and response normalization
//!
//! Stateless. The API key is resolved on every call so a missing key fails
//! fast, before any network traffic.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use fms_common::config::{resolve_gemini_api_key, TomlConfig};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::models::{AnalysisResult, FollowUpInfo, GroundingSource, UploadedImage};
use crate::services::analysis_parser::parse_analysis;
use crate::services::gemini_client::{
    Content, GeminiClient, GeminiError, GenerateContentRequest, GenerationConfig, Part, Tool,
};

/// Gateway errors
///
/// `Config` is the configuration class (raised before any network call);
/// every other variant is the operation class.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model call failed: {0}")]
    Model(#[from] GeminiError),

    #[error("Malformed model JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("Invalid model response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    pub fn is_config(&self) -> bool {
        matches!(self, GatewayError::Config(_))
    }
}

/// The two model operations the controller depends on
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Analyze an image into a summary plus five ranked matches
    async fn analyze(&self, image: &UploadedImage) -> Result<AnalysisResult, GatewayError>;

    /// Search-grounded background text for a location label ("Region, Country")
    async fn more_info(&self, location_label: &str) -> Result<FollowUpInfo, GatewayError>;
}

const ANALYSIS_PROMPT: &str = r#"
You are the intelligence layer for an app called "Find My Spot". Your goal is to identify where an uploaded photograph was taken by matching it against a satellite imagery database.

1. Analyze the image: examine key geographical and man-made features (mountains, coastlines, forests, cities, deserts, landmarks, architectural styles, vegetation).
2. Infer context: from those features, infer the likely climate, biome and candidate regions on Earth.
3. Match: behave as if you had queried a large vector index of satellite image embeddings and retrieved the 5 closest matches.
4. Respond with a JSON object that strictly follows the provided schema:
   - "summary": one friendly, confident paragraph about the top finding, e.g. "This looks like Banff National Park, Canada! The satellite imagery shows a near-identical mountain-lake alignment."
   - "matches": exactly 5 plausible locations, geographically diverse but consistent with the image. The first entry is the most likely. "similarity_score" is a float between 0.85 and 0.99, highest for the first entry.

Do not mention that the search is simulated. Output clean JSON only, without markdown formatting.
"#;

/// Follow-up prompt for a location label
pub fn more_info_prompt(location_label: &str) -> String {
    format!(
        "Provide a brief, engaging summary of {}. Include interesting facts about its geography, history, or what it's known for.",
        location_label
    )
}

/// JSON schema constraining the analysis response
pub fn analysis_response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": { "type": "STRING" },
            "matches": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "region_name": { "type": "STRING" },
                        "country": { "type": "STRING" },
                        "latitude": { "type": "NUMBER" },
                        "longitude": { "type": "NUMBER" },
                        "description": { "type": "STRING" },
                        "similarity_score": { "type": "NUMBER" }
                    },
                    "required": [
                        "region_name", "country", "latitude", "longitude",
                        "description", "similarity_score"
                    ]
                }
            }
        },
        "required": ["summary", "matches"]
    })
}

/// Connection settings for [`GeminiGateway`]
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub model: String,
    pub request_timeout: Duration,
    /// TOML fallback for the API key (environment wins)
    pub toml_api_key: Option<String>,
}

impl GatewayConfig {
    pub fn from_toml(config: &TomlConfig) -> Self {
        Self {
            base_url: config.gemini_base_url.clone(),
            model: config.gemini_model.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            toml_api_key: config.gemini_api_key.clone(),
        }
    }
}

/// [`ModelGateway`] backed by the Gemini API
pub struct GeminiGateway {
    client: GeminiClient,
    toml_api_key: Option<String>,
}

impl GeminiGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = GeminiClient::new(&config.base_url, &config.model, config.request_timeout)?;
        Ok(Self {
            client,
            toml_api_key: config.toml_api_key,
        })
    }

    fn api_key(&self) -> Result<String, GatewayError> {
        resolve_gemini_api_key(self.toml_api_key.as_deref())
            .map_err(|e| GatewayError::Config(e.to_string()))
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    async fn analyze(&self, image: &UploadedImage) -> Result<AnalysisResult, GatewayError> {
        let api_key = self.api_key()?;

        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![
                Part::inline_data(image.media_type.as_mime(), STANDARD.encode(&image.bytes)),
                Part::text(ANALYSIS_PROMPT),
            ])],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(analysis_response_schema()),
            }),
            tools: Vec::new(),
        };

        tracing::info!(
            model = %self.client.model(),
            media_type = image.media_type.as_mime(),
            size_bytes = image.size_bytes(),
            "Requesting image analysis"
        );

        let response = self.client.generate_content(&api_key, &request).await?;
        let text = response.text().ok_or(GeminiError::EmptyResponse)?;
        let result = parse_analysis(&text)?;

        tracing::info!(
            top_match = %result.top_match().map(|m| m.label()).unwrap_or_default(),
            "Image analysis parsed"
        );

        Ok(result)
    }

    async fn more_info(&self, location_label: &str) -> Result<FollowUpInfo, GatewayError> {
        let api_key = self.api_key()?;

        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text(more_info_prompt(location_label))])],
            generation_config: None,
            tools: vec![Tool::google_search()],
        };

        tracing::info!(location = %location_label, "Requesting follow-up info");

        let response = self.client.generate_content(&api_key, &request).await?;
        let text = response.text().ok_or(GeminiError::EmptyResponse)?;

        // Chunks without a web reference are kept; rendering skips them
        let sources = response
            .grounding_chunks()
            .iter()
            .map(|chunk| GroundingSource {
                uri: chunk.web.as_ref().and_then(|w| w.uri.clone()),
                title: chunk.web.as_ref().and_then(|w| w.title.clone()),
            })
            .collect();

        Ok(FollowUpInfo { text, sources })
    }
}
