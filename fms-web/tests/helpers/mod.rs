//! Shared test fixtures: a scriptable [`ModelGateway`] and sample records

#![allow(dead_code)]

use async_trait::async_trait;
use fms_web::models::{
    placeholder_image_url, AnalysisResult, FollowUpInfo, GroundingSource, MatchResult,
    UploadedImage,
};
use fms_web::services::{GatewayError, GeminiError, ModelGateway};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// What the mock does on its next call
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Ok(T),
    NetworkError,
    ConfigError,
}

impl<T: Clone> Outcome<T> {
    fn produce(&self) -> Result<T, GatewayError> {
        match self {
            Outcome::Ok(value) => Ok(value.clone()),
            Outcome::NetworkError => Err(GatewayError::Model(GeminiError::NetworkError(
                "connection reset".to_string(),
            ))),
            Outcome::ConfigError => Err(GatewayError::Config(
                "GEMINI_API_KEY not set".to_string(),
            )),
        }
    }
}

/// Scriptable gateway that counts calls
///
/// When gated, each call waits for one [`MockGateway::release`].
pub struct MockGateway {
    analyze_outcome: Mutex<Outcome<AnalysisResult>>,
    more_info_outcome: Mutex<Outcome<FollowUpInfo>>,
    pub analyze_calls: AtomicUsize,
    pub more_info_calls: AtomicUsize,
    pub labels: Mutex<Vec<String>>,
    gate: Option<Notify>,
}

impl MockGateway {
    pub fn new(analyze: Outcome<AnalysisResult>, more_info: Outcome<FollowUpInfo>) -> Self {
        Self {
            analyze_outcome: Mutex::new(analyze),
            more_info_outcome: Mutex::new(more_info),
            analyze_calls: AtomicUsize::new(0),
            more_info_calls: AtomicUsize::new(0),
            labels: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Gateway that answers with the Alps result and Banff info
    pub fn succeeding() -> Self {
        Self::new(Outcome::Ok(alps_result()), Outcome::Ok(banff_info()))
    }

    pub fn gated(mut self) -> Self {
        self.gate = Some(Notify::new());
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Let one gated call proceed
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn set_analyze(&self, outcome: Outcome<AnalysisResult>) {
        *self.analyze_outcome.lock().unwrap() = outcome;
    }

    pub fn set_more_info(&self, outcome: Outcome<FollowUpInfo>) {
        *self.more_info_outcome.lock().unwrap() = outcome;
    }

    pub fn analyze_count(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn more_info_count(&self) -> usize {
        self.more_info_calls.load(Ordering::SeqCst)
    }

    async fn wait_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl ModelGateway for MockGateway {
    async fn analyze(&self, _image: &UploadedImage) -> Result<AnalysisResult, GatewayError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.analyze_outcome.lock().unwrap().clone();
        self.wait_gate().await;
        outcome.produce()
    }

    async fn more_info(&self, location_label: &str) -> Result<FollowUpInfo, GatewayError> {
        self.more_info_calls.fetch_add(1, Ordering::SeqCst);
        self.labels.lock().unwrap().push(location_label.to_string());
        let outcome = self.more_info_outcome.lock().unwrap().clone();
        self.wait_gate().await;
        outcome.produce()
    }
}

pub fn sample_match(region_name: &str, country: &str, lat: f64, lon: f64, score: f64) -> MatchResult {
    MatchResult {
        region_name: region_name.to_string(),
        country: country.to_string(),
        latitude: lat,
        longitude: lon,
        description: format!("Mountain scenery around {}", region_name),
        similarity_score: score,
        satellite_image_url: placeholder_image_url(lat, lon),
    }
}

pub fn alps_result() -> AnalysisResult {
    AnalysisResult {
        summary: "Looks like the Alps".to_string(),
        matches: vec![
            sample_match("Banff", "Canada", 51.1784, -115.5708, 0.97),
            sample_match("Zermatt", "Switzerland", 46.0207, 7.7491, 0.95),
            sample_match("Chamonix", "France", 45.9237, 6.8694, 0.93),
            sample_match("Dolomites", "Italy", 46.4102, 11.8440, 0.91),
            sample_match("Hallstatt", "Austria", 47.5622, 13.6493, 0.88),
        ],
    }
}

pub fn banff_info() -> FollowUpInfo {
    FollowUpInfo {
        text: "Banff is Canada's oldest national park.".to_string(),
        sources: vec![GroundingSource {
            uri: Some("https://example.org/banff".to_string()),
            title: Some("Banff National Park".to_string()),
        }],
    }
}

pub fn jpeg_image() -> UploadedImage {
    UploadedImage::new(vec![0xFFu8, 0xD8, 0xFF, 0xE0], "image/jpeg", Some("photo.jpg".to_string()))
        .unwrap()
}
