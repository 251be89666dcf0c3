//! Analysis response validation and normalization
//!
//! The model's JSON is an external contract. Policy:
//! - missing/mistyped fields → error
//! - fewer than five matches → error
//! - more than five → first five kept
//! - non-finite or out-of-range coordinates → error
//! - non-finite score → error; finite scores outside 0..=1 are kept

use serde::Deserialize;
use tracing::warn;

use crate::models::{placeholder_image_url, AnalysisResult, MatchResult, MATCH_COUNT};
use crate::services::GatewayError;

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    summary: String,
    matches: Vec<RawMatch>,
}

#[derive(Debug, Deserialize)]
struct RawMatch {
    region_name: String,
    country: String,
    latitude: f64,
    longitude: f64,
    description: String,
    similarity_score: f64,
}

/// Parse the model's raw JSON text into an [`AnalysisResult`]
pub fn parse_analysis(raw_text: &str) -> Result<AnalysisResult, GatewayError> {
    let raw: RawAnalysis = serde_json::from_str(raw_text.trim())?;

    if raw.matches.len() < MATCH_COUNT {
        return Err(GatewayError::InvalidResponse(format!(
            "expected {} matches, model returned {}",
            MATCH_COUNT,
            raw.matches.len()
        )));
    }

    if raw.matches.len() > MATCH_COUNT {
        warn!(
            returned = raw.matches.len(),
            kept = MATCH_COUNT,
            "Model returned extra matches, truncating"
        );
    }

    let matches = raw
        .matches
        .into_iter()
        .take(MATCH_COUNT)
        .enumerate()
        .map(|(index, m)| validate_match(index, m))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AnalysisResult {
        summary: raw.summary.trim().to_string(),
        matches,
    })
}

fn validate_match(index: usize, raw: RawMatch) -> Result<MatchResult, GatewayError> {
    let invalid = |what: &str| {
        GatewayError::InvalidResponse(format!("match {}: {}", index, what))
    };

    if !raw.latitude.is_finite() || !(-90.0..=90.0).contains(&raw.latitude) {
        return Err(invalid(&format!("latitude {} out of range", raw.latitude)));
    }
    if !raw.longitude.is_finite() || !(-180.0..=180.0).contains(&raw.longitude) {
        return Err(invalid(&format!("longitude {} out of range", raw.longitude)));
    }
    if !raw.similarity_score.is_finite() {
        return Err(invalid("similarity score is not a finite number"));
    }
    if !(0.0..=1.0).contains(&raw.similarity_score) {
        warn!(
            index,
            score = raw.similarity_score,
            "Similarity score outside 0..=1, keeping as-is"
        );
    }

    Ok(MatchResult {
        satellite_image_url: placeholder_image_url(raw.latitude, raw.longitude),
        region_name: raw.region_name,
        country: raw.country,
        latitude: raw.latitude,
        longitude: raw.longitude,
        description: raw.description,
        similarity_score: raw.similarity_score,
    })
}
