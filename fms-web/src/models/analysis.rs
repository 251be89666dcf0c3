//! Analysis records produced by the model gateway

use serde::{Deserialize, Serialize};

/// Number of candidate locations in every analysis
pub const MATCH_COUNT: usize = 5;

const PLACEHOLDER_IMAGE_BASE: &str = "https://picsum.photos/seed";

/// Illustrative "satellite" image for a coordinate pair
///
/// Not a real imagery lookup. The seed is the two coordinates in shortest
/// round-trip decimal form, so the same pair always yields the same URL.
pub fn placeholder_image_url(latitude: f64, longitude: f64) -> String {
    format!(
        "{}/{}{}/600/400",
        PLACEHOLDER_IMAGE_BASE, latitude, longitude
    )
}

/// One candidate location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub region_name: String,
    pub country: String,
    /// Decimal degrees, -90..=90
    pub latitude: f64,
    /// Decimal degrees, -180..=180
    pub longitude: f64,
    pub description: String,
    /// Conventionally 0.0..=1.0; not enforced
    pub similarity_score: f64,
    pub satellite_image_url: String,
}

impl MatchResult {
    /// Display label, e.g. "Banff, Canada"
    pub fn label(&self) -> String {
        format!("{}, {}", self.region_name, self.country)
    }
}

/// Summary plus exactly [`MATCH_COUNT`] ranked matches
///
/// Index 0 is the top match. Score ordering is not verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub matches: Vec<MatchResult>,
}

impl AnalysisResult {
    pub fn top_match(&self) -> Option<&MatchResult> {
        self.matches.first()
    }
}

/// Web citation attached to a follow-up answer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: Option<String>,
    pub title: Option<String>,
}

impl GroundingSource {
    /// `(href, text)` for rendering, or None when there is no usable URI
    pub fn link(&self) -> Option<(&str, &str)> {
        let uri = self.uri.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        let text = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(uri);
        Some((uri, text))
    }
}

/// Follow-up text shown in the overlay
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FollowUpInfo {
    pub text: String,
    pub sources: Vec<GroundingSource>,
}

impl FollowUpInfo {
    pub const FALLBACK_TEXT: &'static str = "Could not fetch more information.";

    /// Content shown when the follow-up call fails
    pub fn fallback() -> Self {
        Self {
            text: Self::FALLBACK_TEXT.to_string(),
            sources: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_url_is_stable() {
        let a = placeholder_image_url(51.1784, -115.5708);
        let b = placeholder_image_url(51.1784, -115.5708);
        assert_eq!(a, b);
        assert_eq!(a, "https://picsum.photos/seed/51.1784-115.5708/600/400");
    }

    #[test]
    fn test_placeholder_url_formats_whole_degrees_without_fraction() {
        assert_eq!(
            placeholder_image_url(45.0, 7.0),
            "https://picsum.photos/seed/457/600/400"
        );
    }

    #[test]
    fn test_placeholder_url_differs_by_coordinates() {
        assert_ne!(
            placeholder_image_url(46.5, 8.0),
            placeholder_image_url(46.5, 8.1)
        );
    }

    #[test]
    fn test_grounding_link_falls_back_to_uri() {
        let source = GroundingSource {
            uri: Some("https://example.org/banff".to_string()),
            title: None,
        };
        assert_eq!(
            source.link(),
            Some(("https://example.org/banff", "https://example.org/banff"))
        );

        let titled = GroundingSource {
            uri: Some("https://example.org/banff".to_string()),
            title: Some("Banff".to_string()),
        };
        assert_eq!(titled.link(), Some(("https://example.org/banff", "Banff")));
    }

    #[test]
    fn test_grounding_without_uri_has_no_link() {
        let source = GroundingSource {
            uri: Some("  ".to_string()),
            title: Some("Orphan".to_string()),
        };
        assert_eq!(source.link(), None);
        assert_eq!(GroundingSource::default().link(), None);
    }

    #[test]
    fn test_match_label() {
        let m = MatchResult {
            region_name: "Banff".to_string(),
            country: "Canada".to_string(),
            latitude: 51.1784,
            longitude: -115.5708,
            description: "Rockies".to_string(),
            similarity_score: 0.97,
            satellite_image_url: placeholder_image_url(51.1784, -115.5708),
        };
        assert_eq!(m.label(), "Banff, Canada");
    }
}
