//! Controller state record and its transitions
//!
//! Primary: IDLE → LOADING → RESULTS | ERROR. Overlay: CLOSED / LOADING_INFO /
//! SHOWING_INFO, independent of the primary phase.
//!
//! Every in-flight call carries a ticket id; a completion whose id no longer
//! matches the record is stale and ignored.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AnalysisResult, FollowUpInfo, ImageMediaType, UploadError, UploadedImage};

/// User-facing message for any analysis failure
pub const ANALYSIS_ERROR_MESSAGE: &str =
    "Sorry, I couldn't analyze that image. Please try another one.";

/// Controller errors (request rejected, no state change)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error(transparent)]
    InvalidUpload(#[from] UploadError),

    #[error("An analysis is already in progress")]
    Busy,

    #[error("No analysis result is available")]
    NoResult,

    #[error("No match at index {0}")]
    NoSuchMatch(usize),
}

/// Primary UI phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrimaryPhase {
    #[default]
    Idle,
    Loading,
    Results,
    Error,
}

/// Overlay sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverlayPhase {
    #[default]
    Closed,
    LoadingInfo,
    ShowingInfo,
}

/// Handle for one in-flight analysis
#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    pub analysis_id: Uuid,
    pub image: UploadedImage,
}

/// Handle for one in-flight follow-up request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayTicket {
    pub request_id: Uuid,
    /// "Region, Country"
    pub label: String,
}

/// Follow-up overlay slot
#[derive(Debug, Clone, Default)]
pub struct OverlayState {
    pub phase: OverlayPhase,
    pub request_id: Option<Uuid>,
    pub title: String,
    /// None until the request completes
    pub content: Option<FollowUpInfo>,
}

impl OverlayState {
    pub fn is_open(&self) -> bool {
        self.phase != OverlayPhase::Closed
    }
}

/// Single source of truth for the UI
#[derive(Debug, Clone, Default)]
pub struct ControllerState {
    pub phase: PrimaryPhase,
    /// Id of the analysis whose completion may still be applied
    pub analysis_id: Option<Uuid>,
    pub image: Option<UploadedImage>,
    pub result: Option<AnalysisResult>,
    /// Fixed user-facing message while in ERROR
    pub error: Option<String>,
    pub overlay: OverlayState,
}

impl ControllerState {
    /// Store the image and enter LOADING
    ///
    /// Allowed from IDLE, RESULTS and ERROR (implicit reset). Rejected while
    /// LOADING, where the upload surface is disabled.
    pub fn begin_analysis(&mut self, image: UploadedImage) -> Result<AnalysisTicket, ControllerError> {
        if self.phase == PrimaryPhase::Loading {
            return Err(ControllerError::Busy);
        }

        let analysis_id = Uuid::new_v4();
        self.phase = PrimaryPhase::Loading;
        self.analysis_id = Some(analysis_id);
        self.image = Some(image.clone());
        self.result = None;
        self.error = None;

        Ok(AnalysisTicket { analysis_id, image })
    }

    /// Apply an analysis outcome; returns false if the ticket is stale
    pub fn complete_analysis(
        &mut self,
        analysis_id: Uuid,
        outcome: Result<AnalysisResult, ()>,
    ) -> bool {
        if self.phase != PrimaryPhase::Loading || self.analysis_id != Some(analysis_id) {
            return false;
        }

        match outcome {
            Ok(result) => {
                self.phase = PrimaryPhase::Results;
                self.result = Some(result);
                self.error = None;
            }
            Err(()) => {
                self.phase = PrimaryPhase::Error;
                self.result = None;
                self.error = Some(ANALYSIS_ERROR_MESSAGE.to_string());
            }
        }
        true
    }

    /// Back to IDLE, discarding image, result and error
    ///
    /// Also invalidates any in-flight analysis. The overlay is left alone.
    pub fn reset(&mut self) {
        self.phase = PrimaryPhase::Idle;
        self.analysis_id = None;
        self.image = None;
        self.result = None;
        self.error = None;
    }

    /// Open the overlay in LOADING_INFO with an empty content slot
    ///
    /// Reopening replaces the request id, so a response for the previous
    /// label can no longer land.
    pub fn open_overlay(&mut self, label: String) -> OverlayTicket {
        let request_id = Uuid::new_v4();
        self.overlay = OverlayState {
            phase: OverlayPhase::LoadingInfo,
            request_id: Some(request_id),
            title: label.clone(),
            content: None,
        };
        OverlayTicket { request_id, label }
    }

    /// Fill the overlay; returns false if closed or reopened since
    pub fn fill_overlay(&mut self, request_id: Uuid, info: FollowUpInfo) -> bool {
        if self.overlay.phase != OverlayPhase::LoadingInfo
            || self.overlay.request_id != Some(request_id)
        {
            return false;
        }

        self.overlay.phase = OverlayPhase::ShowingInfo;
        self.overlay.content = Some(info);
        true
    }

    /// Close the overlay and clear its content
    pub fn close_overlay(&mut self) {
        self.overlay = OverlayState::default();
    }

    /// Serializable summary for `GET /api/state`
    pub fn view(&self) -> StateView {
        StateView {
            phase: self.phase,
            analysis_id: self.analysis_id,
            image: self.image.as_ref().map(|img| ImageView {
                media_type: img.media_type,
                size_bytes: img.size_bytes(),
                file_name: img.file_name.clone(),
            }),
            result: self.result.clone(),
            error: self.error.clone(),
            overlay: OverlayView {
                phase: self.overlay.phase,
                title: self.overlay.title.clone(),
                content: self.overlay.content.clone(),
            },
        }
    }
}

/// JSON form of [`ControllerState`] (image bytes omitted)
#[derive(Debug, Clone, Serialize)]
pub struct StateView {
    pub phase: PrimaryPhase,
    pub analysis_id: Option<Uuid>,
    pub image: Option<ImageView>,
    pub result: Option<AnalysisResult>,
    pub error: Option<String>,
    pub overlay: OverlayView,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageView {
    pub media_type: ImageMediaType,
    pub size_bytes: usize,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverlayView {
    pub phase: OverlayPhase,
    pub title: String,
    pub content: Option<FollowUpInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{placeholder_image_url, MatchResult};

    fn image() -> UploadedImage {
        UploadedImage::new(vec![1u8, 2, 3], "image/jpeg", Some("photo.jpg".into())).unwrap()
    }

    fn result() -> AnalysisResult {
        AnalysisResult {
            summary: "Looks like the Alps".to_string(),
            matches: (0..5)
                .map(|i| MatchResult {
                    region_name: format!("Region {}", i),
                    country: "Switzerland".to_string(),
                    latitude: 46.0,
                    longitude: 8.0 + i as f64,
                    description: String::new(),
                    similarity_score: 0.9,
                    satellite_image_url: placeholder_image_url(46.0, 8.0 + i as f64),
                })
                .collect(),
        }
    }

    #[test]
    fn test_begin_analysis_enters_loading_and_clears_previous() {
        let mut state = ControllerState {
            phase: PrimaryPhase::Error,
            error: Some(ANALYSIS_ERROR_MESSAGE.to_string()),
            ..Default::default()
        };

        let ticket = state.begin_analysis(image()).unwrap();
        assert_eq!(state.phase, PrimaryPhase::Loading);
        assert_eq!(state.analysis_id, Some(ticket.analysis_id));
        assert!(state.image.is_some());
        assert!(state.error.is_none());
        assert!(state.result.is_none());
    }

    #[test]
    fn test_begin_analysis_rejected_while_loading() {
        let mut state = ControllerState::default();
        state.begin_analysis(image()).unwrap();
        assert_eq!(state.begin_analysis(image()).unwrap_err(), ControllerError::Busy);
    }

    #[test]
    fn test_complete_analysis_success_and_failure() {
        let mut state = ControllerState::default();
        let ticket = state.begin_analysis(image()).unwrap();
        assert!(state.complete_analysis(ticket.analysis_id, Ok(result())));
        assert_eq!(state.phase, PrimaryPhase::Results);
        assert_eq!(state.result.as_ref().unwrap().matches.len(), 5);

        let ticket = state.begin_analysis(image()).unwrap();
        assert!(state.result.is_none());
        assert!(state.complete_analysis(ticket.analysis_id, Err(())));
        assert_eq!(state.phase, PrimaryPhase::Error);
        assert_eq!(state.error.as_deref(), Some(ANALYSIS_ERROR_MESSAGE));
        assert!(state.result.is_none());
    }

    #[test]
    fn test_completion_after_reset_is_discarded() {
        let mut state = ControllerState::default();
        let ticket = state.begin_analysis(image()).unwrap();
        state.reset();

        assert!(!state.complete_analysis(ticket.analysis_id, Ok(result())));
        assert_eq!(state.phase, PrimaryPhase::Idle);
        assert!(state.result.is_none());
    }

    #[test]
    fn test_completion_for_superseded_upload_is_discarded() {
        let mut state = ControllerState::default();
        let first = state.begin_analysis(image()).unwrap();
        state.reset();
        let second = state.begin_analysis(image()).unwrap();

        assert!(!state.complete_analysis(first.analysis_id, Err(())));
        assert_eq!(state.phase, PrimaryPhase::Loading);
        assert!(state.complete_analysis(second.analysis_id, Ok(result())));
        assert_eq!(state.phase, PrimaryPhase::Results);
    }

    #[test]
    fn test_reset_clears_everything_from_any_phase() {
        for phase in [
            PrimaryPhase::Idle,
            PrimaryPhase::Loading,
            PrimaryPhase::Results,
            PrimaryPhase::Error,
        ] {
            let mut state = ControllerState {
                phase,
                analysis_id: Some(Uuid::new_v4()),
                image: Some(image()),
                result: Some(result()),
                error: Some("x".to_string()),
                overlay: OverlayState::default(),
            };
            state.reset();
            assert_eq!(state.phase, PrimaryPhase::Idle);
            assert!(state.analysis_id.is_none());
            assert!(state.image.is_none());
            assert!(state.result.is_none());
            assert!(state.error.is_none());
        }
    }

    #[test]
    fn test_overlay_open_fill_close() {
        let mut state = ControllerState::default();
        let ticket = state.open_overlay("Banff, Canada".to_string());
        assert_eq!(state.overlay.phase, OverlayPhase::LoadingInfo);
        assert_eq!(state.overlay.title, "Banff, Canada");
        assert!(state.overlay.content.is_none());

        let info = FollowUpInfo {
            text: "Banff sits in the Rockies.".to_string(),
            sources: Vec::new(),
        };
        assert!(state.fill_overlay(ticket.request_id, info.clone()));
        assert_eq!(state.overlay.phase, OverlayPhase::ShowingInfo);
        assert_eq!(state.overlay.content, Some(info));

        state.close_overlay();
        assert!(!state.overlay.is_open());
        assert!(state.overlay.content.is_none());
    }

    #[test]
    fn test_late_overlay_response_after_close_is_discarded() {
        let mut state = ControllerState::default();
        let ticket = state.open_overlay("Banff, Canada".to_string());
        state.close_overlay();

        assert!(!state.fill_overlay(ticket.request_id, FollowUpInfo::fallback()));
        assert_eq!(state.overlay.phase, OverlayPhase::Closed);
    }

    #[test]
    fn test_reopen_before_completion_never_shows_stale_content() {
        let mut state = ControllerState::default();
        let first = state.open_overlay("Banff, Canada".to_string());
        state.close_overlay();
        let second = state.open_overlay("Zermatt, Switzerland".to_string());

        let stale = FollowUpInfo {
            text: "About Banff".to_string(),
            sources: Vec::new(),
        };
        assert!(!state.fill_overlay(first.request_id, stale));
        assert_eq!(state.overlay.phase, OverlayPhase::LoadingInfo);
        assert!(state.overlay.content.is_none());

        assert!(state.fill_overlay(second.request_id, FollowUpInfo::fallback()));
        assert_eq!(state.overlay.title, "Zermatt, Switzerland");
    }

    #[test]
    fn test_overlay_does_not_touch_primary_phase() {
        let mut state = ControllerState::default();
        let ticket = state.begin_analysis(image()).unwrap();
        state.complete_analysis(ticket.analysis_id, Ok(result()));

        let overlay = state.open_overlay("Region 0, Switzerland".to_string());
        state.fill_overlay(overlay.request_id, FollowUpInfo::fallback());
        state.close_overlay();

        assert_eq!(state.phase, PrimaryPhase::Results);
        assert!(state.result.is_some());
    }

    #[test]
    fn test_view_omits_image_bytes() {
        let mut state = ControllerState::default();
        state.begin_analysis(image()).unwrap();

        let json = serde_json::to_value(state.view()).unwrap();
        assert_eq!(json["phase"], "LOADING");
        assert_eq!(json["image"]["size_bytes"], 3);
        assert_eq!(json["image"]["media_type"], "image/jpeg");
        assert_eq!(json["overlay"]["phase"], "CLOSED");
    }
}
