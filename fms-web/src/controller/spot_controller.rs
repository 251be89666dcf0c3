//! Application state controller
//!
//! Owns the [`ControllerState`] record, drives the [`ModelGateway`] and emits
//! one [`SpotEvent`] per applied transition. The write lock is held only
//! while a transition is applied, never across a gateway call.

use chrono::Utc;
use fms_common::events::{EventBus, SpotEvent};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::state::{
    AnalysisTicket, ControllerError, ControllerState, OverlayPhase, OverlayTicket, PrimaryPhase,
};
use crate::models::{FollowUpInfo, MatchResult, UploadedImage};
use crate::services::ModelGateway;

/// Single controller for the one-user UI
#[derive(Clone)]
pub struct SpotController {
    gateway: Arc<dyn ModelGateway>,
    state: Arc<RwLock<ControllerState>>,
    event_bus: EventBus,
    /// Most recent gateway failure, for `/health`
    last_error: Arc<RwLock<Option<String>>>,
}

impl SpotController {
    pub fn new(gateway: Arc<dyn ModelGateway>, event_bus: EventBus) -> Self {
        Self {
            gateway,
            state: Arc::new(RwLock::new(ControllerState::default())),
            event_bus,
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Copy of the current state (image bytes are shared, not copied)
    pub async fn snapshot(&self) -> ControllerState {
        self.state.read().await.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    async fn record_error(&self, message: String) {
        *self.last_error.write().await = Some(message);
    }

    // ========================================================================
    // Analysis flow
    // ========================================================================

    /// Accept an image and enter LOADING
    ///
    /// Returns the ticket to pass to [`run_analysis`](Self::run_analysis).
    pub async fn submit_image(&self, image: UploadedImage) -> Result<AnalysisTicket, ControllerError> {
        let ticket = self.state.write().await.begin_analysis(image)?;

        info!(
            analysis_id = %ticket.analysis_id,
            media_type = ticket.image.media_type.as_mime(),
            size_bytes = ticket.image.size_bytes(),
            file_name = ?ticket.image.file_name,
            "Image submitted for analysis"
        );

        self.event_bus.emit_lossy(SpotEvent::AnalysisStarted {
            analysis_id: ticket.analysis_id,
            media_type: ticket.image.media_type.as_mime().to_string(),
            size_bytes: ticket.image.size_bytes(),
            timestamp: Utc::now(),
        });

        Ok(ticket)
    }

    /// Call the gateway and apply the outcome
    ///
    /// Returns the primary phase afterwards. A stale outcome (reset or new
    /// upload in the meantime) leaves the state untouched.
    pub async fn run_analysis(&self, ticket: AnalysisTicket) -> PrimaryPhase {
        let analysis_id = ticket.analysis_id;
        let outcome = self.gateway.analyze(&ticket.image).await;

        let failure = match &outcome {
            Ok(_) => None,
            Err(e) => {
                error!(analysis_id = %analysis_id, error = %e, "Image analysis failed");
                Some(e.to_string())
            }
        };
        if let Some(message) = &failure {
            self.record_error(message.clone()).await;
        }

        let match_count = outcome.as_ref().map(|r| r.matches.len()).unwrap_or(0);

        let mut state = self.state.write().await;
        let applied = state.complete_analysis(analysis_id, outcome.map_err(|_| ()));
        let phase = state.phase;
        drop(state);

        if !applied {
            debug!(analysis_id = %analysis_id, "Discarding stale analysis outcome");
            return phase;
        }

        let event = match failure {
            None => {
                info!(analysis_id = %analysis_id, match_count, "Analysis results stored");
                SpotEvent::AnalysisCompleted {
                    analysis_id,
                    match_count,
                    timestamp: Utc::now(),
                }
            }
            Some(reason) => SpotEvent::AnalysisFailed {
                analysis_id,
                reason,
                timestamp: Utc::now(),
            },
        };
        self.event_bus.emit_lossy(event);

        phase
    }

    /// Submit and run to completion
    pub async fn analyze_image(&self, image: UploadedImage) -> Result<PrimaryPhase, ControllerError> {
        let ticket = self.submit_image(image).await?;
        Ok(self.run_analysis(ticket).await)
    }

    /// Return to IDLE from any phase
    pub async fn reset(&self) {
        self.state.write().await.reset();
        info!("Controller reset to idle");
        self.event_bus.emit_lossy(SpotEvent::StateReset {
            timestamp: Utc::now(),
        });
    }

    /// Match at `index` of the current result
    pub async fn match_at(&self, index: usize) -> Result<MatchResult, ControllerError> {
        let state = self.state.read().await;
        let result = state.result.as_ref().ok_or(ControllerError::NoResult)?;
        result
            .matches
            .get(index)
            .cloned()
            .ok_or(ControllerError::NoSuchMatch(index))
    }

    // ========================================================================
    // Follow-up overlay flow
    // ========================================================================

    /// Open the overlay in LOADING_INFO for `location`
    pub async fn request_more_info(&self, location: &MatchResult) -> OverlayTicket {
        let ticket = self.state.write().await.open_overlay(location.label());

        info!(request_id = %ticket.request_id, location = %ticket.label, "Overlay opened");

        self.event_bus.emit_lossy(SpotEvent::OverlayOpened {
            request_id: ticket.request_id,
            title: ticket.label.clone(),
            timestamp: Utc::now(),
        });

        ticket
    }

    /// Call the gateway and fill the overlay
    ///
    /// Failures of any class become the fallback text. Returns the overlay
    /// phase afterwards.
    pub async fn run_more_info(&self, ticket: OverlayTicket) -> OverlayPhase {
        let (info, fallback) = match self.gateway.more_info(&ticket.label).await {
            Ok(info) => (info, false),
            Err(e) => {
                warn!(
                    request_id = %ticket.request_id,
                    location = %ticket.label,
                    error = %e,
                    "Follow-up info failed, showing fallback"
                );
                self.record_error(e.to_string()).await;
                (FollowUpInfo::fallback(), true)
            }
        };
        let source_count = info.sources.len();

        let mut state = self.state.write().await;
        let applied = state.fill_overlay(ticket.request_id, info);
        let phase = state.overlay.phase;
        drop(state);

        if applied {
            self.event_bus.emit_lossy(SpotEvent::OverlayFilled {
                request_id: ticket.request_id,
                source_count,
                fallback,
                timestamp: Utc::now(),
            });
        } else {
            debug!(request_id = %ticket.request_id, "Discarding stale follow-up response");
        }

        phase
    }

    /// Open and run to completion
    pub async fn show_more_info(&self, location: &MatchResult) -> OverlayPhase {
        let ticket = self.request_more_info(location).await;
        self.run_more_info(ticket).await
    }

    /// Close the overlay; an in-flight request is left to finish and be discarded
    pub async fn close_overlay(&self) {
        self.state.write().await.close_overlay();
        debug!("Overlay closed");
        self.event_bus.emit_lossy(SpotEvent::OverlayClosed {
            timestamp: Utc::now(),
        });
    }
}
