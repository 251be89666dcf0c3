//! Event types for the Find My Spot event system
//!
//! Provides the SpotEvent enum and the EventBus used to push controller
//! state changes to connected browsers over SSE.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Controller state-change events
///
/// Every controller transition emits exactly one of these. Browsers treat any
/// event as "re-fetch the view"; the payload is for logging and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SpotEvent {
    /// Image accepted, analysis request in flight
    AnalysisStarted {
        analysis_id: Uuid,
        media_type: String,
        size_bytes: usize,
        timestamp: DateTime<Utc>,
    },

    /// Analysis result stored
    AnalysisCompleted {
        analysis_id: Uuid,
        match_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Analysis failed; the view shows the fixed error message
    AnalysisFailed {
        analysis_id: Uuid,
        /// Diagnostic detail (not shown to the user)
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Primary state returned to Idle
    StateReset { timestamp: DateTime<Utc> },

    /// Follow-up overlay opened in its loading sub-state
    OverlayOpened {
        request_id: Uuid,
        title: String,
        timestamp: DateTime<Utc>,
    },

    /// Follow-up overlay content arrived (real or fallback)
    OverlayFilled {
        request_id: Uuid,
        source_count: usize,
        fallback: bool,
        timestamp: DateTime<Utc>,
    },

    /// Follow-up overlay dismissed
    OverlayClosed { timestamp: DateTime<Utc> },
}

impl SpotEvent {
    /// SSE event name
    pub fn event_type(&self) -> &'static str {
        match self {
            SpotEvent::AnalysisStarted { .. } => "AnalysisStarted",
            SpotEvent::AnalysisCompleted { .. } => "AnalysisCompleted",
            SpotEvent::AnalysisFailed { .. } => "AnalysisFailed",
            SpotEvent::StateReset { .. } => "StateReset",
            SpotEvent::OverlayOpened { .. } => "OverlayOpened",
            SpotEvent::OverlayFilled { .. } => "OverlayFilled",
            SpotEvent::OverlayClosed { .. } => "OverlayClosed",
        }
    }
}

/// Broadcast bus for SpotEvents
///
/// Cloning is cheap; all clones share the same channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SpotEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before lagging receivers drop old events
    ///
    /// # Examples
    ///
    /// ```
    /// use fms_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// assert_eq!(event_bus.capacity(), 100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<SpotEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: SpotEvent) -> Result<usize, broadcast::error::SendError<SpotEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// State changes are always safe to drop: a browser that connects later
    /// fetches the current view anyway.
    pub fn emit_lossy(&self, event: SpotEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
