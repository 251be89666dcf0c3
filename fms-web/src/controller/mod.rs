//! Application state controller
//!
//! - `state`: the state record and its pure transitions
//! - `spot_controller`: async driver around the record and the model gateway

pub mod spot_controller;
pub mod state;

pub use spot_controller::SpotController;
pub use state::{
    AnalysisTicket, ControllerError, ControllerState, OverlayPhase, OverlayState, OverlayTicket,
    PrimaryPhase, StateView, ANALYSIS_ERROR_MESSAGE,
};
