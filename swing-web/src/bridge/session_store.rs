//! Session store - the single active swing session behind the JS API
//!
//! WASM is single-threaded, so the session lives in a thread_local.
//! Structured data crosses the boundary as JSON strings.

use std::cell::RefCell;

use thiserror::Error;
use wasm_bindgen::prelude::*;

use crate::config::{ConfigError, SwingConfig};
use crate::pose::PoseObservation;
use crate::session::{SwingEvent, SwingSession};
use crate::swing::{SwingCapture, WristMotionMetrics};

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid session config: {0}")]
    Config(#[from] ConfigError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<BridgeError> for JsValue {
    fn from(err: BridgeError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

struct SessionState {
    session: SwingSession,
    /// Most recent finished swing, until JS takes it
    last_capture: Option<SwingCapture>,
    next_frame_index: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            session: SwingSession::default(),
            last_capture: None,
            next_frame_index: 0,
        }
    }
}

thread_local! {
    static SESSION_STATE: RefCell<SessionState> = RefCell::new(SessionState::default());
}

// ============================================================================
// INTERNAL API (called by landmark ingestion)
// ============================================================================

pub(crate) fn next_frame_index() -> u64 {
    SESSION_STATE.with(|state_cell| {
        let mut state = state_cell.borrow_mut();
        let index = state.next_frame_index;
        state.next_frame_index += 1;
        index
    })
}

pub(crate) fn ingest(observation: &PoseObservation) {
    SESSION_STATE.with(|state_cell| {
        let mut state = state_cell.borrow_mut();
        match state.session.process_frame(observation) {
            Some(SwingEvent::SwingCompleted(capture)) => {
                let score = capture
                    .overall_score()
                    .map_or_else(|| "n/a".to_string(), |s| format!("{:.0}", s));
                web_sys::console::log_1(
                    &format!("⛳ Swing captured ({:.2}s, score {})", capture.duration(), score).into(),
                );
                state.last_capture = Some(*capture);
            }
            Some(SwingEvent::SwingCancelled { phase, elapsed }) => {
                web_sys::console::warn_1(
                    &format!("Swing cancelled: {} timed out after {:.2}s", phase, elapsed).into(),
                );
            }
            Some(SwingEvent::PhaseChanged { .. }) | None => {}
        }
    });
}

/// Parse a session config from the JSON handed over by JS
///
/// An empty string means defaults.
pub fn parse_config(config_json: &str) -> Result<SwingConfig, BridgeError> {
    if config_json.trim().is_empty() {
        return Ok(SwingConfig::default());
    }
    Ok(SwingConfig::from_json_str(config_json)?)
}

// ============================================================================
// WASM-BINDGEN ENTRY POINTS
// ============================================================================

/// Start a fresh session, replacing any active one
#[wasm_bindgen]
pub fn start_session(config_json: &str) -> Result<(), JsValue> {
    let config = parse_config(config_json)?;
    SESSION_STATE.with(|state_cell| {
        *state_cell.borrow_mut() = SessionState {
            session: SwingSession::new(config),
            ..SessionState::default()
        };
    });
    web_sys::console::log_1(&"✅ Swing session started".into());
    Ok(())
}

/// Deliver the latest wrist-sensor record (JSON `WristMotionMetrics`)
#[wasm_bindgen]
pub fn set_wrist_metrics(metrics_json: &str) -> Result<(), JsValue> {
    let metrics: WristMotionMetrics =
        serde_json::from_str(metrics_json).map_err(BridgeError::from)?;
    SESSION_STATE.with(|state_cell| {
        state_cell.borrow_mut().session.set_wrist_metrics(metrics);
    });
    Ok(())
}

/// Current phase name, e.g. "topOfSwing"
#[wasm_bindgen]
pub fn get_swing_phase() -> String {
    SESSION_STATE.with(|state_cell| state_cell.borrow().session.phase().name().to_string())
}

/// Overlay numbers for the last processed frame, as JSON
#[wasm_bindgen]
pub fn get_live_view() -> Result<String, JsValue> {
    SESSION_STATE.with(|state_cell| {
        let state = state_cell.borrow();
        serde_json::to_string(state.session.live_view())
            .map_err(|e| BridgeError::from(e).into())
    })
}

/// Hand the most recent capture to JS as JSON; None if no new swing
#[wasm_bindgen]
pub fn take_last_capture() -> Result<Option<String>, JsValue> {
    SESSION_STATE.with(|state_cell| {
        let capture = state_cell.borrow_mut().last_capture.take();
        capture
            .map(|c| serde_json::to_string(&c))
            .transpose()
            .map_err(|e| BridgeError::from(e).into())
    })
}

/// Stop the active session and return its summary as JSON
#[wasm_bindgen]
pub fn end_session() -> Result<String, JsValue> {
    let summary = SESSION_STATE.with(|state_cell| {
        let mut state = state_cell.borrow_mut();
        state.last_capture = None;
        state.next_frame_index = 0;
        state.session.end()
    });
    web_sys::console::log_1(
        &format!(
            "Session ended: {} swings, {} cancelled",
            summary.swings_completed, summary.swings_cancelled
        )
        .into(),
    );
    serde_json::to_string(&summary).map_err(|e| BridgeError::from(e).into())
}

/// The person left the camera view
#[wasm_bindgen]
pub fn notify_tracking_lost() {
    SESSION_STATE.with(|state_cell| state_cell.borrow_mut().session.tracking_lost());
}
