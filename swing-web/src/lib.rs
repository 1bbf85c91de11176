//! Swing Web - Golf Swing Capture and Analysis
//!
//! Entry point for WASM module. Only contains:
//! - Module declarations
//! - wasm_bindgen entry points that delegate to submodules
//!
//! The analysis core (`physics`, `pose`, `swing`, `session`) has no
//! browser dependencies and is usable from native code and tests.

pub mod config;
pub mod physics;
pub mod pose;
pub mod session;
pub mod swing;

mod bridge;

use wasm_bindgen::prelude::*;

// Re-export wasm_bindgen functions for JS access
pub use bridge::{
    end_session, get_live_view, get_swing_phase, notify_tracking_lost, set_wrist_metrics,
    start_session, take_last_capture, update_landmarks, update_skeleton_3d,
};
pub use bridge::{observation_from_mediapipe, observation_from_skeleton_3d, BridgeError};

pub use config::{ConfigError, SwingConfig};
pub use session::{LiveView, SessionSummary, SwingEvent, SwingSession};

// ============================================================================
// WASM ENTRY POINTS
// ============================================================================

/// Called automatically when WASM module loads
///
/// Also routes `tracing` events from the analysis core to the browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();

    #[cfg(target_arch = "wasm32")]
    tracing_wasm::set_as_global_default();
}

/// Crate version, for display in the web UI
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
