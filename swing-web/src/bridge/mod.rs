//! Bridge module - JS ↔ Rust communication
//!
//! All #[wasm_bindgen] entry points live here.
//! Re-exports only in mod.rs, logic in submodules.

mod landmarks;
mod session_store;

pub use landmarks::{
    // WASM entry points
    update_landmarks,
    update_skeleton_3d,
    // Conversion
    observation_from_mediapipe,
    observation_from_skeleton_3d,
};

pub use session_store::{
    end_session,
    get_live_view,
    get_swing_phase,
    notify_tracking_lost,
    set_wrist_metrics,
    start_session,
    take_last_capture,
    BridgeError,
};
