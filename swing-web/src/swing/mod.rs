//! Swing module - phase detection and post-swing analysis
//!
//! Re-exports only. All logic in submodules.

mod phase;
mod detection;
mod metrics;
mod capture;

pub use phase::{marker_time, SwingPhase, SwingPhaseMarker};
pub use detection::{PhaseTransition, SwingPhaseDetector};
pub use metrics::{
    diagnose_fault, suggestions, tempo_score, BodySwingMetrics, CombinedSwingMetrics, SwingFault,
    WristMotionMetrics,
};
pub use capture::SwingCapture;
