//! Swing phases and the markers recorded at each transition

use serde::{Deserialize, Serialize};

/// Ordered, cyclic phases of a golf swing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SwingPhase {
    Setup,
    Takeaway,
    Backswing,
    TopOfSwing,
    Downswing,
    Impact,
    FollowThrough,
    Finish,
}

impl SwingPhase {
    pub fn name(&self) -> &'static str {
        match self {
            SwingPhase::Setup => "setup",
            SwingPhase::Takeaway => "takeaway",
            SwingPhase::Backswing => "backswing",
            SwingPhase::TopOfSwing => "topOfSwing",
            SwingPhase::Downswing => "downswing",
            SwingPhase::Impact => "impact",
            SwingPhase::FollowThrough => "followThrough",
            SwingPhase::Finish => "finish",
        }
    }

    /// The phase that follows this one in a normal swing
    pub fn next(&self) -> SwingPhase {
        match self {
            SwingPhase::Setup => SwingPhase::Takeaway,
            SwingPhase::Takeaway => SwingPhase::Backswing,
            SwingPhase::Backswing => SwingPhase::TopOfSwing,
            SwingPhase::TopOfSwing => SwingPhase::Downswing,
            SwingPhase::Downswing => SwingPhase::Impact,
            SwingPhase::Impact => SwingPhase::FollowThrough,
            SwingPhase::FollowThrough => SwingPhase::Finish,
            SwingPhase::Finish => SwingPhase::Setup,
        }
    }

    /// Phases that belong to a swing still in progress (and can time out)
    pub fn is_in_motion(&self) -> bool {
        !matches!(self, SwingPhase::Setup | SwingPhase::Finish)
    }
}

impl std::fmt::Display for SwingPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Record of one phase transition
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwingPhaseMarker {
    /// Phase that was entered
    pub phase: SwingPhase,
    pub timestamp: f64,
    pub frame_index: u64,
    pub confidence: f32,
}

/// Timestamp of the first marker for `phase`
pub fn marker_time(history: &[SwingPhaseMarker], phase: SwingPhase) -> Option<f64> {
    history.iter().find(|m| m.phase == phase).map(|m| m.timestamp)
}
