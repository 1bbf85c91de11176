//! Completed swing record handed to persistence, UI and watch sync

use serde::{Deserialize, Serialize};

use super::metrics::{BodySwingMetrics, CombinedSwingMetrics, SwingFault, WristMotionMetrics};
use super::phase::SwingPhaseMarker;
use crate::pose::PoseFrame;

/// One finished swing with its poses, phase timeline and analysis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwingCapture {
    pub start_time: f64,
    pub end_time: f64,
    pub pose_frames: Vec<PoseFrame>,
    pub phase_history: Vec<SwingPhaseMarker>,
    pub body_metrics: BodySwingMetrics,
    pub combined_metrics: CombinedSwingMetrics,
}

impl SwingCapture {
    /// Analyze a swing slice and package the result
    pub fn analyze(
        start_time: f64,
        end_time: f64,
        pose_frames: Vec<PoseFrame>,
        phase_history: Vec<SwingPhaseMarker>,
        wrist: Option<&WristMotionMetrics>,
        target_tempo: f32,
    ) -> Self {
        let body_metrics = BodySwingMetrics::from_frames(&pose_frames);
        let combined_metrics =
            CombinedSwingMetrics::compute(&body_metrics, &phase_history, wrist, target_tempo);
        Self {
            start_time,
            end_time,
            pose_frames,
            phase_history,
            body_metrics,
            combined_metrics,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn overall_score(&self) -> Option<f32> {
        self.combined_metrics.overall_score
    }

    pub fn primary_fault(&self) -> Option<SwingFault> {
        self.combined_metrics.primary_fault
    }
}
