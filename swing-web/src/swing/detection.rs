//! Swing phase detection
//!
//! State machine driven by one smoothed pose frame per tick. Each phase has
//! its own advance rule (thresholds on shoulder/hip turn, turn velocity and
//! turn stability). A phase that overstays its timeout cancels the whole
//! swing: a stalled motion is a waggle or false start, not a swing.

use std::collections::VecDeque;

use tracing::{debug, info};

use super::phase::{SwingPhase, SwingPhaseMarker};
use crate::config::{PhaseThresholds, PhaseTimeouts, SwingConfig};
use crate::physics::{angular_velocity, is_past_peak, variance};
use crate::pose::PoseFrame;

/// Shoulder-rotation samples kept for the windowed checks
const HISTORY_LEN: usize = 30;

/// Window sizes (samples) of the windowed checks
const PEAK_WINDOW: usize = 10;
const VELOCITY_WINDOW: usize = 5;
const FINISH_WINDOW: usize = 10;
const SETUP_WINDOW: usize = 15;

/// Outcome of a detector tick that changed state
#[derive(Clone, Debug, PartialEq)]
pub enum PhaseTransition {
    /// Normal progression into the next phase
    Advanced {
        from: SwingPhase,
        to: SwingPhase,
        marker: SwingPhaseMarker,
    },
    /// Swing abandoned after `phase` timed out
    Cancelled { phase: SwingPhase, elapsed: f64 },
}

/// Address pose the takeaway is measured against
#[derive(Clone, Copy, Debug)]
struct SetupReference {
    shoulder_rotation: f32,
}

/// Phase state machine for one capture session
pub struct SwingPhaseDetector {
    thresholds: PhaseThresholds,
    timeouts: PhaseTimeouts,
    frame_rate: f32,

    phase: SwingPhase,
    phase_entered_at: f64,
    setup_reference: Option<SetupReference>,
    swing_start: Option<f64>,
    shoulder_history: VecDeque<f32>,
    phase_history: Vec<SwingPhaseMarker>,
}

impl SwingPhaseDetector {
    pub fn new(config: &SwingConfig) -> Self {
        Self {
            thresholds: config.thresholds.clone(),
            timeouts: config.timeouts.clone(),
            frame_rate: config.nominal_frame_rate,
            phase: SwingPhase::Setup,
            phase_entered_at: 0.0,
            setup_reference: None,
            swing_start: None,
            shoulder_history: VecDeque::with_capacity(HISTORY_LEN + 1),
            phase_history: Vec::new(),
        }
    }

    pub fn phase(&self) -> SwingPhase {
        self.phase
    }

    /// Markers of the current (or just finished) swing, in order
    pub fn phase_history(&self) -> &[SwingPhaseMarker] {
        &self.phase_history
    }

    /// Timestamp of the takeaway of the swing in progress
    pub fn swing_start(&self) -> Option<f64> {
        self.swing_start
    }

    pub fn setup_reference_rotation(&self) -> Option<f32> {
        self.setup_reference.map(|r| r.shoulder_rotation)
    }

    /// Feed one frame
    ///
    /// `sensor_impact` is the impact timestamp reported by a wrist-worn
    /// motion sensor, if any; it overrides the camera-based impact rule.
    pub fn update(&mut self, frame: &PoseFrame, sensor_impact: Option<f64>) -> Option<PhaseTransition> {
        if let Some(rotation) = frame.shoulder_rotation {
            self.shoulder_history.push_back(rotation);
            if self.shoulder_history.len() > HISTORY_LEN {
                self.shoulder_history.pop_front();
            }
        }

        let t = frame.timestamp;
        let rotation = frame.shoulder_rotation;
        let th = &self.thresholds;

        let advance = match self.phase {
            SwingPhase::Setup => match (self.setup_reference, rotation) {
                (None, Some(rot)) => {
                    if frame.confidence > th.setup_confidence {
                        self.setup_reference = Some(SetupReference { shoulder_rotation: rot });
                        debug!(rotation = rot, "setup reference captured");
                    }
                    false
                }
                (Some(reference), Some(rot)) => (rot - reference.shoulder_rotation).abs() > th.takeaway,
                _ => false,
            },
            SwingPhase::Takeaway => rotation.map_or(false, |rot| rot > th.backswing_start),
            SwingPhase::Backswing => match rotation {
                Some(rot) if rot > th.top_of_swing_min_rotation => self
                    .recent_at_least(PEAK_WINDOW, 3)
                    .map_or(false, |w| is_past_peak(&w)),
                _ => false,
            },
            SwingPhase::TopOfSwing => self
                .recent(VELOCITY_WINDOW)
                .and_then(|w| angular_velocity(&w, self.frame_rate))
                .map_or(false, |v| v > th.downswing_velocity),
            SwingPhase::Downswing => {
                self.sensor_impact_in_swing(sensor_impact, t)
                    || frame.hip_rotation.map_or(false, |hip| hip < th.impact_hip_rotation)
            }
            SwingPhase::Impact => rotation.map_or(false, |rot| rot < th.follow_through),
            SwingPhase::FollowThrough => {
                let elapsed = self.swing_start.map_or(0.0, |start| t - start);
                let stable = self
                    .recent(FINISH_WINDOW)
                    .and_then(|w| variance(&w))
                    .map_or(false, |v| v < th.finish_stability);
                elapsed > th.min_swing_duration && (stable || elapsed > self.timeouts.follow_through_max)
            }
            SwingPhase::Finish => {
                let settled = self
                    .recent(SETUP_WINDOW)
                    .and_then(|w| variance(&w))
                    .map_or(false, |v| v < th.setup_stability);
                match rotation {
                    Some(rot) if frame.confidence > th.setup_confidence && settled => {
                        self.setup_reference = Some(SetupReference { shoulder_rotation: rot });
                        true
                    }
                    _ => false,
                }
            }
        };

        if advance {
            return Some(self.advance(frame));
        }

        let elapsed = t - self.phase_entered_at;
        match self.timeout(self.phase) {
            Some(limit) if elapsed > limit => Some(self.cancel(t, elapsed)),
            _ => None,
        }
    }

    /// A sensor impact counts only between this swing's takeaway and now
    fn sensor_impact_in_swing(&self, sensor_impact: Option<f64>, t: f64) -> bool {
        match (self.swing_start, sensor_impact) {
            (Some(start), Some(impact)) => start <= impact && impact <= t,
            _ => false,
        }
    }

    fn timeout(&self, phase: SwingPhase) -> Option<f64> {
        match phase {
            SwingPhase::Takeaway => Some(self.timeouts.takeaway),
            SwingPhase::Backswing => Some(self.timeouts.backswing),
            SwingPhase::TopOfSwing => Some(self.timeouts.top_of_swing),
            SwingPhase::Downswing => Some(self.timeouts.downswing),
            SwingPhase::Impact => Some(self.timeouts.impact),
            // Follow-through is bounded by the hard finish ceiling instead
            SwingPhase::Setup | SwingPhase::FollowThrough | SwingPhase::Finish => None,
        }
    }

    /// Last `n` shoulder-rotation samples, None until `n` are available
    fn recent(&self, n: usize) -> Option<Vec<f32>> {
        self.recent_at_least(n, n)
    }

    /// Up to the last `n` samples, None if fewer than `min` are available
    fn recent_at_least(&self, n: usize, min: usize) -> Option<Vec<f32>> {
        let len = self.shoulder_history.len();
        if len < min {
            return None;
        }
        Some(self.shoulder_history.iter().skip(len.saturating_sub(n)).copied().collect())
    }

    fn advance(&mut self, frame: &PoseFrame) -> PhaseTransition {
        let from = self.phase;
        let to = from.next();

        if from == SwingPhase::Setup {
            self.swing_start = Some(frame.timestamp);
            self.phase_history.clear();
        }

        let marker = SwingPhaseMarker {
            phase: to,
            timestamp: frame.timestamp,
            frame_index: frame.frame_index,
            confidence: frame.confidence,
        };
        self.phase_history.push(marker);
        self.phase = to;
        self.phase_entered_at = frame.timestamp;

        debug!(from = from.name(), to = to.name(), t = frame.timestamp, "swing phase transition");
        PhaseTransition::Advanced { from, to, marker }
    }

    fn cancel(&mut self, t: f64, elapsed: f64) -> PhaseTransition {
        let phase = self.phase;
        info!(phase = phase.name(), elapsed, "swing cancelled after phase timeout");

        self.phase = SwingPhase::Setup;
        self.phase_entered_at = t;
        self.setup_reference = None;
        self.swing_start = None;
        self.phase_history.clear();

        PhaseTransition::Cancelled { phase, elapsed }
    }

    /// Drop any swing in progress and all history (session end)
    pub fn reset(&mut self) {
        self.phase = SwingPhase::Setup;
        self.phase_entered_at = 0.0;
        self.setup_reference = None;
        self.swing_start = None;
        self.shoulder_history.clear();
        self.phase_history.clear();
    }
}

impl Default for SwingPhaseDetector {
    fn default() -> Self {
        Self::new(&SwingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 30.0;

    fn frame(i: u64, shoulder: f32, hip: f32) -> PoseFrame {
        PoseFrame {
            timestamp: i as f64 * DT,
            frame_index: i,
            confidence: 0.9,
            shoulder_rotation: Some(shoulder),
            hip_rotation: Some(hip),
            spine_angle: Some(0.0),
            ..Default::default()
        }
    }

    fn feed(detector: &mut SwingPhaseDetector, frames: &[PoseFrame]) -> Vec<PhaseTransition> {
        frames.iter().filter_map(|f| detector.update(f, None)).collect()
    }

    #[test]
    fn test_captures_reference_only_when_confident() {
        let mut detector = SwingPhaseDetector::default();
        let mut low = frame(0, 0.0, 0.0);
        low.confidence = 0.5;
        assert!(detector.update(&low, None).is_none());
        assert!(detector.setup_reference_rotation().is_none());

        assert!(detector.update(&frame(1, 2.0, 0.0), None).is_none());
        assert_eq!(detector.setup_reference_rotation(), Some(2.0));
    }

    #[test]
    fn test_small_waggle_stays_in_setup() {
        let mut detector = SwingPhaseDetector::default();
        let frames: Vec<_> = (0..60).map(|i| frame(i, if i % 2 == 0 { 0.0 } else { 4.0 }, 0.0)).collect();
        assert!(feed(&mut detector, &frames).is_empty());
        assert_eq!(detector.phase(), SwingPhase::Setup);
    }

    #[test]
    fn test_takeaway_marks_swing_start() {
        let mut detector = SwingPhaseDetector::default();
        detector.update(&frame(0, 0.0, 0.0), None);
        let transition = detector.update(&frame(1, 6.0, 0.0), None).unwrap();
        match transition {
            PhaseTransition::Advanced { from, to, marker } => {
                assert_eq!(from, SwingPhase::Setup);
                assert_eq!(to, SwingPhase::Takeaway);
                assert_eq!(marker.frame_index, 1);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(detector.swing_start(), Some(DT));
        assert_eq!(detector.phase_history().len(), 1);
    }

    #[test]
    fn test_takeaway_times_out() {
        let mut detector = SwingPhaseDetector::default();
        detector.update(&frame(0, 0.0, 0.0), None);
        detector.update(&frame(1, 8.0, 0.0), None);
        assert_eq!(detector.phase(), SwingPhase::Takeaway);

        let frames: Vec<_> = (2..45).map(|i| frame(i, 10.0, 0.0)).collect();
        let transitions = feed(&mut detector, &frames);
        assert_eq!(transitions.len(), 1);
        assert!(matches!(
            transitions[0],
            PhaseTransition::Cancelled { phase: SwingPhase::Takeaway, .. }
        ));
        assert_eq!(detector.phase(), SwingPhase::Setup);
        assert!(detector.phase_history().is_empty());
        assert!(detector.swing_start().is_none());
    }

    #[test]
    fn test_sensor_impact_overrides_hip_rule() {
        let mut detector = SwingPhaseDetector::default();
        let mut i = 0;
        let mut rotations: Vec<f32> = (0..=30).map(|k| k as f32 * 3.0).collect();
        rotations.extend([80.0, 70.0, 60.0]);
        for rot in rotations {
            detector.update(&frame(i, rot, 45.0), None);
            i += 1;
        }
        assert_eq!(detector.phase(), SwingPhase::Downswing);

        // Hips still open, but the wrist sensor saw impact
        let transition = detector.update(&frame(i, 50.0, 45.0), Some(i as f64 * DT));
        assert!(matches!(
            transition,
            Some(PhaseTransition::Advanced { to: SwingPhase::Impact, .. })
        ));
    }

    #[test]
    fn test_sensor_impact_outside_swing_is_ignored() {
        let mut detector = SwingPhaseDetector::default();
        let mut rotations: Vec<f32> = (0..=30).map(|k| k as f32 * 3.0).collect();
        rotations.extend([80.0, 70.0, 60.0]);
        for (i, rot) in rotations.into_iter().enumerate() {
            detector.update(&frame(i as u64, rot, 45.0), None);
        }
        assert_eq!(detector.phase(), SwingPhase::Downswing);
        let start = detector.swing_start().unwrap();

        // Before takeaway: belongs to an earlier swing
        assert!(detector.update(&frame(34, 50.0, 45.0), Some(start - 1.0)).is_none());
        // Not reached yet
        assert!(detector.update(&frame(35, 45.0, 45.0), Some(10.0)).is_none());
        assert_eq!(detector.phase(), SwingPhase::Downswing);

        let transition = detector.update(&frame(36, 40.0, 45.0), Some(35.0 * DT));
        assert!(matches!(
            transition,
            Some(PhaseTransition::Advanced { to: SwingPhase::Impact, .. })
        ));
    }

    #[test]
    fn test_reset_returns_to_initial_state() {
        let mut detector = SwingPhaseDetector::default();
        detector.update(&frame(0, 0.0, 0.0), None);
        detector.update(&frame(1, 10.0, 0.0), None);
        detector.reset();
        assert_eq!(detector.phase(), SwingPhase::Setup);
        assert!(detector.setup_reference_rotation().is_none());
        assert!(detector.phase_history().is_empty());
    }
}
