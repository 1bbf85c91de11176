//! Swing metrics and fault analysis
//!
//! Runs once per completed swing over the buffered pose slice, the phase
//! markers, and optionally the wrist-sensor record synced from the watch.
//! Every metric degrades to `None` when its inputs are missing; analysis
//! itself never fails.

use serde::{Deserialize, Serialize};

use super::phase::{marker_time, SwingPhase, SwingPhaseMarker};
use crate::physics::mean;
use crate::pose::{Joint, PoseFrame};

/// Frames averaged for the address spine angle
const SETUP_FRAMES: usize = 5;

/// Maximum spine-angle drift (degrees) that still counts as maintained
const SPINE_TOLERANCE: f32 = 10.0;

/// Nose samples needed before head movement is reported
const MIN_HEAD_SAMPLES: usize = 3;

/// Normalized screen units to inches: ~72in frame height, body fills ~70%
const NORMALIZED_TO_INCHES: f32 = 72.0 * 0.7;

const SWAY_LIMIT_INCHES: f32 = 3.0;
const FLAT_PLANE_X_FACTOR: f32 = 20.0;
const CASTING_TEMPO: f32 = 2.0;
const X_FACTOR_BONUS: f32 = 30.0;
const X_FACTOR_TIP: f32 = 25.0;
const TEMPO_RANGE: (f32, f32) = (2.5, 3.5);
const MAX_SUGGESTIONS: usize = 3;

/// Metrics record synced from the wrist-worn motion sensor
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WristMotionMetrics {
    pub tempo_ratio: Option<f32>,
    /// Seconds
    pub backswing_duration: Option<f64>,
    /// Seconds
    pub downswing_duration: Option<f64>,
    /// Estimated peak club-head speed (mph)
    pub club_speed: Option<f32>,
    /// Strike quality (0-1)
    pub impact_quality: Option<f32>,
    /// Sensor-detected impact time, same clock as pose timestamps
    pub impact_timestamp: Option<f64>,
}

/// Body metrics derived from the pose slice alone (degrees unless noted)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodySwingMetrics {
    pub setup_spine_angle: Option<f32>,
    pub max_shoulder_turn: Option<f32>,
    pub max_hip_turn: Option<f32>,
    /// Shoulder turn minus hip turn
    pub x_factor: Option<f32>,
    pub spine_angle_maintained: Option<bool>,
    /// Nose travel in normalized screen units
    pub head_movement: Option<f32>,
}

impl BodySwingMetrics {
    pub fn from_frames(frames: &[PoseFrame]) -> Self {
        let setup_spines: Vec<f32> = frames
            .iter()
            .take(SETUP_FRAMES)
            .filter_map(|f| f.spine_angle)
            .collect();
        let setup_spine_angle = mean(&setup_spines);

        let max_shoulder_turn = max_of(frames.iter().filter_map(|f| f.shoulder_rotation));
        let max_hip_turn = max_of(frames.iter().filter_map(|f| f.hip_rotation));
        let x_factor = match (max_shoulder_turn, max_hip_turn) {
            (Some(s), Some(h)) => Some(s - h),
            _ => None,
        };

        let spine_angle_maintained = setup_spine_angle.and_then(|setup| {
            max_of(frames.iter().filter_map(|f| f.spine_angle).map(|a| (a - setup).abs()))
                .map(|deviation| deviation < SPINE_TOLERANCE)
        });

        Self {
            setup_spine_angle,
            max_shoulder_turn,
            max_hip_turn,
            x_factor,
            spine_angle_maintained,
            head_movement: head_movement(frames),
        }
    }

    pub fn head_movement_inches(&self) -> Option<f32> {
        self.head_movement.map(|m| m * NORMALIZED_TO_INCHES)
    }
}

fn max_of(values: impl Iterator<Item = f32>) -> Option<f32> {
    values.fold(None, |acc, v| Some(acc.map_or(v, |m: f32| m.max(v))))
}

/// Diagonal of the nose's bounding box over the swing
fn head_movement(frames: &[PoseFrame]) -> Option<f32> {
    let nose: Vec<(f32, f32)> = frames.iter().filter_map(|f| f.joint(Joint::Nose)).collect();
    if nose.len() < MIN_HEAD_SAMPLES {
        return None;
    }
    let range = |values: Vec<f32>| {
        let lo = values.iter().copied().fold(f32::MAX, f32::min);
        let hi = values.iter().copied().fold(f32::MIN, f32::max);
        hi - lo
    };
    let dx = range(nose.iter().map(|p| p.0).collect());
    let dy = range(nose.iter().map(|p| p.1).collect());
    Some((dx * dx + dy * dy).sqrt())
}

/// Primary swing faults in evaluation priority order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SwingFault {
    LossOfPosture,
    Sway,
    FlatShoulderPlane,
    Casting,
}

impl SwingFault {
    pub fn name(&self) -> &'static str {
        match self {
            SwingFault::LossOfPosture => "loss of posture",
            SwingFault::Sway => "sway",
            SwingFault::FlatShoulderPlane => "flat shoulder plane",
            SwingFault::Casting => "casting",
        }
    }

    pub fn tip(&self) -> &'static str {
        match self {
            SwingFault::LossOfPosture => {
                "Keep your spine angle from address through impact - feel your chest stay over the ball."
            }
            SwingFault::Sway => {
                "Turn around your spine instead of sliding - keep your head centered over the ball."
            }
            SwingFault::FlatShoulderPlane => {
                "Turn your shoulders more against stable hips to build separation at the top."
            }
            SwingFault::Casting => {
                "Hold your wrist hinge longer into the downswing - let the hips start the transition."
            }
        }
    }
}

/// First matching fault wins: posture, sway, shoulder plane, casting
pub fn diagnose_fault(body: &BodySwingMetrics, tempo_ratio: Option<f32>) -> Option<SwingFault> {
    if body.spine_angle_maintained == Some(false) {
        return Some(SwingFault::LossOfPosture);
    }
    if body.head_movement_inches().map_or(false, |inches| inches > SWAY_LIMIT_INCHES) {
        return Some(SwingFault::Sway);
    }
    if body.x_factor.map_or(false, |x| x < FLAT_PLANE_X_FACTOR) {
        return Some(SwingFault::FlatShoulderPlane);
    }
    if tempo_ratio.map_or(false, |r| r < CASTING_TEMPO) {
        return Some(SwingFault::Casting);
    }
    None
}

/// Up to three coaching suggestions for a swing
pub fn suggestions(
    fault: Option<SwingFault>,
    tempo_ratio: Option<f32>,
    x_factor: Option<f32>,
) -> Vec<String> {
    let mut tips = Vec::new();
    if let Some(fault) = fault {
        tips.push(fault.tip().to_string());
    }
    if let Some(ratio) = tempo_ratio {
        if ratio < TEMPO_RANGE.0 {
            tips.push(format!(
                "Your tempo is quick ({:.1}:1). Take the club back more slowly and aim for about 3:1.",
                ratio
            ));
        } else if ratio > TEMPO_RANGE.1 {
            tips.push(format!(
                "Your tempo is slow ({:.1}:1). Keep the backswing flowing and aim for about 3:1.",
                ratio
            ));
        }
    }
    if x_factor.map_or(false, |x| x < X_FACTOR_TIP) {
        tips.push("Restrict your hip turn slightly on the backswing to increase shoulder-hip separation.".to_string());
    }
    tips.truncate(MAX_SUGGESTIONS);
    tips
}

/// Tempo score (0-100): 100 at the target ratio, 50 points lost per unit off
pub fn tempo_score(tempo_ratio: f32, target_tempo: f32) -> f32 {
    (100.0 - (tempo_ratio - target_tempo).abs() * 50.0).max(0.0)
}

/// Metrics combining body motion, phase timing and wrist-sensor data
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedSwingMetrics {
    /// Backswing duration / downswing duration
    pub tempo_ratio: Option<f32>,
    pub backswing_duration: Option<f64>,
    pub downswing_duration: Option<f64>,
    pub tempo_score: Option<f32>,
    pub club_speed: Option<f32>,
    pub impact_quality: Option<f32>,
    /// Average of the available component scores (0-100)
    pub overall_score: Option<f32>,
    pub primary_fault: Option<SwingFault>,
    pub suggestions: Vec<String>,
}

impl CombinedSwingMetrics {
    /// Combine body metrics with timing; wrist-sensor values win over phase timestamps
    pub fn compute(
        body: &BodySwingMetrics,
        phase_history: &[SwingPhaseMarker],
        wrist: Option<&WristMotionMetrics>,
        target_tempo: f32,
    ) -> Self {
        // Durations come as a pair: both from the sensor or both from phase markers
        let sensor_durations = wrist.and_then(|w| Some((w.backswing_duration?, w.downswing_duration?)));
        let (backswing_duration, downswing_duration) = match sensor_durations {
            Some((backswing, downswing)) => (Some(backswing), Some(downswing)),
            None => phase_durations(phase_history),
        };

        let tempo_ratio = wrist
            .and_then(|w| w.tempo_ratio)
            .or_else(|| ratio(backswing_duration?, downswing_duration?));

        let tempo_score = tempo_ratio.map(|r| tempo_score(r, target_tempo));
        let impact_quality = wrist.and_then(|w| w.impact_quality);

        let mut components = Vec::new();
        components.extend(tempo_score);
        components.extend(impact_quality.map(|q| q * 100.0));
        if body.spine_angle_maintained == Some(true) {
            components.push(90.0);
        }
        if body.x_factor.map_or(false, |x| x > X_FACTOR_BONUS) {
            components.push(80.0);
        }
        let overall_score = mean(&components);

        let primary_fault = diagnose_fault(body, tempo_ratio);
        let suggestions = suggestions(primary_fault, tempo_ratio, body.x_factor);

        Self {
            tempo_ratio,
            backswing_duration,
            downswing_duration,
            tempo_score,
            club_speed: wrist.and_then(|w| w.club_speed),
            impact_quality,
            overall_score,
            primary_fault,
            suggestions,
        }
    }
}

/// (backswing, downswing) durations from backswing → top → impact markers
fn phase_durations(history: &[SwingPhaseMarker]) -> (Option<f64>, Option<f64>) {
    let backswing = marker_time(history, SwingPhase::Backswing);
    let top = marker_time(history, SwingPhase::TopOfSwing);
    let impact = marker_time(history, SwingPhase::Impact);

    let backswing_duration = match (backswing, top) {
        (Some(b), Some(t)) if t > b => Some(t - b),
        _ => None,
    };
    let downswing_duration = match (top, impact) {
        (Some(t), Some(i)) if i > t => Some(i - t),
        _ => None,
    };
    (backswing_duration, downswing_duration)
}

fn ratio(backswing: f64, downswing: f64) -> Option<f32> {
    if downswing > 0.0 {
        Some((backswing / downswing) as f32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn marker(phase: SwingPhase, timestamp: f64) -> SwingPhaseMarker {
        SwingPhaseMarker {
            phase,
            timestamp,
            frame_index: (timestamp * 30.0) as u64,
            confidence: 0.9,
        }
    }

    fn full_history() -> Vec<SwingPhaseMarker> {
        vec![
            marker(SwingPhase::Takeaway, 0.0),
            marker(SwingPhase::Backswing, 0.2),
            marker(SwingPhase::TopOfSwing, 0.8),
            marker(SwingPhase::Downswing, 0.85),
            marker(SwingPhase::Impact, 1.0),
            marker(SwingPhase::FollowThrough, 1.1),
            marker(SwingPhase::Finish, 1.6),
        ]
    }

    fn frame(i: u64, spine: f32, shoulder: f32, hip: f32, nose: (f32, f32)) -> PoseFrame {
        let mut frame = PoseFrame {
            timestamp: i as f64 / 30.0,
            frame_index: i,
            confidence: 0.9,
            spine_angle: Some(spine),
            shoulder_rotation: Some(shoulder),
            hip_rotation: Some(hip),
            ..Default::default()
        };
        frame.joints.insert(Joint::Nose, nose);
        frame
    }

    #[test]
    fn test_body_metrics() {
        let frames: Vec<_> = (0..20)
            .map(|i| {
                let turn = i as f32 * 4.5;
                frame(i, 30.0 + (i % 3) as f32, turn, turn * 0.5, (0.5 + i as f32 * 0.001, 0.2))
            })
            .collect();
        let body = BodySwingMetrics::from_frames(&frames);

        assert_abs_diff_eq!(body.setup_spine_angle.unwrap(), 30.8, epsilon = 1e-4);
        assert_abs_diff_eq!(body.max_shoulder_turn.unwrap(), 85.5, epsilon = 1e-4);
        assert_abs_diff_eq!(body.max_hip_turn.unwrap(), 42.75, epsilon = 1e-4);
        assert_abs_diff_eq!(body.x_factor.unwrap(), 42.75, epsilon = 1e-4);
        assert_eq!(body.spine_angle_maintained, Some(true));
        assert_abs_diff_eq!(body.head_movement.unwrap(), 0.019, epsilon = 1e-4);
    }

    #[test]
    fn test_lost_spine_angle() {
        let frames: Vec<_> = (0..20)
            .map(|i| frame(i, if i < 10 { 30.0 } else { 45.0 }, 40.0, 20.0, (0.5, 0.2)))
            .collect();
        assert_eq!(BodySwingMetrics::from_frames(&frames).spine_angle_maintained, Some(false));
    }

    #[test]
    fn test_missing_inputs_degrade_to_none() {
        let body = BodySwingMetrics::from_frames(&[]);
        assert_eq!(body, BodySwingMetrics::default());

        let two_frames = [frame(0, 30.0, 0.0, 0.0, (0.5, 0.2)), frame(1, 30.0, 0.0, 0.0, (0.6, 0.2))];
        assert!(BodySwingMetrics::from_frames(&two_frames).head_movement.is_none());

        let combined = CombinedSwingMetrics::compute(&body, &[], None, 3.0);
        assert!(combined.tempo_ratio.is_none());
        assert!(combined.overall_score.is_none());
        assert!(combined.primary_fault.is_none());
        assert!(combined.suggestions.is_empty());
    }

    #[test]
    fn test_tempo_from_phase_markers() {
        let combined = CombinedSwingMetrics::compute(&BodySwingMetrics::default(), &full_history(), None, 3.0);
        assert_abs_diff_eq!(combined.backswing_duration.unwrap(), 0.6, epsilon = 1e-9);
        assert_abs_diff_eq!(combined.downswing_duration.unwrap(), 0.2, epsilon = 1e-9);
        assert_abs_diff_eq!(combined.tempo_ratio.unwrap(), 3.0, epsilon = 1e-4);
        assert_abs_diff_eq!(combined.tempo_score.unwrap(), 100.0, epsilon = 1e-2);
    }

    #[test]
    fn test_sensor_tempo_takes_priority() {
        let wrist = WristMotionMetrics {
            tempo_ratio: Some(2.2),
            impact_quality: Some(0.7),
            club_speed: Some(95.0),
            ..Default::default()
        };
        let combined =
            CombinedSwingMetrics::compute(&BodySwingMetrics::default(), &full_history(), Some(&wrist), 3.0);
        assert_eq!(combined.tempo_ratio, Some(2.2));
        assert_eq!(combined.club_speed, Some(95.0));
        // tempo 60, impact 70
        assert_abs_diff_eq!(combined.overall_score.unwrap(), 65.0, epsilon = 1e-3);
    }

    #[test]
    fn test_partial_sensor_durations_fall_back_to_markers() {
        let wrist = WristMotionMetrics {
            backswing_duration: Some(1.2),
            ..Default::default()
        };
        let combined =
            CombinedSwingMetrics::compute(&BodySwingMetrics::default(), &full_history(), Some(&wrist), 3.0);
        assert_abs_diff_eq!(combined.backswing_duration.unwrap(), 0.6, epsilon = 1e-9);
        assert_abs_diff_eq!(combined.downswing_duration.unwrap(), 0.2, epsilon = 1e-9);
        assert_abs_diff_eq!(combined.tempo_ratio.unwrap(), 3.0, epsilon = 1e-4);

        let wrist = WristMotionMetrics {
            backswing_duration: Some(0.9),
            downswing_duration: Some(0.36),
            ..Default::default()
        };
        let combined =
            CombinedSwingMetrics::compute(&BodySwingMetrics::default(), &full_history(), Some(&wrist), 3.0);
        assert_eq!(combined.backswing_duration, Some(0.9));
        assert_eq!(combined.downswing_duration, Some(0.36));
        assert_abs_diff_eq!(combined.tempo_ratio.unwrap(), 2.5, epsilon = 1e-4);
    }

    #[test]
    fn test_tempo_score() {
        assert_eq!(tempo_score(3.0, 3.0), 100.0);
        assert_abs_diff_eq!(tempo_score(2.0, 3.0), 50.0);
        assert_eq!(tempo_score(6.0, 3.0), 0.0);
    }

    #[test]
    fn test_fault_priority() {
        let body = BodySwingMetrics {
            spine_angle_maintained: Some(false),
            head_movement: Some(5.0 / NORMALIZED_TO_INCHES),
            x_factor: Some(10.0),
            ..Default::default()
        };
        assert_eq!(diagnose_fault(&body, Some(1.5)), Some(SwingFault::LossOfPosture));

        let body = BodySwingMetrics { spine_angle_maintained: Some(true), ..body };
        assert_eq!(diagnose_fault(&body, Some(1.5)), Some(SwingFault::Sway));

        let body = BodySwingMetrics { head_movement: Some(0.01), ..body };
        assert_eq!(diagnose_fault(&body, Some(1.5)), Some(SwingFault::FlatShoulderPlane));

        let body = BodySwingMetrics { x_factor: Some(40.0), ..body };
        assert_eq!(diagnose_fault(&body, Some(1.5)), Some(SwingFault::Casting));
        assert_eq!(diagnose_fault(&body, Some(3.0)), None);
    }

    #[test]
    fn test_suggestions_capped_at_three() {
        let tips = suggestions(Some(SwingFault::Sway), Some(1.2), Some(10.0));
        assert_eq!(tips.len(), 3);
        assert_eq!(tips[0], SwingFault::Sway.tip());
        assert!(tips[1].contains("quick"));

        let tips = suggestions(None, Some(4.0), Some(40.0));
        assert_eq!(tips.len(), 1);
        assert!(tips[0].contains("slow"));
    }
}
