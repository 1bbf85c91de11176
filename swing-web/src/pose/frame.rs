//! Pose frames - raw observations and assembled, angle-annotated snapshots
//!
//! A [`PoseObservation`] is what the external pose detector hands over each
//! camera frame. [`PoseFrame::assemble`] turns a (smoothed) observation into
//! the immutable frame the phase detector and analyzer consume.

use serde::{Deserialize, Serialize};

use super::joint::{Joint, Joint3D, JointMap};
use crate::physics::{
    calculate_elbow_angle, hip_rotation, rotation_from_line_3d, shoulder_rotation, spine_angle,
};

/// Which kind of tracker produced a frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PoseSource {
    /// Vision-based 2D keypoint detector
    Camera2D,
    /// Depth-enhanced skeleton tracker with metric 3D joints
    Depth3D,
}

/// Raw per-frame joint detections from a pose detector
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoseObservation {
    /// Capture time in seconds
    pub timestamp: f64,
    pub frame_index: u64,
    /// Overall detection confidence (0-1)
    pub confidence: f32,
    pub joints: JointMap,
    /// Present only when a depth-capable tracker is active
    pub joints_3d: Option<Vec<Joint3D>>,
}

impl PoseObservation {
    pub fn new(timestamp: f64, frame_index: u64, confidence: f32) -> Self {
        Self {
            timestamp,
            frame_index,
            confidence,
            ..Default::default()
        }
    }

    pub fn with_joint(mut self, joint: Joint, position: (f32, f32)) -> Self {
        self.joints.insert(joint, position);
        self
    }

    pub fn with_joints_3d(mut self, joints: Vec<Joint3D>) -> Self {
        self.joints_3d = Some(joints);
        self
    }

    /// True when neither 2D nor 3D joints were detected
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty() && self.joints_3d.as_ref().map_or(true, |j| j.is_empty())
    }
}

/// One timestamped body pose with derived angles (degrees)
///
/// Every derived angle is `None` when one of its joints is missing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    pub timestamp: f64,
    pub frame_index: u64,
    pub confidence: f32,
    pub joints: JointMap,
    pub joints_3d: Option<Vec<Joint3D>>,
    /// Spine tilt from vertical
    pub spine_angle: Option<f32>,
    /// Hip turn away from the camera (0 = square)
    pub hip_rotation: Option<f32>,
    /// Shoulder turn away from the camera (0 = square)
    pub shoulder_rotation: Option<f32>,
    pub left_elbow_angle: Option<f32>,
    pub right_elbow_angle: Option<f32>,
}

impl PoseFrame {
    /// Build a frame from an observation, computing all derived angles
    pub fn assemble(observation: PoseObservation) -> Self {
        let PoseObservation {
            timestamp,
            frame_index,
            confidence,
            mut joints,
            joints_3d,
        } = observation;

        // Depth trackers may report a joint only in 3D; use its screen projection
        if let Some(joints_3d) = &joints_3d {
            for j in joints_3d {
                if joints.get(j.joint).is_none() {
                    joints.insert(j.joint, j.screen);
                }
            }
        }

        let confidence = if joints.is_empty() {
            0.0
        } else if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };

        let mut frame = Self {
            timestamp,
            frame_index,
            confidence,
            joints,
            joints_3d,
            ..Default::default()
        };

        frame.spine_angle = frame.compute_spine_angle();
        frame.hip_rotation = frame.compute_rotation(Joint::LeftHip, Joint::RightHip, hip_rotation);
        frame.shoulder_rotation =
            frame.compute_rotation(Joint::LeftShoulder, Joint::RightShoulder, shoulder_rotation);
        frame.left_elbow_angle =
            frame.compute_elbow(Joint::LeftShoulder, Joint::LeftElbow, Joint::LeftWrist);
        frame.right_elbow_angle =
            frame.compute_elbow(Joint::RightShoulder, Joint::RightElbow, Joint::RightWrist);
        frame
    }

    pub fn joint(&self, joint: Joint) -> Option<(f32, f32)> {
        self.joints.get(joint)
    }

    pub fn joint_3d(&self, joint: Joint) -> Option<&Joint3D> {
        self.joints_3d.as_ref()?.iter().find(|j| j.joint == joint)
    }

    pub fn source(&self) -> PoseSource {
        match &self.joints_3d {
            Some(joints) if !joints.is_empty() => PoseSource::Depth3D,
            _ => PoseSource::Camera2D,
        }
    }

    fn compute_spine_angle(&self) -> Option<f32> {
        Some(spine_angle(
            self.joint(Joint::LeftShoulder)?,
            self.joint(Joint::RightShoulder)?,
            self.joint(Joint::LeftHip)?,
            self.joint(Joint::RightHip)?,
        ))
    }

    /// True 3D angle when both joints have metric positions, 2D foreshortening otherwise
    fn compute_rotation(
        &self,
        left: Joint,
        right: Joint,
        fallback: fn((f32, f32), (f32, f32)) -> f32,
    ) -> Option<f32> {
        if let (Some(l), Some(r)) = (self.joint_3d(left), self.joint_3d(right)) {
            if let Some(angle) = rotation_from_line_3d(&l.position, &r.position) {
                return Some(angle);
            }
        }
        Some(fallback(self.joint(left)?, self.joint(right)?))
    }

    fn compute_elbow(&self, shoulder: Joint, elbow: Joint, wrist: Joint) -> Option<f32> {
        calculate_elbow_angle(self.joint(shoulder)?, self.joint(elbow)?, self.joint(wrist)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;

    fn address_pose() -> PoseObservation {
        PoseObservation::new(0.0, 0, 0.95)
            .with_joint(Joint::Nose, (0.5, 0.2))
            .with_joint(Joint::LeftShoulder, (0.325, 0.35))
            .with_joint(Joint::RightShoulder, (0.675, 0.35))
            .with_joint(Joint::LeftElbow, (0.3, 0.5))
            .with_joint(Joint::RightElbow, (0.7, 0.5))
            .with_joint(Joint::LeftWrist, (0.3, 0.65))
            .with_joint(Joint::RightWrist, (0.7, 0.65))
            .with_joint(Joint::LeftHip, (0.375, 0.6))
            .with_joint(Joint::RightHip, (0.625, 0.6))
    }

    #[test]
    fn test_assembles_all_angles() {
        let frame = PoseFrame::assemble(address_pose());
        assert_eq!(frame.source(), PoseSource::Camera2D);
        assert_abs_diff_eq!(frame.spine_angle.unwrap(), 0.0, epsilon = 1e-3);
        assert!(frame.hip_rotation.unwrap() < 1.0);
        assert!(frame.shoulder_rotation.unwrap() < 1.0);
        assert!(frame.left_elbow_angle.unwrap() > 170.0);
        assert!(frame.right_elbow_angle.unwrap() > 170.0);
    }

    #[test]
    fn test_missing_joint_propagates_absence() {
        let cases: [(Joint, fn(&PoseFrame) -> Vec<Option<f32>>); 6] = [
            (Joint::LeftShoulder, |f| vec![f.spine_angle, f.shoulder_rotation, f.left_elbow_angle]),
            (Joint::RightShoulder, |f| vec![f.spine_angle, f.shoulder_rotation, f.right_elbow_angle]),
            (Joint::LeftHip, |f| vec![f.spine_angle, f.hip_rotation]),
            (Joint::RightHip, |f| vec![f.spine_angle, f.hip_rotation]),
            (Joint::LeftElbow, |f| vec![f.left_elbow_angle]),
            (Joint::RightWrist, |f| vec![f.right_elbow_angle]),
        ];

        for (missing, angles) in cases {
            let mut observation = address_pose();
            observation.joints.set(missing, None);
            let frame = PoseFrame::assemble(observation);
            for angle in angles(&frame) {
                assert!(angle.is_none(), "{} missing should clear angle", missing.name());
            }
        }
    }

    #[test]
    fn test_empty_frame_has_zero_confidence() {
        let frame = PoseFrame::assemble(PoseObservation::new(1.0, 3, 0.9));
        assert_eq!(frame.confidence, 0.0);
        assert!(frame.spine_angle.is_none());
        assert!(frame.hip_rotation.is_none());
    }

    #[test]
    fn test_depth_joints_take_priority() {
        let observation = address_pose().with_joints_3d(vec![
            Joint3D::new(Joint::LeftHip, Vector3::new(-0.1, 1.0, -2.0), (0.45, 0.6), 0.9),
            Joint3D::new(Joint::RightHip, Vector3::new(-0.1, 1.0, -2.3), (0.55, 0.6), 0.9),
        ]);
        let frame = PoseFrame::assemble(observation);
        assert_eq!(frame.source(), PoseSource::Depth3D);
        // Hip line along the forward axis
        assert_abs_diff_eq!(frame.hip_rotation.unwrap(), 0.0, epsilon = 0.05);
        // Shoulders still come from the 2D fallback
        assert!(frame.shoulder_rotation.unwrap() < 1.0);
    }

    #[test]
    fn test_depth_screen_projection_fills_missing_2d() {
        let mut observation = address_pose();
        observation.joints.set(Joint::Nose, None);
        let observation = observation.with_joints_3d(vec![Joint3D::new(
            Joint::Nose,
            Vector3::new(0.0, 1.6, -2.0),
            (0.51, 0.19),
            0.8,
        )]);
        let frame = PoseFrame::assemble(observation);
        assert_eq!(frame.joint(Joint::Nose), Some((0.51, 0.19)));
    }
}
