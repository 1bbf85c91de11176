//! Canonical joint names and per-frame joint storage

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Number of canonical joints tracked per frame
pub const JOINT_COUNT: usize = 13;

/// Named anatomical landmark consumed by the swing pipeline
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Joint {
    Nose,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl Joint {
    pub const ALL: [Joint; JOINT_COUNT] = [
        Joint::Nose,
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftWrist,
        Joint::RightWrist,
        Joint::LeftHip,
        Joint::RightHip,
        Joint::LeftKnee,
        Joint::RightKnee,
        Joint::LeftAnkle,
        Joint::RightAnkle,
    ];

    /// Slot of this joint in a [`JointMap`]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            Joint::Nose => "nose",
            Joint::LeftShoulder => "leftShoulder",
            Joint::RightShoulder => "rightShoulder",
            Joint::LeftElbow => "leftElbow",
            Joint::RightElbow => "rightElbow",
            Joint::LeftWrist => "leftWrist",
            Joint::RightWrist => "rightWrist",
            Joint::LeftHip => "leftHip",
            Joint::RightHip => "rightHip",
            Joint::LeftKnee => "leftKnee",
            Joint::RightKnee => "rightKnee",
            Joint::LeftAnkle => "leftAnkle",
            Joint::RightAnkle => "rightAnkle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|j| j.name() == name)
    }
}

/// 2D joint positions of one frame (normalized screen coordinates)
///
/// `None` means the joint was not detected this frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JointMap {
    positions: [Option<(f32, f32)>; JOINT_COUNT],
}

impl JointMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, joint: Joint) -> Option<(f32, f32)> {
        self.positions[joint.index()]
    }

    pub fn set(&mut self, joint: Joint, position: Option<(f32, f32)>) {
        self.positions[joint.index()] = position;
    }

    pub fn insert(&mut self, joint: Joint, position: (f32, f32)) {
        self.set(joint, Some(position));
    }

    /// Detected joints with their positions
    pub fn iter(&self) -> impl Iterator<Item = (Joint, (f32, f32))> + '_ {
        Joint::ALL
            .iter()
            .filter_map(move |j| self.get(*j).map(|p| (*j, p)))
    }

    pub fn detected_count(&self) -> usize {
        self.positions.iter().filter(|p| p.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.detected_count() == 0
    }
}

impl FromIterator<(Joint, (f32, f32))> for JointMap {
    fn from_iter<I: IntoIterator<Item = (Joint, (f32, f32))>>(iter: I) -> Self {
        let mut map = JointMap::new();
        for (joint, position) in iter {
            map.insert(joint, position);
        }
        map
    }
}

/// Joint reported by a depth-capable skeleton tracker
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Joint3D {
    pub joint: Joint,
    /// Metric position in camera space (meters, y up, −z forward)
    pub position: Vector3<f32>,
    /// Normalized screen projection
    pub screen: (f32, f32),
    pub confidence: f32,
}

impl Joint3D {
    pub fn new(joint: Joint, position: Vector3<f32>, screen: (f32, f32), confidence: f32) -> Self {
        Self {
            joint,
            position,
            screen,
            confidence,
        }
    }
}
