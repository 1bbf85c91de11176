//! Landmark ingestion from JavaScript
//!
//! Receives pose-detector output as flat Float32Arrays, converts it into a
//! `PoseObservation` and feeds the active session.

use nalgebra::Vector3;
use wasm_bindgen::prelude::*;

use super::session_store;
use crate::pose::{Joint, Joint3D, PoseObservation, JOINT_COUNT};

// ============================================================================
// LANDMARK LAYOUTS
// ============================================================================

/// MediaPipe Pose landmark count
pub const MEDIAPIPE_LANDMARKS: usize = 33;

/// Values per MediaPipe landmark: x, y, z, visibility
pub const MEDIAPIPE_STRIDE: usize = 4;

/// Values per skeleton joint: x, y, z (meters), screen x, screen y, confidence
pub const SKELETON_STRIDE: usize = 6;

/// Landmarks below this visibility count as not detected
pub const MIN_VISIBILITY: f32 = 0.5;

/// MediaPipe Pose index of each canonical joint
pub const MEDIAPIPE_INDEX: [(Joint, usize); JOINT_COUNT] = [
    (Joint::Nose, 0),
    (Joint::LeftShoulder, 11),
    (Joint::RightShoulder, 12),
    (Joint::LeftElbow, 13),
    (Joint::RightElbow, 14),
    (Joint::LeftWrist, 15),
    (Joint::RightWrist, 16),
    (Joint::LeftHip, 23),
    (Joint::RightHip, 24),
    (Joint::LeftKnee, 25),
    (Joint::RightKnee, 26),
    (Joint::LeftAnkle, 27),
    (Joint::RightAnkle, 28),
];

// ============================================================================
// CONVERSION (no wasm_bindgen)
// ============================================================================

/// Build an observation from 33 MediaPipe landmarks × (x, y, z, visibility)
///
/// Returns None if the array has the wrong length.
pub fn observation_from_mediapipe(
    data: &[f32],
    timestamp: f64,
    frame_index: u64,
    confidence: f32,
) -> Option<PoseObservation> {
    if data.len() != MEDIAPIPE_LANDMARKS * MEDIAPIPE_STRIDE {
        return None;
    }

    let mut observation = PoseObservation::new(timestamp, frame_index, confidence);
    for (joint, index) in MEDIAPIPE_INDEX {
        let base = index * MEDIAPIPE_STRIDE;
        let (x, y, visibility) = (data[base], data[base + 1], data[base + 3]);
        if visibility >= MIN_VISIBILITY && x.is_finite() && y.is_finite() {
            observation.joints.insert(joint, (x, y));
        }
    }
    Some(observation)
}

/// Build an observation from a depth tracker's 13 canonical joints
///
/// Joints are in `Joint::ALL` order, 6 values each. A joint with
/// confidence ≤ 0 is absent. Screen projections also fill the 2D joints.
pub fn observation_from_skeleton_3d(
    data: &[f32],
    timestamp: f64,
    frame_index: u64,
    confidence: f32,
) -> Option<PoseObservation> {
    if data.len() != JOINT_COUNT * SKELETON_STRIDE {
        return None;
    }

    let mut observation = PoseObservation::new(timestamp, frame_index, confidence);
    let mut joints_3d = Vec::with_capacity(JOINT_COUNT);

    for (joint, values) in Joint::ALL.iter().zip(data.chunks_exact(SKELETON_STRIDE)) {
        let joint_confidence = values[5];
        if joint_confidence <= 0.0 || values.iter().any(|v| !v.is_finite()) {
            continue;
        }
        let screen = (values[3], values[4]);
        observation.joints.insert(*joint, screen);
        joints_3d.push(Joint3D::new(
            *joint,
            Vector3::new(values[0], values[1], values[2]),
            screen,
            joint_confidence,
        ));
    }

    Some(observation.with_joints_3d(joints_3d))
}

// ============================================================================
// WASM-BINDGEN ENTRY POINTS
// ============================================================================

/// Called from JavaScript with a flat Float32Array of 132 values
/// (33 MediaPipe landmarks × x, y, z, visibility)
#[wasm_bindgen]
pub fn update_landmarks(data: &[f32], timestamp: f64, confidence: f32) {
    let frame_index = session_store::next_frame_index();
    match observation_from_mediapipe(data, timestamp, frame_index, confidence) {
        Some(observation) => session_store::ingest(&observation),
        None => web_sys::console::warn_1(
            &format!(
                "Invalid landmark data length: {} (expected {})",
                data.len(),
                MEDIAPIPE_LANDMARKS * MEDIAPIPE_STRIDE
            )
            .into(),
        ),
    }
}

/// Called from JavaScript with a flat Float32Array of 78 values
/// (13 skeleton joints × x, y, z, screen_x, screen_y, confidence)
#[wasm_bindgen]
pub fn update_skeleton_3d(data: &[f32], timestamp: f64, confidence: f32) {
    let frame_index = session_store::next_frame_index();
    match observation_from_skeleton_3d(data, timestamp, frame_index, confidence) {
        Some(observation) => session_store::ingest(&observation),
        None => web_sys::console::warn_1(
            &format!(
                "Invalid skeleton data length: {} (expected {})",
                data.len(),
                JOINT_COUNT * SKELETON_STRIDE
            )
            .into(),
        ),
    }
}
