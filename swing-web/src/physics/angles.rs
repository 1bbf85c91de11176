//! Biomechanical angle calculations
//!
//! Spine tilt, hip/shoulder turn and elbow bend from joint positions.
//! 2D inputs are normalized screen coordinates (x right, y down).
//!
//! The 2D turn formulas model foreshortening: a line across the body looks
//! shorter on screen as the body turns away from the camera. The reference
//! widths are empirical, not anatomical measurements.

use nalgebra::Vector3;

/// On-screen hip width (normalized) of a golfer square to the camera
pub const HIP_REFERENCE_WIDTH: f32 = 0.25;

/// On-screen shoulder width (normalized) of a golfer square to the camera
pub const SHOULDER_REFERENCE_WIDTH: f32 = 0.35;

fn midpoint(a: (f32, f32), b: (f32, f32)) -> (f32, f32) {
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}

/// Spine tilt from vertical in degrees
///
/// Vector from hip midpoint to shoulder midpoint, angle = atan2(Δx, −Δy).
/// 0° = upright, positive = shoulders right of hips on screen.
pub fn spine_angle(
    left_shoulder: (f32, f32),
    right_shoulder: (f32, f32),
    left_hip: (f32, f32),
    right_hip: (f32, f32),
) -> f32 {
    let shoulders = midpoint(left_shoulder, right_shoulder);
    let hips = midpoint(left_hip, right_hip);
    let dx = shoulders.0 - hips.0;
    let dy = shoulders.1 - hips.1;
    dx.atan2(-dy).to_degrees()
}

/// Turn angle in degrees from the apparent width of a body line
///
/// 0° = full reference width (square to camera), 90° = zero width.
pub fn rotation_from_width(left: (f32, f32), right: (f32, f32), reference_width: f32) -> f32 {
    let width = (right.0 - left.0).abs();
    let compression_ratio = (width / reference_width).min(1.0);
    compression_ratio.acos().to_degrees()
}

/// Turn angle in degrees between a metric 3D body line and the camera forward axis
///
/// The line is projected onto the horizontal (x/z) plane first.
/// Returns None when the projected line has no length.
pub fn rotation_from_line_3d(left: &Vector3<f32>, right: &Vector3<f32>) -> Option<f32> {
    let line = right - left;
    let horizontal = Vector3::new(line.x, 0.0, line.z);
    let horizontal = horizontal.try_normalize(1e-6)?;
    let forward = Vector3::new(0.0, 0.0, -1.0);
    let dot = horizontal.dot(&forward).abs().min(1.0);
    Some(dot.acos().to_degrees())
}

/// Hip turn from the 2D hip joints
pub fn hip_rotation(left_hip: (f32, f32), right_hip: (f32, f32)) -> f32 {
    rotation_from_width(left_hip, right_hip, HIP_REFERENCE_WIDTH)
}

/// Shoulder turn from the 2D shoulder joints
pub fn shoulder_rotation(left_shoulder: (f32, f32), right_shoulder: (f32, f32)) -> f32 {
    rotation_from_width(left_shoulder, right_shoulder, SHOULDER_REFERENCE_WIDTH)
}

/// Calculate elbow angle in degrees
///
/// Uses dot product formula: cos(θ) = (v1 · v2) / (|v1| × |v2|)
///
/// Returns angle in degrees:
/// - 90° = bent at a right angle
/// - 180° = fully straight (lead arm at the top of a good backswing)
///
/// Returns None when either arm segment has no length.
pub fn calculate_elbow_angle(
    shoulder: (f32, f32),
    elbow: (f32, f32),
    wrist: (f32, f32),
) -> Option<f32> {
    // Vector from elbow to shoulder (upper arm)
    let v1 = (shoulder.0 - elbow.0, shoulder.1 - elbow.1);

    // Vector from elbow to wrist (forearm)
    let v2 = (wrist.0 - elbow.0, wrist.1 - elbow.1);

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();

    if mag1 < 0.0001 || mag2 < 0.0001 {
        return None;
    }

    let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    Some(cos_angle.acos().to_degrees())
}
