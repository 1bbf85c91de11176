//! Physics module - signal smoothing and biomechanics
//!
//! Re-exports only. All logic in submodules.

mod one_euro;
mod angles;
mod stats;

pub use one_euro::{OneEuroFilter, OneEuroFilter2D, OneEuroFilter3D, MIN_DT};
pub use angles::{
    calculate_elbow_angle, hip_rotation, rotation_from_line_3d, rotation_from_width,
    shoulder_rotation, spine_angle, HIP_REFERENCE_WIDTH, SHOULDER_REFERENCE_WIDTH,
};
pub use stats::{angular_velocity, is_past_peak, mean, variance};
