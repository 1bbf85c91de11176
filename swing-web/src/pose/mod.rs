//! Pose module - joint model, frame assembly, smoothing and buffering
//!
//! Re-exports only. All logic in submodules.

mod joint;
mod frame;
mod smoother;
mod buffer;

pub use joint::{Joint, Joint3D, JointMap, JOINT_COUNT};
pub use frame::{PoseFrame, PoseObservation, PoseSource};
pub use smoother::PoseSmoother;
pub use buffer::{PoseBuffer, DEFAULT_CAPACITY};
