//! Per-joint One Euro smoothing of raw observations
//!
//! Filters are created lazily the first time a joint is seen and reset as
//! soon as it drops out, so a reappearing joint never drags a stale position
//! back in. Losing every joint resets everything (person left the frame).

use nalgebra::Vector3;
use tracing::debug;

use super::frame::PoseObservation;
use super::joint::{Joint, Joint3D, JointMap, JOINT_COUNT};
use crate::config::FilterConfig;
use crate::physics::{OneEuroFilter2D, OneEuroFilter3D};

/// Smooths every joint of a pose stream independently
pub struct PoseSmoother {
    config: FilterConfig,
    filters: [Option<OneEuroFilter2D>; JOINT_COUNT],
    filters_3d: [Option<OneEuroFilter3D>; JOINT_COUNT],
}

impl PoseSmoother {
    pub fn new(config: FilterConfig) -> Self {
        Self {
            config,
            filters: Default::default(),
            filters_3d: Default::default(),
        }
    }

    /// Produce a smoothed copy of an observation
    pub fn smooth(&mut self, observation: &PoseObservation) -> PoseObservation {
        if observation.is_empty() {
            if self.tracked_joints() > 0 {
                debug!(timestamp = observation.timestamp, "tracking lost, resetting joint filters");
            }
            self.reset();
            return observation.clone();
        }

        let t = observation.timestamp;
        let mut joints = JointMap::new();

        for joint in Joint::ALL {
            let slot = &mut self.filters[joint.index()];
            // A joint reported only in 3D is smoothed through its screen projection
            let raw = observation.joints.get(joint).or_else(|| {
                observation
                    .joints_3d
                    .as_ref()?
                    .iter()
                    .find(|j| j.joint == joint)
                    .map(|j| j.screen)
            });
            match raw {
                Some(position) => {
                    let config = &self.config;
                    let filter = slot.get_or_insert_with(|| OneEuroFilter2D::new(config));
                    joints.insert(joint, filter.filter(t, position));
                }
                None => {
                    if let Some(filter) = slot.as_mut() {
                        if filter.x.is_warm() {
                            debug!(joint = joint.name(), "joint lost, resetting filter");
                        }
                        filter.reset();
                    }
                }
            }
        }

        let joints_3d = observation
            .joints_3d
            .as_ref()
            .map(|raw| self.smooth_3d(t, raw, &joints));

        PoseObservation {
            timestamp: t,
            frame_index: observation.frame_index,
            confidence: observation.confidence,
            joints,
            joints_3d,
        }
    }

    fn smooth_3d(&mut self, t: f64, raw: &[Joint3D], joints: &JointMap) -> Vec<Joint3D> {
        let mut seen = [false; JOINT_COUNT];
        let mut smoothed = Vec::with_capacity(raw.len());

        for j in raw {
            seen[j.joint.index()] = true;
            let config = &self.config;
            let filter = self.filters_3d[j.joint.index()]
                .get_or_insert_with(|| OneEuroFilter3D::new(config));
            let p = filter.filter(t, [j.position.x, j.position.y, j.position.z]);
            smoothed.push(Joint3D {
                position: Vector3::new(p[0], p[1], p[2]),
                screen: joints.get(j.joint).unwrap_or(j.screen),
                ..j.clone()
            });
        }

        for (i, filter) in self.filters_3d.iter_mut().enumerate() {
            if !seen[i] {
                if let Some(filter) = filter.as_mut() {
                    filter.reset();
                }
            }
        }
        smoothed
    }

    /// Number of joints whose 2D filter currently holds state
    pub fn tracked_joints(&self) -> usize {
        self.filters
            .iter()
            .flatten()
            .filter(|f| f.x.is_warm())
            .count()
    }

    /// Forget all filter state (tracking lost or new session)
    pub fn reset(&mut self) {
        for filter in self.filters.iter_mut().flatten() {
            filter.reset();
        }
        for filter in self.filters_3d.iter_mut().flatten() {
            filter.reset();
        }
    }
}

impl Default for PoseSmoother {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}
