//! One Euro Filter - adaptive low-pass filter for joint jitter reduction
//!
//! Smooth when slow (address position, waggle), responsive when fast (the swing itself).
//! Applied independently to every coordinate of every tracked joint.

use std::f32::consts::PI;

use crate::config::FilterConfig;

/// Smallest time step used between two samples (seconds).
/// Duplicate or out-of-order timestamps are floored to this.
pub const MIN_DT: f32 = 0.001;

/// Exponential smoothing primitive with lazy initialization
#[derive(Clone, Debug, Default)]
struct LowPass {
    last: Option<f32>,
}

impl LowPass {
    fn filter(&mut self, value: f32, alpha: f32) -> f32 {
        let out = match self.last {
            Some(prev) => alpha * value + (1.0 - alpha) * prev,
            None => value,
        };
        self.last = Some(out);
        out
    }

    fn last(&self) -> Option<f32> {
        self.last
    }

    fn reset(&mut self) {
        self.last = None;
    }
}

/// Adaptive low-pass filter: smooth at rest, responsive during motion
#[derive(Clone, Debug)]
pub struct OneEuroFilter {
    /// Minimum cutoff frequency (Hz) - lower = smoother at rest
    min_cutoff: f32,
    /// Speed coefficient - higher = less lag during fast motion
    beta: f32,
    /// Derivative cutoff frequency (Hz)
    d_cutoff: f32,

    // State
    x: LowPass,
    dx: LowPass,
    t_prev: Option<f64>,
}

impl OneEuroFilter {
    pub fn new(min_cutoff: f32, beta: f32, d_cutoff: f32) -> Self {
        Self {
            min_cutoff,
            beta,
            d_cutoff,
            x: LowPass::default(),
            dx: LowPass::default(),
            t_prev: None,
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.min_cutoff, config.beta, config.d_cutoff)
    }

    /// Golf-tuned preset - tolerates the angular velocity of a full swing
    pub fn for_golf_swing() -> Self {
        Self::from_config(&FilterConfig::default())
    }

    /// Calculate smoothing factor alpha = 1 / (1 + tau/dt), tau = 1 / (2π·cutoff)
    fn smoothing_factor(dt: f32, cutoff: f32) -> f32 {
        let r = 2.0 * PI * cutoff * dt;
        r / (r + 1.0)
    }

    /// Filter a single value
    ///
    /// - `t`: timestamp in seconds
    /// - `value`: raw input value
    /// Returns: filtered value
    pub fn filter(&mut self, t: f64, value: f32) -> f32 {
        let (t_prev, x_prev) = match (self.t_prev, self.x.last()) {
            (Some(t_prev), Some(x_prev)) => (t_prev, x_prev),
            _ => {
                self.t_prev = Some(t);
                return self.x.filter(value, 1.0);
            }
        };

        let dt = ((t - t_prev) as f32).max(MIN_DT);

        // 1. Estimate derivative (velocity) and smooth it
        let dx = (value - x_prev) / dt;
        let edx = self.dx.filter(dx, Self::smoothing_factor(dt, self.d_cutoff));

        // 2. Adaptive cutoff: more smoothing when slow, less when fast
        let cutoff = self.min_cutoff + self.beta * edx.abs();

        // 3. Apply filter
        self.t_prev = Some(t);
        self.x.filter(value, Self::smoothing_factor(dt, cutoff))
    }

    /// Whether at least one sample has been seen since construction or reset
    pub fn is_warm(&self) -> bool {
        self.t_prev.is_some()
    }

    /// Reset filter state
    pub fn reset(&mut self) {
        self.x.reset();
        self.dx.reset();
        self.t_prev = None;
    }
}

impl Default for OneEuroFilter {
    fn default() -> Self {
        Self::for_golf_swing()
    }
}

/// Pair of One Euro Filters for 2D position
#[derive(Clone, Debug)]
pub struct OneEuroFilter2D {
    pub x: OneEuroFilter,
    pub y: OneEuroFilter,
}

impl OneEuroFilter2D {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            x: OneEuroFilter::from_config(config),
            y: OneEuroFilter::from_config(config),
        }
    }

    pub fn filter(&mut self, t: f64, pos: (f32, f32)) -> (f32, f32) {
        (self.x.filter(t, pos.0), self.y.filter(t, pos.1))
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
    }
}

impl Default for OneEuroFilter2D {
    fn default() -> Self {
        Self::new(&FilterConfig::default())
    }
}

/// Three One Euro Filters for a metric 3D position
#[derive(Clone, Debug)]
pub struct OneEuroFilter3D {
    pub x: OneEuroFilter,
    pub y: OneEuroFilter,
    pub z: OneEuroFilter,
}

impl OneEuroFilter3D {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            x: OneEuroFilter::from_config(config),
            y: OneEuroFilter::from_config(config),
            z: OneEuroFilter::from_config(config),
        }
    }

    pub fn filter(&mut self, t: f64, pos: [f32; 3]) -> [f32; 3] {
        [
            self.x.filter(t, pos[0]),
            self.y.filter(t, pos[1]),
            self.z.filter(t, pos[2]),
        ]
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
        self.z.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const DT: f64 = 1.0 / 30.0;

    fn samples_until_within(filter: &mut OneEuroFilter, target: f32, eps: f32) -> usize {
        filter.filter(0.0, 0.0);
        for i in 1..1000 {
            let out = filter.filter(i as f64 * DT, target);
            if (out - target).abs() < eps {
                return i;
            }
        }
        usize::MAX
    }

    #[test]
    fn test_first_sample_passes_through() {
        let mut f = OneEuroFilter::for_golf_swing();
        assert_eq!(f.filter(0.0, 0.42), 0.42);
        assert!(f.is_warm());
    }

    #[test]
    fn test_converges_monotonically_to_constant() {
        let mut f = OneEuroFilter::for_golf_swing();
        f.filter(0.0, 0.0);
        let mut prev = 0.0;
        for i in 1..600 {
            let out = f.filter(i as f64 * DT, 1.0);
            assert!(out >= prev, "output went backwards at sample {}", i);
            assert!(out <= 1.0 + 1e-6);
            prev = out;
        }
        assert_abs_diff_eq!(prev, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_speed_adaptation_reduces_lag() {
        let mut adaptive = OneEuroFilter::new(1.5, 0.5, 1.0);
        let mut fixed = OneEuroFilter::new(1.5, 0.0, 1.0);

        let adaptive_n = samples_until_within(&mut adaptive, 1.0, 0.01);
        let fixed_n = samples_until_within(&mut fixed, 1.0, 0.01);

        assert!(adaptive_n < fixed_n, "adaptive {} vs fixed {}", adaptive_n, fixed_n);
    }

    #[test]
    fn test_reset_matches_fresh_filter() {
        let inputs = [0.1_f32, 0.3, 0.25, 0.8, 0.75, 0.5];

        let mut used = OneEuroFilter::for_golf_swing();
        for (i, v) in inputs.iter().rev().enumerate() {
            used.filter(i as f64 * DT + 7.0, *v);
        }
        used.reset();
        assert!(!used.is_warm());

        let mut fresh = OneEuroFilter::for_golf_swing();
        for (i, v) in inputs.iter().enumerate() {
            let t = i as f64 * DT;
            assert_eq!(used.filter(t, *v).to_bits(), fresh.filter(t, *v).to_bits());
        }
    }

    #[test]
    fn test_duplicate_timestamp_is_floored() {
        let mut f = OneEuroFilter::for_golf_swing();
        f.filter(1.0, 0.0);
        let out = f.filter(1.0, 1.0);
        assert!(out.is_finite());
        assert!(out > 0.0 && out < 1.0);
    }

    #[test]
    fn test_2d_filters_axes_independently() {
        let mut f = OneEuroFilter2D::default();
        f.filter(0.0, (0.5, 0.5));
        let (x, y) = f.filter(DT, (0.5, 0.9));
        assert_abs_diff_eq!(x, 0.5, epsilon = 1e-6);
        assert!(y > 0.5 && y < 0.9);
    }
}
