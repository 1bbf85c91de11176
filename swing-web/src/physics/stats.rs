//! Window statistics over recent angle samples
//!
//! Small helpers shared by the phase detector and the metrics analyzer.

/// Arithmetic mean, None for an empty window
pub fn mean(samples: &[f32]) -> Option<f32> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f32>() / samples.len() as f32)
}

/// Population variance, None for an empty window
pub fn variance(samples: &[f32]) -> Option<f32> {
    let m = mean(samples)?;
    let sum_sq: f32 = samples.iter().map(|v| (v - m) * (v - m)).sum();
    Some(sum_sq / samples.len() as f32)
}

/// True once the newest sample is below the peak of the older samples
///
/// The two newest samples are excluded from the peak so a single noisy
/// frame right after the turn does not mask the drop.
pub fn is_past_peak(window: &[f32]) -> bool {
    if window.len() < 3 {
        return false;
    }
    let last = window[window.len() - 1];
    let peak = window[..window.len() - 2]
        .iter()
        .copied()
        .fold(f32::MIN, f32::max);
    last < peak
}

/// Average unwinding speed across a window in degrees per second
///
/// Positive when the angle is decreasing. Assumes one sample per frame.
pub fn angular_velocity(window: &[f32], frame_rate: f32) -> Option<f32> {
    if window.len() < 2 {
        return None;
    }
    let first = window[0];
    let last = window[window.len() - 1];
    Some((first - last) / window.len() as f32 * frame_rate)
}
