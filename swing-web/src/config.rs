//! Swing analysis configuration
//!
//! Every tunable the embedding application may override: filter constants,
//! phase thresholds and timeouts, tempo target, buffer size. All sections are
//! `#[serde(default)]` so a partial TOML or JSON document is enough.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while loading or validating a [`SwingConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// One Euro filter constants shared by every joint coordinate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Minimum cutoff frequency (Hz)
    pub min_cutoff: f32,
    /// Speed coefficient
    pub beta: f32,
    /// Derivative cutoff frequency (Hz)
    pub d_cutoff: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_cutoff: 1.5,
            beta: 0.5,
            d_cutoff: 1.0,
        }
    }
}

/// Thresholds driving the phase transitions (degrees unless noted)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseThresholds {
    /// Shoulder rotation change from setup that starts the takeaway
    pub takeaway: f32,
    /// Shoulder rotation that marks the start of the backswing
    pub backswing_start: f32,
    /// Minimum shoulder rotation to accept a top-of-swing
    pub top_of_swing_min_rotation: f32,
    /// Shoulder unwinding speed (deg/s) that starts the downswing
    pub downswing_velocity: f32,
    /// Hip rotation below which the hips are square enough for impact
    pub impact_hip_rotation: f32,
    /// Shoulder rotation below which impact turns into follow-through
    pub follow_through: f32,
    /// Shoulder-rotation variance under which the finish is held
    pub finish_stability: f32,
    /// Shoulder-rotation variance under which the golfer is back at address
    pub setup_stability: f32,
    /// Minimum time from takeaway to finish (seconds)
    pub min_swing_duration: f64,
    /// Frame confidence required to capture a setup reference
    pub setup_confidence: f32,
}

impl Default for PhaseThresholds {
    fn default() -> Self {
        Self {
            takeaway: 5.0,
            backswing_start: 15.0,
            top_of_swing_min_rotation: 60.0,
            downswing_velocity: 100.0,
            impact_hip_rotation: 15.0,
            follow_through: 10.0,
            finish_stability: 5.0,
            setup_stability: 3.0,
            min_swing_duration: 0.8,
            setup_confidence: 0.8,
        }
    }
}

/// Maximum time (seconds) a swing may stay in each phase before it is cancelled
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseTimeouts {
    pub takeaway: f64,
    pub backswing: f64,
    pub top_of_swing: f64,
    pub downswing: f64,
    pub impact: f64,
    /// Hard ceiling on takeaway-to-finish time; reaching it forces the finish
    pub follow_through_max: f64,
}

impl Default for PhaseTimeouts {
    fn default() -> Self {
        Self {
            takeaway: 1.0,
            backswing: 2.0,
            top_of_swing: 0.5,
            downswing: 0.5,
            impact: 0.3,
            follow_through_max: 2.0,
        }
    }
}

/// Complete configuration for a swing analysis session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwingConfig {
    /// Ideal backswing:downswing ratio used for the tempo score
    pub target_tempo: f32,
    /// Number of pose frames kept in the rolling buffer (~10s at 30fps)
    pub buffer_capacity: usize,
    /// Frame rate assumed when converting per-frame deltas to per-second
    pub nominal_frame_rate: f32,
    pub filter: FilterConfig,
    pub thresholds: PhaseThresholds,
    pub timeouts: PhaseTimeouts,
}

impl Default for SwingConfig {
    fn default() -> Self {
        Self {
            target_tempo: 3.0,
            buffer_capacity: 300,
            nominal_frame_rate: 30.0,
            filter: FilterConfig::default(),
            thresholds: PhaseThresholds::default(),
            timeouts: PhaseTimeouts::default(),
        }
    }
}

fn positive_f32(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            reason: format!("must be > 0, got {}", value),
        })
    }
}

fn positive_f64(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            reason: format!("must be > 0, got {}", value),
        })
    }
}

impl SwingConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document (used by the JS bridge)
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive_f32("filter.min_cutoff", self.filter.min_cutoff)?;
        positive_f32("filter.d_cutoff", self.filter.d_cutoff)?;
        if !self.filter.beta.is_finite() || self.filter.beta < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "filter.beta",
                reason: format!("must be >= 0, got {}", self.filter.beta),
            });
        }

        let c = &self.thresholds.setup_confidence;
        if !(0.0..=1.0).contains(c) {
            return Err(ConfigError::InvalidValue {
                field: "thresholds.setup_confidence",
                reason: format!("must be within [0, 1], got {}", c),
            });
        }
        positive_f32("thresholds.downswing_velocity", self.thresholds.downswing_velocity)?;
        positive_f64("thresholds.min_swing_duration", self.thresholds.min_swing_duration)?;

        positive_f64("timeouts.takeaway", self.timeouts.takeaway)?;
        positive_f64("timeouts.backswing", self.timeouts.backswing)?;
        positive_f64("timeouts.top_of_swing", self.timeouts.top_of_swing)?;
        positive_f64("timeouts.downswing", self.timeouts.downswing)?;
        positive_f64("timeouts.impact", self.timeouts.impact)?;
        positive_f64("timeouts.follow_through_max", self.timeouts.follow_through_max)?;

        positive_f32("target_tempo", self.target_tempo)?;
        positive_f32("nominal_frame_rate", self.nominal_frame_rate)?;
        if self.buffer_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "buffer_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SwingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.filter.min_cutoff, 1.5);
        assert_eq!(config.thresholds.top_of_swing_min_rotation, 60.0);
        assert_eq!(config.timeouts.impact, 0.3);
        assert_eq!(config.buffer_capacity, 300);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SwingConfig::from_toml_str(
            r#"
            target_tempo = 2.5

            [filter]
            beta = 0.8
            "#,
        )
        .unwrap();
        assert_eq!(config.target_tempo, 2.5);
        assert_eq!(config.filter.beta, 0.8);
        assert_eq!(config.filter.min_cutoff, 1.5);
        assert_eq!(config.thresholds, PhaseThresholds::default());
    }

    #[test]
    fn test_json_config() {
        let config = SwingConfig::from_json_str(r#"{"thresholds": {"takeaway": 7.5}}"#).unwrap();
        assert_eq!(config.thresholds.takeaway, 7.5);
        assert_eq!(config.thresholds.backswing_start, 15.0);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = SwingConfig::from_toml_str("[filter]\nmin_cutoff = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "filter.min_cutoff", .. }));

        let err = SwingConfig::from_toml_str("buffer_capacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "buffer_capacity", .. }));

        let err = SwingConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = SwingConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(SwingConfig::from_toml_str(&text).unwrap(), config);
    }
}
