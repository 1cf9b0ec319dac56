//! Live simulation parameters.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::mode::SimulationMode;

/// Rates and mode read by every step.
///
/// Replaced wholesale by `SimulationEngine::set_params`; callers that want a
/// partial update read the current record, modify it, and write it back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Pull of the body back toward identity (disparity damping).
    pub regulation_rate: f64,
    /// Conscious-vector feedback into the body.
    pub feedback_rate: f64,
    /// Slow integration of the conscious vector into identity.
    pub identity_integration_rate: f64,
    /// Half-width of the uniform noise added to the body each step.
    pub noise_level: f64,
    /// Selects the baseline spectrum.
    pub mode: SimulationMode,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            regulation_rate: 0.1,
            feedback_rate: 0.05,
            identity_integration_rate: 0.01,
            noise_level: 0.05,
            mode: SimulationMode::Stable,
        }
    }
}

impl SimulationParams {
    /// All rates and noise zero: a deterministic, frozen body and identity.
    #[must_use]
    pub const fn still(mode: SimulationMode) -> Self {
        Self {
            regulation_rate: 0.0,
            feedback_rate: 0.0,
            identity_integration_rate: 0.0,
            noise_level: 0.0,
            mode,
        }
    }

    /// Returns a copy with a different mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: SimulationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Rejects negative or non-finite rates.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("regulation_rate", self.regulation_rate),
            ("feedback_rate", self.feedback_rate),
            ("identity_integration_rate", self.identity_integration_rate),
            ("noise_level", self.noise_level),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::InvalidParams {
                    reason: format!("{name} must be a finite value >= 0, got {value}"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        let p = SimulationParams::default();
        p.validate().unwrap();
        assert_eq!(p.mode, SimulationMode::Stable);
        assert!(p.identity_integration_rate < p.feedback_rate);
    }

    #[test]
    fn test_negative_rate_rejected() {
        let p = SimulationParams {
            feedback_rate: -0.01,
            ..SimulationParams::default()
        };
        let err = p.validate().unwrap_err();
        assert!(format!("{err}").contains("feedback_rate"));
    }

    #[test]
    fn test_nan_rejected() {
        let p = SimulationParams {
            noise_level: f64::NAN,
            ..SimulationParams::default()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let p: SimulationParams = toml::from_str("mode = \"aha\"\nnoise_level = 0.0\n").unwrap();
        assert_eq!(p.mode, SimulationMode::Aha);
        assert_eq!(p.noise_level, 0.0);
        assert_eq!(p.regulation_rate, 0.1);
    }
}
