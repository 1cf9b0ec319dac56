//! Engine construction constants.
//!
//! Every tunable the engine is built with lives here. Defaults reproduce the
//! reference model (5 axes, 100-record history, 0.1 s dt ceiling). Loaded from
//! TOML when a file is supplied; every section is `#[serde(default)]` so a
//! partial file only overrides what it names.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::mode::ModeBaselines;
use crate::operator::EvolutionCoefficients;

/// Largest accepted `history_capacity`.
pub const MAX_HISTORY_CAPACITY: usize = 1_000_000;

/// Largest accepted `subscriber_capacity`.
pub const MAX_SUBSCRIBER_CAPACITY: usize = 65_536;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Dimensionality D shared by every vector in a run.
    pub dimensions: usize,
    /// Retained history records.
    pub history_capacity: usize,
    /// Ceiling applied to the raw frame interval, in seconds.
    pub dt_clamp_secs: f64,
    /// Magnitude of the random identity/body vectors drawn on reset.
    pub initial_magnitude: f64,
    /// Gain added to an axis by `perturb_mode`.
    pub perturbation_bump: f64,
    /// Seed for the engine's random source. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Buffered snapshots per subscriber before new ones are dropped.
    pub subscriber_capacity: usize,
    /// Spectrum relaxation constants.
    pub evolution: EvolutionCoefficients,
    /// Mode → baseline spectrum table.
    pub baselines: ModeBaselines,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dimensions: 5,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            dt_clamp_secs: 0.1,
            initial_magnitude: 0.5,
            perturbation_bump: 0.5,
            seed: None,
            subscriber_capacity: 256,
            evolution: EvolutionCoefficients::default(),
            baselines: ModeBaselines::default(),
        }
    }
}

impl EngineConfig {
    /// Default configuration with a fixed random seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Validate configuration.
    ///
    /// This must pass before an engine is constructed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.dimensions == 0 {
            return Err(invalid("dimensions must be >= 1"));
        }
        if self.history_capacity == 0 || self.history_capacity > MAX_HISTORY_CAPACITY {
            return Err(invalid(format!(
                "history_capacity must be in 1..={MAX_HISTORY_CAPACITY}, got {}",
                self.history_capacity
            )));
        }
        if !(self.dt_clamp_secs.is_finite() && self.dt_clamp_secs > 0.0) {
            return Err(invalid(format!("dt_clamp_secs must be > 0, got {}", self.dt_clamp_secs)));
        }
        if !(self.initial_magnitude.is_finite() && self.initial_magnitude >= 0.0) {
            return Err(invalid(format!(
                "initial_magnitude must be >= 0, got {}",
                self.initial_magnitude
            )));
        }
        if !self.perturbation_bump.is_finite() {
            return Err(invalid("perturbation_bump must be finite"));
        }
        if self.subscriber_capacity == 0 || self.subscriber_capacity > MAX_SUBSCRIBER_CAPACITY {
            return Err(invalid(format!(
                "subscriber_capacity must be in 1..={MAX_SUBSCRIBER_CAPACITY}, got {}",
                self.subscriber_capacity
            )));
        }
        self.evolution.validate()?;
        self.baselines.validate(self.dimensions, self.evolution.floor)
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfig` on a parse failure or when the
    /// parsed configuration does not validate.
    pub fn from_toml_str(content: &str) -> Result<Self, ValidationError> {
        let config: Self = toml::from_str(content).map_err(|e| invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfig` if the file cannot be read,
    /// parsed, or validated.
    pub fn load(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| invalid(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), dimensions = config.dimensions, "loaded engine config");
        Ok(config)
    }

    /// Serialize to a TOML string.
    #[must_use]
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

fn invalid(reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidConfig {
        reason: reason.into(),
    }
}
