//! Phenomenology modes and their baseline spectra.
//!
//! A mode only selects the spectrum the operator relaxes toward. It never
//! touches the live spectrum directly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::operator::EigenSpectrum;

/// Enumerated phenomenology modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMode {
    /// Graded spectrum with a clear leading mode.
    #[default]
    Stable,

    /// Flat-ish, high gains: many modes compete.
    Dissonance,

    /// One dominant spike ("insight" collapse).
    Aha,

    /// Completely flat spectrum.
    Altered,
}

impl SimulationMode {
    /// All modes, in presentation order.
    pub const ALL: [Self; 4] = [Self::Stable, Self::Dissonance, Self::Aha, Self::Altered];

    /// Lowercase name, as accepted by `FromStr`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Dissonance => "dissonance",
            Self::Aha => "aha",
            Self::Altered => "altered",
        }
    }
}

impl fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; surrounding whitespace is ignored.
///
/// An unrecognised name is reported as `ValidationError::UnknownMode` rather
/// than `InvalidParams`.
impl FromStr for SimulationMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == lower)
            .ok_or_else(|| ValidationError::UnknownMode { name: s.to_string() })
    }
}

/// Mode → baseline spectrum table.
///
/// All four spectra must have the run's dimensionality; `EngineConfig::validate`
/// checks this before an engine is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeBaselines {
    /// Baseline for `SimulationMode::Stable`.
    pub stable: EigenSpectrum,
    /// Baseline for `SimulationMode::Dissonance`.
    pub dissonance: EigenSpectrum,
    /// Baseline for `SimulationMode::Aha`.
    pub aha: EigenSpectrum,
    /// Baseline for `SimulationMode::Altered`.
    pub altered: EigenSpectrum,
}

impl Default for ModeBaselines {
    fn default() -> Self {
        Self {
            stable: EigenSpectrum::from(vec![1.0, 0.8, 0.4, 0.2, 0.1]),
            dissonance: EigenSpectrum::from(vec![0.8, 0.8, 0.7, 0.7, 0.6]),
            aha: EigenSpectrum::from(vec![2.0, 0.2, 0.1, 0.05, 0.05]),
            altered: EigenSpectrum::from(vec![0.5, 0.5, 0.5, 0.5, 0.5]),
        }
    }
}

impl ModeBaselines {
    /// Same spectrum for every mode.
    #[must_use]
    pub fn uniform(spectrum: EigenSpectrum) -> Self {
        Self {
            stable: spectrum.clone(),
            dissonance: spectrum.clone(),
            aha: spectrum.clone(),
            altered: spectrum,
        }
    }

    /// Baseline for `mode`.
    #[must_use]
    pub const fn get(&self, mode: SimulationMode) -> &EigenSpectrum {
        match mode {
            SimulationMode::Stable => &self.stable,
            SimulationMode::Dissonance => &self.dissonance,
            SimulationMode::Aha => &self.aha,
            SimulationMode::Altered => &self.altered,
        }
    }

    /// Every mode with its baseline, in `SimulationMode::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (SimulationMode, &EigenSpectrum)> {
        SimulationMode::ALL.into_iter().map(move |m| (m, self.get(m)))
    }

    /// Checks every baseline against the run dimensionality and the gain floor.
    pub fn validate(&self, dimensions: usize, floor: f64) -> Result<(), ValidationError> {
        for (mode, spectrum) in self.iter() {
            if spectrum.len() != dimensions {
                return Err(ValidationError::InvalidConfig {
                    reason: format!(
                        "baseline for mode '{mode}' has {} values, expected {dimensions}",
                        spectrum.len()
                    ),
                });
            }
            if let Some(v) = spectrum.iter().find(|v| !v.is_finite() || **v < floor) {
                return Err(ValidationError::InvalidConfig {
                    reason: format!("baseline for mode '{mode}' contains {v}, below floor {floor}"),
                });
            }
        }
        Ok(())
    }
}
