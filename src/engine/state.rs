//! Authoritative simulation state and its identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::history::History;
use crate::operator::EigenSpectrum;
use crate::vector::Vector;

/// Identifies one run: the span between two resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Create a new random run ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether the engine accepts steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Steps and ticks are ignored.
    #[default]
    Idle,
    /// Steps and ticks advance the state.
    Running,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
        }
    }
}

/// One complete, consistent view of the simulation.
///
/// Published as `Arc<SimulationState>`; a snapshot is never mutated once
/// another reader holds it.
///
/// `disparity`, `spectral_coefficients` and `conscious` describe the most
/// recent step and were computed from that step's *input* `body` and
/// `identity`. With all rates and noise at zero the vectors do not move, so
/// `disparity == body - identity` also holds against the stored vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// Run this snapshot belongs to.
    pub run_id: RunId,
    /// Number of steps committed in this run.
    pub sequence: u64,
    /// Slow self-model ψI.
    pub identity: Vector,
    /// Fast body/sensory state ψB.
    pub body: Vector,
    /// ψB − ψI.
    pub disparity: Vector,
    /// ψC, equal to the spectral coefficients in the standard eigenbasis.
    pub conscious: Vector,
    /// `c[k] = disparity[k] * eigen_spectrum[k]`.
    pub spectral_coefficients: Vector,
    /// Operator gains after the most recent step.
    pub eigen_spectrum: EigenSpectrum,
    /// Per-step statistics, oldest first.
    pub history: History,
}

impl SimulationState {
    /// Dimensionality D of this run.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.identity.len()
    }

    /// Checks the shape invariants shared by every field.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let d = self.dimensions();
        d > 0
            && self.body.len() == d
            && self.disparity.len() == d
            && self.conscious.len() == d
            && self.spectral_coefficients.len() == d
            && self.eigen_spectrum.len() == d
            && self.conscious == self.spectral_coefficients
            && self.history.len() <= self.history.capacity()
    }
}
