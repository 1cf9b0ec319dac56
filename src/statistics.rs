//! Scalar summaries of a spectral coefficient vector.
//!
//! Both statistics work on the magnitude distribution `m[i] = |c[i]|`. An
//! all-zero vector is a defined degenerate case and yields 0, never an error.

use serde::{Deserialize, Serialize};

use crate::vector::Vector;

/// Shannon entropy (natural log) of the normalised coefficient magnitudes.
///
/// Lies in `[0, ln(D)]`. Zero-probability terms contribute nothing.
#[must_use]
pub fn entropy(coeffs: &[f64]) -> f64 {
    let sum: f64 = coeffs.iter().map(|c| c.abs()).sum();
    if sum == 0.0 {
        return 0.0;
    }

    let h = -coeffs
        .iter()
        .map(|c| c.abs() / sum)
        .filter(|&p| p > 0.0)
        .map(|p| p * p.ln())
        .sum::<f64>();

    // -0.0 and rounding noise below zero collapse to 0.
    h.max(0.0)
}

/// Share of the total magnitude held by the single largest coefficient.
///
/// In `(0, 1]` for a non-zero vector, 0 for the all-zero vector.
#[must_use]
pub fn focus(coeffs: &[f64]) -> f64 {
    let sum: f64 = coeffs.iter().map(|c| c.abs()).sum();
    if sum == 0.0 {
        return 0.0;
    }
    let max = coeffs.iter().map(|c| c.abs()).fold(0.0_f64, f64::max);
    max / sum
}

/// Euclidean norm of the conscious vector.
#[must_use]
pub fn intensity(conscious: &Vector) -> f64 {
    conscious.norm()
}

/// The three per-step phenomenology statistics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpectralSummary {
    /// Norm of the conscious vector.
    pub intensity: f64,
    /// Entropy of the normalised magnitudes.
    pub entropy: f64,
    /// Largest magnitude over the total.
    pub focus: f64,
}

impl SpectralSummary {
    /// Computes all three statistics for a coefficient vector.
    ///
    /// In the standard eigenbasis the conscious vector equals the coefficients,
    /// so intensity is taken from the same vector.
    #[must_use]
    pub fn of(coeffs: &Vector) -> Self {
        Self {
            intensity: intensity(coeffs),
            entropy: entropy(coeffs.as_slice()),
            focus: focus(coeffs.as_slice()),
        }
    }
}
