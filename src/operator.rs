//! Attention operator evolution.
//!
//! The operator is diagonal in the standard basis, so it is fully described by
//! its eigenvalues. Each step relaxes every eigenvalue toward the active mode's
//! baseline with bounded uniform noise (an independent AR(1)-like process per
//! axis) and clamps it to a strictly positive floor.

use std::ops::Index;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::vector::Vector;

/// Ordered per-axis gains of the attention operator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EigenSpectrum(Vec<f64>);

impl EigenSpectrum {
    /// Number of axes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a zero-axis spectrum.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gains as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Gains in axis order.
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.0.iter()
    }

    /// Applies the diagonal operator: `c[k] = v[k] * λ[k]`.
    ///
    /// # Panics
    ///
    /// Panics if `v` does not have one component per eigenvalue.
    #[must_use]
    pub fn project(&self, v: &Vector) -> Vector {
        match v.try_hadamard(&self.0) {
            Ok(c) => c,
            Err(err) => panic!("operator projection: {err}"),
        }
    }
}

impl From<Vec<f64>> for EigenSpectrum {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl<const N: usize> From<[f64; N]> for EigenSpectrum {
    fn from(values: [f64; N]) -> Self {
        Self(values.to_vec())
    }
}

impl Index<usize> for EigenSpectrum {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

/// Relaxation, noise and floor constants for `OperatorEvolution`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionCoefficients {
    /// Fraction of the gap to baseline closed per step.
    pub drift: f64,
    /// Half-width of the uniform per-step noise.
    pub noise: f64,
    /// Minimum gain on any axis.
    pub floor: f64,
}

impl Default for EvolutionCoefficients {
    fn default() -> Self {
        Self {
            drift: 0.05,
            noise: 0.02,
            floor: 0.01,
        }
    }
}

impl EvolutionCoefficients {
    /// Validate coefficients.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.drift.is_finite() && self.drift >= 0.0) {
            return Err(ValidationError::InvalidConfig {
                reason: format!("drift coefficient must be >= 0, got {}", self.drift),
            });
        }
        if !(self.noise.is_finite() && self.noise >= 0.0) {
            return Err(ValidationError::InvalidConfig {
                reason: format!("noise coefficient must be >= 0, got {}", self.noise),
            });
        }
        if !(self.floor.is_finite() && self.floor > 0.0) {
            return Err(ValidationError::InvalidConfig {
                reason: format!("eigenvalue floor must be > 0, got {}", self.floor),
            });
        }
        Ok(())
    }
}

/// Stateless spectrum update rules.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OperatorEvolution {
    coefficients: EvolutionCoefficients,
}

impl OperatorEvolution {
    /// Evolution with the given constants.
    #[must_use]
    pub const fn new(coefficients: EvolutionCoefficients) -> Self {
        Self { coefficients }
    }

    /// The constants in use.
    #[must_use]
    pub const fn coefficients(&self) -> &EvolutionCoefficients {
        &self.coefficients
    }

    /// One relaxation step toward `baseline`.
    ///
    /// `next[i] = max(floor, current[i] + (baseline[i] - current[i]) * drift + U(-noise, noise))`
    ///
    /// # Panics
    ///
    /// Panics if `current` and `baseline` differ in length; both come from the
    /// same validated run configuration.
    pub fn advance<R: Rng + ?Sized>(
        &self,
        current: &EigenSpectrum,
        baseline: &EigenSpectrum,
        rng: &mut R,
    ) -> EigenSpectrum {
        assert_eq!(
            current.len(),
            baseline.len(),
            "spectrum and baseline dimensionality diverged"
        );
        let EvolutionCoefficients { drift, noise, floor } = self.coefficients;

        current
            .iter()
            .zip(baseline.iter())
            .map(|(&value, &target)| {
                let pull = (target - value) * drift;
                let jitter = if noise > 0.0 { rng.gen_range(-noise..=noise) } else { 0.0 };
                (value + pull + jitter).max(floor)
            })
            .collect::<Vec<_>>()
            .into()
    }

    /// Returns `current` with `bump` added to a single axis.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidAxis` if `axis >= current.len()`.
    pub fn perturb(
        &self,
        current: &EigenSpectrum,
        axis: usize,
        bump: f64,
    ) -> Result<EigenSpectrum, ValidationError> {
        if axis >= current.len() {
            return Err(ValidationError::InvalidAxis {
                axis,
                dimensions: current.len(),
            });
        }
        let mut next = current.clone();
        next.0[axis] = (next.0[axis] + bump).max(self.coefficients.floor);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quiet() -> OperatorEvolution {
        OperatorEvolution::new(EvolutionCoefficients {
            noise: 0.0,
            ..EvolutionCoefficients::default()
        })
    }

    #[test]
    fn test_at_baseline_without_noise_is_fixed_point() {
        let mut rng = StdRng::seed_from_u64(0);
        let s = EigenSpectrum::from([1.0, 0.8, 0.4, 0.2, 0.1]);
        assert_eq!(quiet().advance(&s, &s, &mut rng), s);
    }

    #[test]
    fn test_relaxes_toward_baseline() {
        let mut rng = StdRng::seed_from_u64(0);
        let baseline = EigenSpectrum::from([2.0, 0.5]);
        let mut s = EigenSpectrum::from([1.0, 1.0]);
        s = quiet().advance(&s, &baseline, &mut rng);
        assert!((s[0] - 1.05).abs() < 1e-12);
        assert!((s[1] - 0.975).abs() < 1e-12);

        for _ in 0..500 {
            s = quiet().advance(&s, &baseline, &mut rng);
        }
        assert!((s[0] - 2.0).abs() < 1e-6);
        assert!((s[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_floor_never_violated() {
        let mut rng = StdRng::seed_from_u64(99);
        let evo = OperatorEvolution::new(EvolutionCoefficients {
            noise: 0.5,
            ..EvolutionCoefficients::default()
        });
        let baseline = EigenSpectrum::from([0.01, 0.01, 0.01]);
        let mut s = baseline.clone();
        for _ in 0..5_000 {
            s = evo.advance(&s, &baseline, &mut rng);
            assert!(s.iter().all(|v| *v >= 0.01));
        }
    }

    #[test]
    fn test_noise_is_bounded() {
        let mut rng = StdRng::seed_from_u64(3);
        let evo = OperatorEvolution::default();
        let s = EigenSpectrum::from([1.0; 5]);
        for _ in 0..1_000 {
            let next = evo.advance(&s, &s, &mut rng);
            assert!(next.iter().all(|v| (v - 1.0).abs() <= 0.02 + 1e-12));
        }
    }

    #[test]
    fn test_perturb_single_axis() {
        let s = EigenSpectrum::from([1.0; 5]);
        let p = OperatorEvolution::default().perturb(&s, 2, 0.5).unwrap();
        assert_eq!(p.as_slice(), &[1.0, 1.0, 1.5, 1.0, 1.0]);
    }

    #[test]
    fn test_perturb_out_of_range() {
        let s = EigenSpectrum::from([1.0; 5]);
        let err = OperatorEvolution::default().perturb(&s, 5, 0.5).unwrap_err();
        assert_eq!(err, ValidationError::InvalidAxis { axis: 5, dimensions: 5 });
    }

    #[test]
    fn test_coefficients_validate() {
        EvolutionCoefficients::default().validate().unwrap();
        let bad = EvolutionCoefficients { floor: 0.0, ..EvolutionCoefficients::default() };
        assert!(bad.validate().is_err());
        let bad = EvolutionCoefficients { drift: -0.1, ..EvolutionCoefficients::default() };
        assert!(bad.validate().is_err());
    }
}
