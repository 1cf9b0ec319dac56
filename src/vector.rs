//! Fixed-dimension real vectors.
//!
//! Every vector in a simulation run shares the run's dimensionality. The
//! `try_*` methods report a length mismatch as `ValidationError::InvalidDimension`;
//! the operator impls treat it as a broken invariant and panic.

use std::fmt;
use std::ops::{Add, Index, Mul, Sub};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// An ordered, fixed-length sequence of reals.
///
/// # Examples
///
/// ```
/// use spectral_attention::Vector;
///
/// let body = Vector::from(vec![1.0, 2.0, 2.0]);
/// let identity = Vector::zeros(3);
/// let disparity = body.try_sub(&identity).unwrap();
/// assert_eq!(disparity.norm(), 3.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector(Vec<f64>);

impl Vector {
    /// All-zero vector of the given dimensionality.
    #[must_use]
    pub fn zeros(dim: usize) -> Self {
        Self(vec![0.0; dim])
    }

    /// Each component drawn independently and uniformly from `[-magnitude, +magnitude]`.
    ///
    /// Consumes entropy from `rng`; the result is only reproducible when the
    /// caller seeds it.
    pub fn random<R: Rng + ?Sized>(dim: usize, magnitude: f64, rng: &mut R) -> Self {
        debug_assert!(magnitude >= 0.0, "random vector magnitude must be >= 0");
        if magnitude == 0.0 {
            return Self::zeros(dim);
        }
        Self((0..dim).map(|_| rng.gen_range(-magnitude..=magnitude)).collect())
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a zero-dimensional vector.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Components as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Components in order.
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.0.iter()
    }

    /// Euclidean norm.
    #[must_use]
    pub fn norm(&self) -> f64 {
        self.0.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    /// `c[i] = v[i] * s`
    #[must_use]
    pub fn scale(&self, s: f64) -> Self {
        Self(self.0.iter().map(|x| x * s).collect())
    }

    /// `c[i] = self[i] + other[i] * s`
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ.
    #[must_use]
    pub fn add_scaled(&self, other: &Self, s: f64) -> Self {
        match self.zip_with(other, |a, b| a + b * s) {
            Ok(v) => v,
            Err(err) => panic!("vector add_scaled: {err}"),
        }
    }

    /// Returns true if every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|x| x.is_finite())
    }

    /// Componentwise sum.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidDimension` if the lengths differ.
    pub fn try_add(&self, other: &Self) -> Result<Self, ValidationError> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Componentwise difference `self - other`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidDimension` if the lengths differ.
    pub fn try_sub(&self, other: &Self) -> Result<Self, ValidationError> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Componentwise product, used to apply a diagonal operator.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidDimension` if the lengths differ.
    pub fn try_hadamard(&self, other: &[f64]) -> Result<Self, ValidationError> {
        if self.len() != other.len() {
            return Err(ValidationError::InvalidDimension {
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(Self(self.0.iter().zip(other).map(|(a, b)| a * b).collect()))
    }

    /// Fails with `InvalidDimension` unless this vector has exactly `dim` components.
    pub fn ensure_dim(&self, dim: usize) -> Result<(), ValidationError> {
        if self.len() == dim {
            Ok(())
        } else {
            Err(ValidationError::InvalidDimension {
                expected: dim,
                actual: self.len(),
            })
        }
    }

    fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Result<Self, ValidationError> {
        if self.len() != other.len() {
            return Err(ValidationError::InvalidDimension {
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(Self(self.0.iter().zip(&other.0).map(|(&a, &b)| f(a, b)).collect()))
    }
}

impl From<Vec<f64>> for Vector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl<const N: usize> From<[f64; N]> for Vector {
    fn from(values: [f64; N]) -> Self {
        Self(values.to_vec())
    }
}

impl Index<usize> for Vector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a Vector {
    type Item = &'a f64;
    type IntoIter = std::slice::Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Add<&Vector> for &Vector {
    type Output = Vector;

    fn add(self, rhs: &Vector) -> Vector {
        match self.try_add(rhs) {
            Ok(v) => v,
            Err(err) => panic!("vector add: {err}"),
        }
    }
}

impl Sub<&Vector> for &Vector {
    type Output = Vector;

    fn sub(self, rhs: &Vector) -> Vector {
        match self.try_sub(rhs) {
            Ok(v) => v,
            Err(err) => panic!("vector sub: {err}"),
        }
    }
}

impl Mul<f64> for &Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Vector {
        self.scale(rhs)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, x) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{x:.3}")?;
        }
        write!(f, "]")
    }
}
