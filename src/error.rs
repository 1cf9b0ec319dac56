//! Error types for the spectral attention engine.
//!
//! All errors are strongly typed using thiserror. Validation errors are
//! caller-contract violations and never change on retry; execution errors come
//! from the plumbing around the engine (streams, the clock thread, locks).

use thiserror::Error;

/// Validation errors raised at the boundary of the affected operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A vector or spectrum does not have the run's dimensionality.
    #[error("Vector has {actual} dimensions, expected {expected}")]
    InvalidDimension {
        /// Dimensionality required by the run.
        expected: usize,
        /// Dimensionality supplied.
        actual: usize,
    },

    /// `perturb_mode` was given an axis outside `[0, D)`.
    #[error("Axis {axis} is out of range for a {dimensions}-dimensional spectrum")]
    InvalidAxis {
        /// Requested axis.
        axis: usize,
        /// Number of axes in the spectrum.
        dimensions: usize,
    },

    /// A rate or noise level is negative or non-finite.
    #[error("Invalid simulation parameters: {reason}")]
    InvalidParams {
        /// Names the offending field and value.
        reason: String,
    },

    /// A mode name that is none of `stable`, `dissonance`, `aha`, `altered`.
    ///
    /// Kept apart from `InvalidParams` so that callers parsing user input can
    /// tell a bad name from a bad rate. Typed `SimulationMode` values can never
    /// be unknown, so the engine itself only sees this through parsing.
    #[error("Unknown simulation mode '{name}'")]
    UnknownMode {
        /// The name as given.
        name: String,
    },

    /// A configuration file could not be read, parsed or validated.
    #[error("Invalid engine configuration: {reason}")]
    InvalidConfig {
        /// What was wrong.
        reason: String,
    },
}

/// Execution errors from the runtime around the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// The other end of a channel was dropped.
    #[error("Channel disconnected: {path}")]
    Disconnected {
        /// Which channel.
        path: String,
    },

    /// A blocking receive gave up.
    #[error("Operation timed out after {duration_ms}ms")]
    Timeout {
        /// The timeout that elapsed.
        duration_ms: u64,
    },

    /// A thread panicked while holding the lock.
    #[error("Lock poisoned: {path}")]
    LockPoisoned {
        /// Which lock.
        path: String,
    },

    /// The OS refused to start the frame thread.
    #[error("Failed to spawn clock thread: {message}")]
    ClockSpawn {
        /// The OS error message.
        message: String,
    },
}

/// Top-level error type for the crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpectralError {
    /// Caller-contract violation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Runtime plumbing failure.
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),
}

impl SpectralError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an execution error.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }
}

/// Result type alias for engine operations.
pub type SpectralResult<T> = Result<T, SpectralError>;
