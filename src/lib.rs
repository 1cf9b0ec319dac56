//! # spectral-attention - A Spectral Attention Simulation Engine
//!
//! Two interacting state vectors, **identity** (slow self-model ψI) and
//! **body** (fast sensory state ψB), produce a **disparity** Δ = ψB − ψI. A
//! time-varying diagonal attention operator projects Δ into the **conscious**
//! vector ψC, whose magnitude distribution is summarised as intensity, entropy
//! and focus.
//!
//! ## Core Concepts
//!
//! - **Vector**: fixed-dimension real vector arithmetic
//! - **EigenSpectrum**: per-axis operator gains, relaxing toward a mode baseline
//! - **SimulationEngine**: owns the state, advances it one step per frame
//! - **History**: bounded FIFO of per-step statistics
//! - **ClockDriver**: background frame source that drives a shared engine
//!
//! ## Usage
//!
//! ```rust
//! use spectral_attention::{EngineConfig, SimulationEngine, SimulationMode};
//!
//! let mut engine = SimulationEngine::new(EngineConfig::seeded(42))?;
//! engine.start();
//! engine.set_mode(SimulationMode::Aha);
//! for _ in 0..60 {
//!     engine.step(1.0 / 60.0);
//! }
//! engine.perturb_mode(1)?;
//!
//! let snapshot = engine.snapshot();
//! let latest = snapshot.history.latest().unwrap();
//! assert!(latest.focus > 0.0 && latest.focus <= 1.0);
//! # Ok::<(), spectral_attention::ValidationError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Numeric core
pub mod operator;
pub mod statistics;
pub mod vector;

// Simulation model
pub mod config;
pub mod error;
pub mod history;
pub mod mode;
pub mod params;

// Runtime
pub mod clock;
pub mod engine;
pub mod telemetry;

// Re-export primary types at crate root for convenience
pub use clock::{lock_engine, ClockDriver, ClockDriverConfig, FrameClock, ManualClock, SystemClock};
pub use config::{EngineConfig, MAX_HISTORY_CAPACITY, MAX_SUBSCRIBER_CAPACITY};
pub use engine::{RunId, RunState, SharedEngine, SimulationEngine, SimulationState, SnapshotStream};
pub use error::{ExecutionError, SpectralError, SpectralResult, ValidationError};
pub use history::{History, HistoryRecord, DEFAULT_HISTORY_CAPACITY};
pub use mode::{ModeBaselines, SimulationMode};
pub use operator::{EigenSpectrum, EvolutionCoefficients, OperatorEvolution};
pub use params::SimulationParams;
pub use statistics::{entropy, focus, intensity, SpectralSummary};
pub use vector::Vector;
