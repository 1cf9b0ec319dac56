//! Simulation engine.
//!
//! `SimulationEngine` owns the single live `SimulationState` and is its only
//! writer. Every mutation builds the complete next state before committing it,
//! and readers only ever see whole snapshots (`Arc<SimulationState>`), either by
//! calling `snapshot()` or through a `SnapshotStream`.

/// Snapshot and identifier types.
pub mod state;
/// Subscriber stream handle.
pub mod stream;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use crossbeam_channel::{bounded, Sender, TrySendError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace, warn};

use crate::config::EngineConfig;
use crate::error::ValidationError;
use crate::history::{History, HistoryRecord};
use crate::mode::SimulationMode;
use crate::operator::{EigenSpectrum, OperatorEvolution};
use crate::params::SimulationParams;
use crate::statistics::SpectralSummary;
use crate::vector::Vector;

pub use state::{RunId, RunState, SimulationState};
pub use stream::SnapshotStream;

/// An engine shared between a clock thread and readers.
pub type SharedEngine = Arc<Mutex<SimulationEngine>>;

/// The identity/body/operator simulation.
///
/// # Examples
///
/// ```
/// use spectral_attention::{EngineConfig, SimulationEngine};
///
/// let mut engine = SimulationEngine::new(EngineConfig::seeded(1)).unwrap();
/// assert!(engine.step(0.016).is_none(), "idle engines ignore steps");
///
/// engine.start();
/// let record = engine.step(0.016).unwrap();
/// assert_eq!(record.sequence, 1);
/// assert_eq!(engine.snapshot().history.len(), 1);
/// ```
pub struct SimulationEngine {
    config: EngineConfig,
    evolution: OperatorEvolution,
    params: SimulationParams,
    run_state: RunState,
    state: Arc<SimulationState>,
    rng: StdRng,
    epoch: Instant,
    last_timestamp: Option<Duration>,
    last_frame: Option<Duration>,
    frame_origin: Option<Duration>,
    last_dt: f64,
    subscribers: Vec<Sender<Arc<SimulationState>>>,
    dropped_snapshots: u64,
}

impl std::fmt::Debug for SimulationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationEngine")
            .field("run_id", &self.state.run_id)
            .field("run_state", &self.run_state)
            .field("params", &self.params)
            .field("sequence", &self.state.sequence)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl SimulationEngine {
    /// Create an engine with default parameters and a freshly randomised state.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfig` if `config` does not validate.
    pub fn new(config: EngineConfig) -> Result<Self, ValidationError> {
        Self::with_params(config, SimulationParams::default())
    }

    /// Create an engine with explicit parameters and a freshly randomised state.
    pub fn with_params(config: EngineConfig, params: SimulationParams) -> Result<Self, ValidationError> {
        config.validate()?;
        params.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = Self::fresh_state(&config, params.mode, &mut rng);
        info!(
            run_id = %state.run_id,
            dimensions = config.dimensions,
            mode = %params.mode,
            "simulation engine created"
        );

        Ok(Self::assemble(config, params, state, rng))
    }

    /// Create an engine from explicit initial vectors and spectrum.
    ///
    /// The initial spectrum is taken as given; the floor applies from the first
    /// step on.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidDimension` if any input does not have
    /// `config.dimensions` components, or a config/params validation error.
    pub fn with_state(
        config: EngineConfig,
        params: SimulationParams,
        identity: Vector,
        body: Vector,
        eigen_spectrum: EigenSpectrum,
    ) -> Result<Self, ValidationError> {
        config.validate()?;
        params.validate()?;
        let d = config.dimensions;
        identity.ensure_dim(d)?;
        body.ensure_dim(d)?;
        if eigen_spectrum.len() != d {
            return Err(ValidationError::InvalidDimension {
                expected: d,
                actual: eigen_spectrum.len(),
            });
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = SimulationState {
            run_id: RunId::new(),
            sequence: 0,
            disparity: &body - &identity,
            identity,
            body,
            conscious: Vector::zeros(d),
            spectral_coefficients: Vector::zeros(d),
            eigen_spectrum,
            history: History::with_capacity(config.history_capacity),
        };
        info!(run_id = %state.run_id, dimensions = d, "simulation engine created from explicit state");

        Ok(Self::assemble(config, params, state, rng))
    }

    fn assemble(config: EngineConfig, params: SimulationParams, state: SimulationState, rng: StdRng) -> Self {
        Self {
            evolution: OperatorEvolution::new(config.evolution),
            config,
            params,
            run_state: RunState::Idle,
            state: Arc::new(state),
            rng,
            epoch: Instant::now(),
            last_timestamp: None,
            last_frame: None,
            frame_origin: None,
            last_dt: 0.0,
            subscribers: Vec::new(),
            dropped_snapshots: 0,
        }
    }

    fn fresh_state(config: &EngineConfig, mode: SimulationMode, rng: &mut StdRng) -> SimulationState {
        let d = config.dimensions;
        let identity = Vector::random(d, config.initial_magnitude, rng);
        let offset = Vector::random(d, config.initial_magnitude, rng);
        let body = &identity + &offset;

        SimulationState {
            run_id: RunId::new(),
            sequence: 0,
            disparity: &body - &identity,
            identity,
            body,
            conscious: Vector::zeros(d),
            spectral_coefficients: Vector::zeros(d),
            eigen_spectrum: config.baselines.get(mode).clone(),
            history: History::with_capacity(config.history_capacity),
        }
    }

    /// Shares this engine behind a mutex for use with a `ClockDriver`.
    #[must_use]
    pub fn into_shared(self) -> SharedEngine {
        Arc::new(Mutex::new(self))
    }

    /// Construction constants of this engine.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The live parameter record.
    #[must_use]
    pub const fn params(&self) -> SimulationParams {
        self.params
    }

    /// Idle or running.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Shorthand for `run_state() == RunState::Running`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    /// Identifier of the current run.
    #[must_use]
    pub fn run_id(&self) -> RunId {
        self.state.run_id
    }

    /// The current state as an immutable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<SimulationState> {
        Arc::clone(&self.state)
    }

    /// The clamped interval of the most recent step, in seconds.
    ///
    /// Recorded for observers only; step magnitudes do not depend on it.
    #[must_use]
    pub const fn last_dt(&self) -> f64 {
        self.last_dt
    }

    /// Subscribe to snapshots published after each state change.
    pub fn subscribe(&mut self) -> SnapshotStream {
        let (tx, rx) = bounded(self.config.subscriber_capacity);
        self.subscribers.push(tx);
        SnapshotStream::new(rx)
    }

    /// Live subscriber streams.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Snapshots dropped because a subscriber's buffer was full.
    #[must_use]
    pub const fn dropped_snapshots(&self) -> u64 {
        self.dropped_snapshots
    }

    /// Idle → Running. Returns false if already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.run_state = RunState::Running;
        info!(run_id = %self.state.run_id, "simulation started");
        true
    }

    /// Running → Idle. Returns false if already idle.
    ///
    /// Forgets the last frame time so that resuming does not see the paused gap.
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.run_state = RunState::Idle;
        self.last_frame = None;
        info!(run_id = %self.state.run_id, steps = self.state.sequence, "simulation stopped");
        true
    }

    /// Starts a new run: random identity/body, zeroed projection, baseline
    /// spectrum for the current mode, empty history. The run state is kept.
    pub fn reset(&mut self) {
        let state = Self::fresh_state(&self.config, self.params.mode, &mut self.rng);
        info!(
            previous_run_id = %self.state.run_id,
            run_id = %state.run_id,
            mode = %self.params.mode,
            "simulation reset"
        );
        self.state = Arc::new(state);
        self.epoch = Instant::now();
        self.last_timestamp = None;
        self.frame_origin = None;
        self.publish();
    }

    /// Replaces the parameter record wholesale.
    ///
    /// A mode change only moves the baseline; the live spectrum relaxes toward
    /// it over the following steps.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidParams` for a negative or non-finite rate.
    pub fn set_params(&mut self, params: SimulationParams) -> Result<(), ValidationError> {
        params.validate()?;
        if params.mode != self.params.mode {
            info!(from = %self.params.mode, to = %params.mode, "simulation mode changed");
        }
        debug!(?params, "simulation params replaced");
        self.params = params;
        Ok(())
    }

    /// Switches the baseline target without touching anything else.
    pub fn set_mode(&mut self, mode: SimulationMode) {
        if mode != self.params.mode {
            info!(from = %self.params.mode, to = %mode, "simulation mode changed");
        }
        self.params.mode = mode;
    }

    /// Immediately raises one eigenvalue by the configured bump.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidAxis` if `axis` is not in `[0, D)`.
    pub fn perturb_mode(&mut self, axis: usize) -> Result<(), ValidationError> {
        let next = self
            .evolution
            .perturb(&self.state.eigen_spectrum, axis, self.config.perturbation_bump)?;
        debug!(axis, gain = next[axis], "eigenvalue perturbed");
        Arc::make_mut(&mut self.state).eigen_spectrum = next;
        self.publish();
        Ok(())
    }

    /// Advances one step using a caller-measured interval in seconds.
    ///
    /// Returns `None` while idle. The record is stamped with the engine's
    /// monotonic clock.
    pub fn step(&mut self, dt_raw: f64) -> Option<HistoryRecord> {
        if !self.is_running() {
            return None;
        }
        let now = self.epoch.elapsed();
        Some(self.advance(dt_raw, now))
    }

    /// Frame callback: advances one step at the clock-supplied `frame_time`.
    ///
    /// The first frame after `start()` only establishes the reference time
    /// (dt = 0). Records are stamped relative to the first frame seen in the
    /// current run, continuing from the last recorded timestamp, so a reset
    /// restarts the timeline near zero. Returns `None` while idle.
    pub fn tick(&mut self, frame_time: Duration) -> Option<HistoryRecord> {
        if !self.is_running() {
            return None;
        }
        let last = self.last_frame.replace(frame_time).unwrap_or(frame_time);
        let dt_raw = frame_time.saturating_sub(last).as_secs_f64();

        let resume_at = self.last_timestamp.unwrap_or(Duration::ZERO);
        let origin = *self
            .frame_origin
            .get_or_insert_with(|| frame_time.saturating_sub(resume_at));
        Some(self.advance(dt_raw, frame_time.saturating_sub(origin)))
    }

    fn advance(&mut self, dt_raw: f64, now: Duration) -> HistoryRecord {
        let dt = dt_raw.clamp(0.0, self.config.dt_clamp_secs);
        if dt_raw > self.config.dt_clamp_secs {
            warn!(dt_raw, clamp = self.config.dt_clamp_secs, "frame interval clamped");
        }
        self.last_dt = dt;

        let params = self.params;
        let prev = Arc::clone(&self.state);
        let d = prev.dimensions();

        let eigen_spectrum = self.evolution.advance(
            &prev.eigen_spectrum,
            self.config.baselines.get(params.mode),
            &mut self.rng,
        );

        let disparity = &prev.body - &prev.identity;
        let spectral_coefficients = eigen_spectrum.project(&disparity);
        let conscious = spectral_coefficients.clone();

        let noise = Vector::random(d, params.noise_level, &mut self.rng);
        let body = &prev
            .body
            .add_scaled(&disparity, -params.regulation_rate)
            .add_scaled(&conscious, params.feedback_rate)
            + &noise;
        let identity = prev.identity.add_scaled(&conscious, params.identity_integration_rate);

        assert!(
            body.is_finite() && identity.is_finite(),
            "simulation diverged at step {}: body {body}, identity {identity}",
            prev.sequence + 1
        );

        let summary = SpectralSummary::of(&spectral_coefficients);
        let timestamp = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::from_nanos(1),
            _ => now,
        };
        self.last_timestamp = Some(timestamp);

        let record = HistoryRecord {
            sequence: prev.sequence + 1,
            intensity: summary.intensity,
            entropy: summary.entropy,
            focus: summary.focus,
            eigenvalues: eigen_spectrum.clone(),
            timestamp,
            recorded_at: Utc::now(),
        };
        drop(prev);

        // Commit. Readers holding the previous Arc keep the old state intact.
        let state = Arc::make_mut(&mut self.state);
        state.sequence = record.sequence;
        state.identity = identity;
        state.body = body;
        state.disparity = disparity;
        state.conscious = conscious;
        state.spectral_coefficients = spectral_coefficients;
        state.eigen_spectrum = eigen_spectrum;
        state.history.push(record.clone());
        debug_assert!(state.is_consistent());

        trace!(
            sequence = record.sequence,
            dt,
            intensity = record.intensity,
            entropy = record.entropy,
            focus = record.focus,
            "step committed"
        );
        self.publish();
        record
    }

    fn publish(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = Arc::clone(&self.state);
        let dropped = &mut self.dropped_snapshots;
        self.subscribers.retain(|tx| match tx.try_send(Arc::clone(&snapshot)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                *dropped += 1;
                warn!(sequence = snapshot.sequence, "snapshot stream full, dropping snapshot");
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
    }
}
