//! Frame clock and the thread that drives an engine from it.
//!
//! A `FrameClock` supplies monotonically increasing frame times. The
//! `ClockDriver` owns a named background thread that waits on a
//! `crossbeam_channel::tick` frame source and calls `SimulationEngine::tick`
//! once per frame. Steps never overlap: each one runs to completion under the
//! engine mutex before the next frame is taken.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, tick, Receiver, Sender};
use tracing::{debug, error, info};

use crate::engine::{SharedEngine, SimulationEngine, SimulationState};
use crate::error::{ExecutionError, SpectralError, SpectralResult};

/// Source of frame timestamps.
pub trait FrameClock: Send + Sync {
    /// Time of the current frame relative to the clock's origin. Never decreases.
    fn now(&self) -> Duration;
}

/// Wall-clock frames from `Instant`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Clock whose origin is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Externally advanced clock for deterministic runs and tests.
///
/// Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Clock starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward and returns the new time.
    pub fn advance(&self, by: Duration) -> Duration {
        let by = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        let now = self.nanos.fetch_add(by, Ordering::AcqRel).saturating_add(by);
        Duration::from_nanos(now)
    }
}

impl FrameClock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Acquire))
    }
}

/// Driver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockDriverConfig {
    /// Time between frames.
    pub frame_interval: Duration,
}

impl Default for ClockDriverConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
        }
    }
}

/// Locks a shared engine, reporting a poisoned mutex as an execution error.
pub fn lock_engine(engine: &SharedEngine) -> SpectralResult<MutexGuard<'_, SimulationEngine>> {
    engine.lock().map_err(|_| {
        SpectralError::Execution(ExecutionError::LockPoisoned {
            path: "engine".to_string(),
        })
    })
}

struct FrameWorker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Runs a shared engine at a fixed frame cadence on a background thread.
pub struct ClockDriver {
    engine: SharedEngine,
    clock: Arc<dyn FrameClock>,
    config: ClockDriverConfig,
    worker: Option<FrameWorker>,
}

impl std::fmt::Debug for ClockDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClockDriver")
            .field("config", &self.config)
            .field("running", &self.worker.is_some())
            .finish_non_exhaustive()
    }
}

impl ClockDriver {
    /// Creates a stopped driver.
    pub fn new(engine: SharedEngine, clock: impl FrameClock + 'static, config: ClockDriverConfig) -> Self {
        Self {
            engine,
            clock: Arc::new(clock),
            config,
            worker: None,
        }
    }

    /// Driver using wall-clock frames and the default cadence.
    #[must_use]
    pub fn with_system_clock(engine: SharedEngine) -> Self {
        Self::new(engine, SystemClock::new(), ClockDriverConfig::default())
    }

    /// The driven engine.
    #[must_use]
    pub const fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    /// Whether the frame thread is alive.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Current engine snapshot.
    pub fn snapshot(&self) -> SpectralResult<Arc<SimulationState>> {
        Ok(lock_engine(&self.engine)?.snapshot())
    }

    /// Starts the engine and the frame thread. Returns `Ok(false)` if already running.
    ///
    /// # Errors
    ///
    /// Fails if the engine lock is poisoned or the thread cannot be spawned.
    pub fn start(&mut self) -> SpectralResult<bool> {
        if self.worker.is_some() {
            return Ok(false);
        }

        lock_engine(&self.engine)?.start();

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let frames = tick(self.config.frame_interval.max(Duration::from_millis(1)));
        let engine = Arc::clone(&self.engine);
        let clock = Arc::clone(&self.clock);

        let spawned = thread::Builder::new()
            .name("spectral-clock".to_string())
            .spawn(move || frame_loop(engine, clock, frames, stop_rx));
        let handle = match spawned {
            Ok(handle) => handle,
            Err(err) => {
                lock_engine(&self.engine)?.stop();
                return Err(SpectralError::Execution(ExecutionError::ClockSpawn {
                    message: err.to_string(),
                }));
            }
        };

        info!(frame_interval_ms = self.config.frame_interval.as_millis() as u64, "clock driver started");
        self.worker = Some(FrameWorker { stop_tx, handle });
        Ok(true)
    }

    /// Stops the frame thread and the engine. Returns `Ok(false)` if already stopped.
    ///
    /// Waits for an in-flight step to finish; steps are never cancelled midway.
    ///
    /// # Errors
    ///
    /// Fails if the engine lock is poisoned, e.g. after a step panicked.
    pub fn stop(&mut self) -> SpectralResult<bool> {
        let Some(worker) = self.worker.take() else {
            return Ok(false);
        };

        let _ = worker.stop_tx.send(());
        if worker.handle.join().is_err() {
            error!("clock thread panicked");
        }

        lock_engine(&self.engine)?.stop();
        info!("clock driver stopped");
        Ok(true)
    }
}

impl Drop for ClockDriver {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn frame_loop(
    engine: SharedEngine,
    clock: Arc<dyn FrameClock>,
    frames: Receiver<Instant>,
    stop_rx: Receiver<()>,
) {
    loop {
        select! {
            recv(stop_rx) -> _ => break,
            recv(frames) -> _ => {
                let frame_time = clock.now();
                let Ok(mut guard) = engine.lock() else {
                    error!("engine lock poisoned, clock thread exiting");
                    break;
                };
                if let Some(record) = guard.tick(frame_time) {
                    debug!(sequence = record.sequence, "frame");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::EngineConfig;

    #[test]
    fn manual_clock_advances_and_is_shared() {
        let clock = ManualClock::new();
        let view = clock.clone();
        assert_eq!(view.now(), Duration::ZERO);
        assert_eq!(clock.advance(Duration::from_millis(16)), Duration::from_millis(16));
        clock.advance(Duration::from_millis(16));
        assert_eq!(view.now(), Duration::from_millis(32));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let engine = SimulationEngine::new(EngineConfig::seeded(1)).unwrap().into_shared();
        let mut driver = ClockDriver::new(
            engine,
            ManualClock::new(),
            ClockDriverConfig {
                frame_interval: Duration::from_millis(2),
            },
        );

        assert!(driver.start().unwrap());
        assert!(!driver.start().unwrap());
        assert!(driver.is_running());
        assert!(lock_engine(driver.engine()).unwrap().is_running());

        assert!(driver.stop().unwrap());
        assert!(!driver.stop().unwrap());
        assert!(!lock_engine(driver.engine()).unwrap().is_running());
    }

    #[test]
    fn poisoned_lock_is_reported() {
        let engine = SimulationEngine::new(EngineConfig::seeded(1)).unwrap().into_shared();
        let poisoner = Arc::clone(&engine);
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the engine lock");
        })
        .join();

        let err = lock_engine(&engine).unwrap_err();
        assert!(err.is_execution());
    }
}
