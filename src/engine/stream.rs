use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};

use crate::error::{ExecutionError, SpectralError, SpectralResult};

use super::state::SimulationState;

/// A subscription stream of published snapshots.
///
/// Receives a new `Arc<SimulationState>` after every committed step, reset and
/// perturbation. Dropping the stream unsubscribes; the engine prunes the
/// disconnected sender on its next publish.
#[derive(Debug)]
pub struct SnapshotStream {
    rx: Receiver<Arc<SimulationState>>,
}

impl SnapshotStream {
    pub(crate) fn new(rx: Receiver<Arc<SimulationState>>) -> Self {
        Self { rx }
    }

    /// Receive the next snapshot (blocking).
    pub fn recv(&self) -> SpectralResult<Arc<SimulationState>> {
        self.rx.recv().map_err(|_| disconnected())
    }

    /// Receive the next snapshot with a timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> SpectralResult<Arc<SimulationState>> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => SpectralError::Execution(ExecutionError::Timeout {
                duration_ms: timeout.as_millis().min(u128::from(u64::MAX)) as u64,
            }),
            RecvTimeoutError::Disconnected => disconnected(),
        })
    }

    /// Non-blocking receive. `Ok(None)` when nothing is queued.
    pub fn try_recv(&self) -> SpectralResult<Option<Arc<SimulationState>>> {
        match self.rx.try_recv() {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(disconnected()),
        }
    }

    /// Drains everything queued and returns the newest snapshot, if any.
    #[must_use]
    pub fn latest(&self) -> Option<Arc<SimulationState>> {
        self.rx.try_iter().last()
    }

    /// Number of snapshots waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// True when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

fn disconnected() -> SpectralError {
    SpectralError::Execution(ExecutionError::Disconnected {
        path: "snapshot_stream".to_string(),
    })
}
