//! Bounded per-step history.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::operator::EigenSpectrum;
use crate::statistics::SpectralSummary;

/// Default number of retained records.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Immutable snapshot of one committed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// 1-based step number within the current run.
    pub sequence: u64,
    /// Norm of the conscious vector.
    pub intensity: f64,
    /// Entropy of the coefficient magnitudes.
    pub entropy: f64,
    /// Largest coefficient's share of the total magnitude.
    pub focus: f64,
    /// Spectrum used for this step's projection.
    pub eigenvalues: EigenSpectrum,
    /// Monotonic time since the run started. Strictly increasing within a run.
    pub timestamp: Duration,
    /// Wall-clock time the step was committed.
    pub recorded_at: DateTime<Utc>,
}

impl HistoryRecord {
    /// The three statistics as one value.
    #[must_use]
    pub const fn summary(&self) -> SpectralSummary {
        SpectralSummary {
            intensity: self.intensity,
            entropy: self.entropy,
            focus: self.focus,
        }
    }
}

/// Oldest-first FIFO ring of `HistoryRecord`s.
///
/// Pushing past capacity evicts the oldest record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    capacity: usize,
    records: VecDeque<HistoryRecord>,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    /// Creates an empty history. A zero capacity is raised to 1.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: VecDeque::new(),
        }
    }

    /// Appends a record, evicting the oldest one when full.
    pub fn push(&mut self, record: HistoryRecord) {
        debug_assert!(
            self.records.back().map_or(true, |last| last.timestamp < record.timestamp),
            "history timestamps must be strictly increasing"
        );
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Maximum retained records.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records currently retained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True before the first step of a run.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent record.
    #[must_use]
    pub fn latest(&self) -> Option<&HistoryRecord> {
        self.records.back()
    }

    /// Oldest retained record.
    #[must_use]
    pub fn oldest(&self) -> Option<&HistoryRecord> {
        self.records.front()
    }

    /// Records oldest-first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryRecord> + ExactSizeIterator {
        self.records.iter()
    }

    /// Owned copy of the records, oldest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<HistoryRecord> {
        self.records.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sequence: u64) -> HistoryRecord {
        HistoryRecord {
            sequence,
            intensity: 1.0,
            entropy: 0.0,
            focus: 1.0,
            eigenvalues: EigenSpectrum::from([1.0, 0.5]),
            timestamp: Duration::from_millis(sequence * 16),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_push_within_capacity() {
        let mut h = History::with_capacity(3);
        h.push(record(1));
        h.push(record(2));
        assert_eq!(h.len(), 2);
        assert_eq!(h.oldest().unwrap().sequence, 1);
        assert_eq!(h.latest().unwrap().sequence, 2);
    }

    #[test]
    fn test_fifo_eviction() {
        let mut h = History::default();
        for i in 1..=250 {
            h.push(record(i));
        }
        assert_eq!(h.len(), 100);
        assert_eq!(h.capacity(), 100);
        let seqs: Vec<u64> = h.iter().map(|r| r.sequence).collect();
        assert_eq!(seqs, (151..=250).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let mut h = History::with_capacity(0);
        h.push(record(1));
        h.push(record(2));
        assert_eq!(h.len(), 1);
        assert_eq!(h.latest().unwrap().sequence, 2);
    }
}
