//! Running tally of a scan, fed one finished [`ScanResult`] at a time.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::error::ScanFailure;
use crate::models::ScanResult;

/// Failed symbols split by [`ScanFailure`] kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureTally {
    /// Provider errors.
    pub fetch: u64,
    /// Chains with no usable data.
    pub no_chain_data: u64,
    /// Symbols that hit the task ceiling.
    pub timeout: u64,
    /// Panicked or cancelled tasks.
    pub aborted: u64,
}

impl FailureTally {
    fn add(&mut self, failure: &ScanFailure) {
        let slot = match failure {
            ScanFailure::Fetch { .. } => &mut self.fetch,
            ScanFailure::NoChainData => &mut self.no_chain_data,
            ScanFailure::Timeout { .. } => &mut self.timeout,
            ScanFailure::TaskAborted { .. } => &mut self.aborted,
        };
        *slot += 1;
    }

    /// All failures.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.fetch + self.no_chain_data + self.timeout + self.aborted
    }
}

/// Symbol currently holding the best opportunity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leader {
    /// Ticker.
    pub symbol: String,
    /// Its opportunity score.
    pub score: f64,
}

/// Accumulates finished symbols for one scan.
///
/// Owned by the coordinating loop; nothing else writes to it.
#[derive(Debug)]
pub struct ProgressTracker {
    total: u64,
    succeeded: u64,
    failures: FailureTally,
    leader: Option<Leader>,
    started: Instant,
}

impl ProgressTracker {
    /// Start tracking a scan over `total` symbols.
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self {
            total,
            succeeded: 0,
            failures: FailureTally::default(),
            leader: None,
            started: Instant::now(),
        }
    }

    /// Fold one finished symbol into the tally.
    ///
    /// The leader only changes on a strictly higher score, so the earliest
    /// finisher keeps a tie.
    pub fn record(&mut self, result: &ScanResult) {
        if let Some(failure) = &result.failure {
            self.failures.add(failure);
            return;
        }

        self.succeeded += 1;
        let leads = self
            .leader
            .as_ref()
            .is_none_or(|leader| result.opportunity_score > leader.score);
        if leads {
            self.leader = Some(Leader {
                symbol: result.symbol.clone(),
                score: result.opportunity_score,
            });
        }
    }

    /// Snapshot of the tally so far.
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress {
            total: self.total,
            succeeded: self.succeeded,
            failures: self.failures,
            leader: self.leader.clone(),
            elapsed: self.started.elapsed(),
        }
    }
}

/// Progress snapshot handed to scan callbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Symbols in the scan.
    pub total: u64,
    /// Symbols analysed without failure.
    pub succeeded: u64,
    /// Failed symbols by kind.
    pub failures: FailureTally,
    /// Best-scoring successful symbol so far.
    pub leader: Option<Leader>,
    /// Time since the scan started.
    pub elapsed: Duration,
}

impl Progress {
    /// Symbols finished, successfully or not.
    #[must_use]
    pub const fn completed(&self) -> u64 {
        self.succeeded + self.failures.total()
    }

    /// Symbols that failed.
    #[must_use]
    pub const fn failed(&self) -> u64 {
        self.failures.total()
    }

    /// Completion percentage; an empty scan is complete.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.completed() as f64 / self.total as f64) * 100.0
        }
    }

    /// Whether every symbol has finished.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.completed() >= self.total
    }

    /// Remaining time at the observed pace, `None` before the first symbol.
    #[must_use]
    pub fn eta(&self) -> Option<Duration> {
        let completed = self.completed();
        if completed == 0 {
            return None;
        }
        let remaining = self.total.saturating_sub(completed);
        Some(self.elapsed.mul_f64(remaining as f64 / completed as f64))
    }
}
