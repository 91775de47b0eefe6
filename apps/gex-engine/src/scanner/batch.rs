//! Offline batch analysis over already-fetched snapshots using Rayon.

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{Level, debug, info, span};

use super::progress::ProgressTracker;
use super::rank_results;
use crate::engine::GexEngine;
use crate::models::{ChainSnapshot, MarketContext, ScanResult};

/// Evaluates snapshots in parallel on the Rayon pool.
///
/// The same ranking as [`ConcurrentScanner`](super::ConcurrentScanner), for
/// chains that are already in memory.
pub struct BatchAnalyzer {
    engine: Arc<GexEngine>,
    min_parallel_jobs: usize,
}

impl BatchAnalyzer {
    /// Create a batch analyzer.
    #[must_use]
    pub const fn new(engine: Arc<GexEngine>, min_parallel_jobs: usize) -> Self {
        Self {
            engine,
            min_parallel_jobs,
        }
    }

    /// Evaluate every snapshot and return ranked results.
    #[must_use]
    pub fn analyze_snapshots(
        &self,
        snapshots: &[ChainSnapshot],
        context: &MarketContext,
        min_confidence: f64,
    ) -> Vec<ScanResult> {
        if snapshots.is_empty() {
            return Vec::new();
        }

        let start_time = Instant::now();

        info!(
            "Starting batch analysis: {} snapshots, {} threads",
            snapshots.len(),
            rayon::current_num_threads()
        );

        let mut results: Vec<ScanResult> = if snapshots.len() >= self.min_parallel_jobs {
            snapshots
                .par_iter()
                .map(|snapshot| self.evaluate(snapshot, context, min_confidence))
                .collect()
        } else {
            snapshots
                .iter()
                .map(|snapshot| self.evaluate(snapshot, context, min_confidence))
                .collect()
        };
        rank_results(&mut results);

        let mut tracker = ProgressTracker::new(snapshots.len() as u64);
        for result in &results {
            tracker.record(result);
        }
        let summary = tracker.progress();

        info!(
            no_chain_data = summary.failures.no_chain_data,
            leader = summary.leader.as_ref().map_or("-", |l| l.symbol.as_str()),
            "Batch analysis complete: {}/{} succeeded in {:.2}s",
            summary.succeeded,
            summary.total,
            start_time.elapsed().as_secs_f64()
        );

        results
    }

    fn evaluate(
        &self,
        snapshot: &ChainSnapshot,
        context: &MarketContext,
        min_confidence: f64,
    ) -> ScanResult {
        let _span = span!(Level::DEBUG, "batch_symbol", symbol = %snapshot.symbol).entered();

        let result = self
            .engine
            .evaluate(&snapshot.symbol, Some(snapshot), context, min_confidence);
        debug!(score = result.opportunity_score, "Evaluated snapshot");

        result
    }
}
