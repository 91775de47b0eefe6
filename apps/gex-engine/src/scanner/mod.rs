//! Symbol universe scanning.
//!
//! - [`ConcurrentScanner`]: async fan-out over a [`ChainProvider`](crate::infrastructure::ChainProvider)
//!   with a bounded worker pool and per-symbol timeout
//! - [`BatchAnalyzer`]: Rayon data-parallel evaluation of in-memory snapshots
//! - [`OpportunityScorer`]: composite 0 to 100 score per symbol
//! - [`ScanStatistics`] / [`ResultFilter`]: summaries and views over results

mod batch;
mod error;
mod executor;
mod progress;
mod score;
mod statistics;

pub use batch::BatchAnalyzer;
pub use error::ScanFailure;
pub use executor::{ConcurrentScanner, ProgressCallback};
pub use progress::{FailureTally, Leader, Progress, ProgressTracker};
pub use score::OpportunityScorer;
pub use statistics::{ResultFilter, ScanStatistics};

use crate::models::ScanResult;

/// Sort results by descending opportunity score, then descending dealer pain.
///
/// Stable: results with equal keys keep their relative order.
pub fn rank_results(results: &mut [ScanResult]) {
    results.sort_by(|a, b| {
        b.opportunity_score
            .total_cmp(&a.opportunity_score)
            .then_with(|| b.dealer_pain().total_cmp(&a.dealer_pain()))
    });
}
