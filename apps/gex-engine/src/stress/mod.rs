//! Dealer (market maker) stress analysis.
//!
//! Heuristic scorers over a gamma exposure profile:
//!
//! - **Dealer pain**: how costly hedging currently is, 0 to 100
//! - **Toxicity**: signed "smart money" heuristic, -100 to 100
//! - **MM status**: flat threshold classifier, recomputed on every call
//! - **Patterns**: named setups with urgency, used to rank scan results
//!
//! None of these scores are statistically validated. They reproduce fixed
//! formulas and are tested as such.

mod analyzer;
mod metrics;
mod patterns;
mod toxicity;

pub use analyzer::StressAnalyzer;
pub use metrics::{MmStatus, StressMetrics};
pub use patterns::{MmPattern, PatternDetector, PatternKind, PatternScan, Urgency};
pub use toxicity::toxicity_score;
