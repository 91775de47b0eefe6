//! Value objects shared across the analytics pipeline.
//!
//! Data flows strictly downward:
//! chain snapshot -> exposure profile -> stress metrics -> signals -> scan result.

mod chain;
mod profile;
mod scan;
mod signal;

pub use chain::{ChainSnapshot, ExpirationChain, OptionContract};
pub use profile::{GammaRegime, GexProfile, StrikeAggregate, Wall};
pub use scan::{MarketContext, ScanResult};
pub use signal::{Signal, SignalType, TradeDirection, round_confidence};
