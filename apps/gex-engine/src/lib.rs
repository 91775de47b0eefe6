// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::items_after_statements,
        clippy::unreadable_literal
    )
)]

//! GEX Engine - Dealer Gamma Exposure Analytics
//!
//! Computes strike-level gamma exposure from option chain snapshots, derives
//! dealer stress metrics, and ranks rule-based trade signals across a symbol
//! universe.
//!
//! # Pipeline
//!
//! - **pricing**: Black-Scholes gamma with implied volatility normalisation
//! - **gex**: chain snapshot to strike-indexed exposure, gamma flip, walls
//! - **stress**: dealer pain, order flow toxicity, MM status, MM patterns
//! - **signals**: squeeze, premium selling and iron condor rule families
//! - **engine**: single-symbol analysis combining the stages above
//! - **scanner**: bounded concurrent fan-out, opportunity scoring, ranking
//!
//! # Collaborators
//!
//! - **infrastructure**: `ChainProvider` port with in-memory and snapshot
//!   directory adapters
//! - **calendar**: session hours, OPEX and quad witching windows, injected clock
//! - **config**: YAML configuration with environment interpolation
//! - **observability** / **telemetry**: Prometheus metrics and tracing setup

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Core Analytics
// =============================================================================

/// Closed-form gamma pricing.
pub mod pricing;

/// Exposure profile construction.
pub mod gex;

/// Dealer stress metrics and pattern detection.
pub mod stress;

/// Rule-based signal generation.
pub mod signals;

/// Value objects.
pub mod models;

/// Single-symbol analysis pipeline.
pub mod engine;

/// Symbol universe scanning.
pub mod scanner;

// =============================================================================
// Collaborators and Ambient Concerns
// =============================================================================

/// Market session calendar and clocks.
pub mod calendar;

/// Configuration loading and validation.
pub mod config;

/// Chain provider port and adapters.
pub mod infrastructure;

/// Prometheus metrics.
pub mod observability;

/// Tracing subscriber and OpenTelemetry setup.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use calendar::{Clock, FixedClock, SessionCalendar, SystemClock};
pub use config::{Config, ConfigError, load_config, load_config_from_string};
pub use engine::{Analysis, GexEngine};
pub use gex::{GexExposure, GexProfileBuilder};
pub use infrastructure::{
    ChainProvider, ChainProviderError, InMemoryChainProvider, SnapshotDirectory,
};
pub use models::{
    ChainSnapshot, ExpirationChain, GammaRegime, GexProfile, MarketContext, OptionContract,
    ScanResult, Signal, SignalType, StrikeAggregate, TradeDirection, Wall,
};
pub use pricing::GammaModel;
pub use scanner::{
    BatchAnalyzer, ConcurrentScanner, OpportunityScorer, Progress, ResultFilter, ScanFailure,
    ScanStatistics,
};
pub use signals::SignalGenerator;
pub use stress::{MmPattern, MmStatus, PatternDetector, PatternKind, StressAnalyzer, StressMetrics};
