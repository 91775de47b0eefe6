//! Profile fixtures shared by the signal tests.

use chrono::{DateTime, Utc};

use crate::gex::GexExposure;
use crate::models::{GexProfile, StrikeAggregate};
use crate::stress::{MmStatus, StressMetrics};

/// Profile over `rows` with the given dealer pain and neutral status.
pub fn profile(symbol: &str, spot: f64, rows: Vec<StrikeAggregate>, dealer_pain: f64) -> GexProfile {
    let exposure = GexExposure::from_strikes(symbol, spot, rows);
    let stress = StressMetrics {
        dealer_pain,
        pin_risk: 0.0,
        institutional_flow: false,
        toxicity_score: 0.0,
        mm_status: MmStatus::Neutral,
    };
    GexProfile::new(exposure, stress, 15.0, DateTime::<Utc>::UNIX_EPOCH)
}

/// Net GEX 3.2e9, flip at 101.5, strongest call wall 103 (2.5e9), strongest
/// put wall 96 (-1.2e9), spot 100.
pub fn positive_gamma_range(symbol: &str) -> GexProfile {
    profile(
        symbol,
        100.0,
        vec![
            StrikeAggregate::new(90.0, 0.0, -3e8),
            StrikeAggregate::new(96.0, 1e8, -1.2e9),
            StrikeAggregate::new(100.0, 7e8, -5e8),
            StrikeAggregate::new(103.0, 2.5e9, -1e8),
            StrikeAggregate::new(110.0, 2e9, 0.0),
        ],
        10.0,
    )
}
