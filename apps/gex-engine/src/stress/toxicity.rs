//! Order flow toxicity heuristic.
//!
//! Positive scores lean institutional ("smart money"), negative scores lean
//! retail. The formula is a fixed heuristic with no ground truth behind it.

use crate::config::ToxicityConfig;
use crate::models::{ChainSnapshot, StrikeAggregate};

/// Score order flow toxicity, clipped to [-100, 100].
///
/// Starts at 0 and applies, independently:
/// - `+large_oi_points` when more than `large_oi_strikes` strikes carry open
///   interest above `large_oi` on either side
/// - `-near_term_points` when expirations inside `near_term_dte` days carry
///   more than `near_term_share` of total volume
/// - `-far_otm_points` when more than `far_otm_contracts` traded contracts sit
///   beyond `far_otm_pct` of spot
/// - `-small_lot_points` when more than `small_lot_strikes` strikes traded
///   fewer than `small_lot_volume` contracts
/// - `+institutional_window_points` inside the first or last session hour
#[must_use]
pub fn toxicity_score(
    chain: &ChainSnapshot,
    strikes: &[StrikeAggregate],
    in_institutional_window: bool,
    config: &ToxicityConfig,
) -> f64 {
    let mut score = 0.0;

    let large_oi_strikes = strikes
        .iter()
        .filter(|row| row.call_oi > config.large_oi || row.put_oi > config.large_oi)
        .count();
    if large_oi_strikes > config.large_oi_strikes {
        score += config.large_oi_points;
    }

    let total_volume = chain.total_volume();
    if total_volume > 0 {
        let near_term_volume: u64 = chain
            .expirations
            .values()
            .filter(|exp| exp.days_to_expiry <= config.near_term_dte)
            .map(|exp| exp.total_volume())
            .sum();
        if near_term_volume as f64 / total_volume as f64 > config.near_term_share {
            score -= config.near_term_points;
        }
    }

    if chain.spot > 0.0 {
        let far_otm_contracts = chain
            .expirations
            .values()
            .flat_map(|exp| exp.contracts())
            .filter(|c| c.volume > 0)
            .filter(|c| ((c.strike - chain.spot) / chain.spot).abs() * 100.0 > config.far_otm_pct)
            .count();
        if far_otm_contracts > config.far_otm_contracts {
            score -= config.far_otm_points;
        }
    }

    let small_lot_strikes = strikes
        .iter()
        .filter(|row| row.total_volume() < config.small_lot_volume)
        .count();
    if small_lot_strikes > config.small_lot_strikes {
        score -= config.small_lot_points;
    }

    if in_institutional_window {
        score += config.institutional_window_points;
    }

    score.clamp(-100.0, 100.0)
}
