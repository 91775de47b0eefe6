//! Market maker stress analyzer.

use chrono::NaiveDateTime;

use super::metrics::{MmStatus, StressMetrics};
use super::toxicity::toxicity_score;
use crate::calendar::SessionCalendar;
use crate::config::{DealerPainConfig, StressConfig};
use crate::gex::GexExposure;
use crate::models::ChainSnapshot;

/// Derives dealer pain, toxicity and MM status from an exposure profile.
///
/// Stateless apart from configuration; safe to share across tasks.
#[derive(Debug, Clone, Default)]
pub struct StressAnalyzer {
    config: StressConfig,
    calendar: SessionCalendar,
}

impl StressAnalyzer {
    /// Create an analyzer.
    #[must_use]
    pub const fn new(config: StressConfig, calendar: SessionCalendar) -> Self {
        Self { config, calendar }
    }

    /// Stress configuration.
    #[must_use]
    pub const fn config(&self) -> &StressConfig {
        &self.config
    }

    /// Compute stress metrics.
    ///
    /// `now` only affects the institutional-window toxicity bonus.
    #[must_use]
    pub fn analyze(
        &self,
        exposure: &GexExposure,
        chain: &ChainSnapshot,
        now: NaiveDateTime,
    ) -> StressMetrics {
        let pain_config = &self.config.dealer_pain;

        let pin_risk = pin_risk(exposure, pain_config.pin_band_pct);
        let institutional_flow = institutional_flow(exposure, pain_config.institutional_ratio);
        let dealer_pain = dealer_pain(
            exposure.net_gex(),
            exposure.distance_to_flip(),
            pin_risk,
            institutional_flow,
            pain_config,
        );

        let toxicity_score = toxicity_score(
            chain,
            exposure.strikes(),
            self.calendar.is_institutional_window(now),
            &self.config.toxicity,
        );

        let mm_status = MmStatus::classify(
            dealer_pain,
            exposure.net_gex(),
            exposure.distance_to_flip(),
            &self.config.status,
        );

        StressMetrics {
            dealer_pain,
            pin_risk,
            institutional_flow,
            toxicity_score,
            mm_status,
        }
    }
}

/// Additive dealer pain score, clipped to [0, 100].
#[must_use]
pub fn dealer_pain(
    net_gex: f64,
    distance_to_flip: f64,
    pin_risk: f64,
    institutional_flow: bool,
    config: &DealerPainConfig,
) -> f64 {
    let mut pain = 0.0;

    if net_gex < 0.0 {
        pain += (net_gex.abs() / 1e9 * config.points_per_billion).min(config.negative_gex_cap);
    }

    let distance = distance_to_flip.abs();
    if distance < config.near_flip_distance {
        pain += config.near_flip_points;
    } else if distance < config.close_flip_distance {
        pain += config.close_flip_points;
    }

    if pin_risk > config.pin_risk_threshold {
        pain += config.pin_points;
    }

    if institutional_flow {
        pain += config.institutional_points;
    }

    if pain.is_finite() {
        pain.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Share of gross exposure within `band_pct` of spot, 0 to 100.
fn pin_risk(exposure: &GexExposure, band_pct: f64) -> f64 {
    let total: f64 = exposure.strikes().iter().map(|row| row.gross_gex()).sum();
    if total <= 0.0 || !total.is_finite() {
        return 0.0;
    }
    let near: f64 = exposure
        .strikes_near_spot(band_pct)
        .map(|row| row.gross_gex())
        .sum();
    (near / total * 100.0).clamp(0.0, 100.0)
}

fn institutional_flow(exposure: &GexExposure, ratio: f64) -> bool {
    exposure.total_oi() > 0 && exposure.total_volume() as f64 / exposure.total_oi() as f64 > ratio
}
