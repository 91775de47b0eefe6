//! Gamma exposure profile value objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gex::GexExposure;
use crate::stress::{MmStatus, StressMetrics};

/// Exposure aggregated across every retained expiration at one strike.
///
/// Put exposure is stored negative: dealers are treated as structurally
/// short puts from a hedging-flow perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikeAggregate {
    /// Strike price.
    pub strike: f64,
    /// Call gamma exposure (>= 0).
    pub call_gex: f64,
    /// Put gamma exposure (<= 0).
    pub put_gex: f64,
    /// Running sum of `call_gex + put_gex` over ascending strikes, up to and
    /// including this one. Filled in when the exposure profile is assembled.
    pub cumulative_gex: f64,
    /// Call open interest.
    pub call_oi: u64,
    /// Put open interest.
    pub put_oi: u64,
    /// Call volume.
    pub call_volume: u64,
    /// Put volume.
    pub put_volume: u64,
}

impl StrikeAggregate {
    /// Create an aggregate row with exposure only.
    #[must_use]
    pub const fn new(strike: f64, call_gex: f64, put_gex: f64) -> Self {
        Self {
            strike,
            call_gex,
            put_gex,
            cumulative_gex: 0.0,
            call_oi: 0,
            put_oi: 0,
            call_volume: 0,
            put_volume: 0,
        }
    }

    /// Set open interest for both sides.
    #[must_use]
    pub const fn with_open_interest(mut self, call_oi: u64, put_oi: u64) -> Self {
        self.call_oi = call_oi;
        self.put_oi = put_oi;
        self
    }

    /// Set volume for both sides.
    #[must_use]
    pub const fn with_volume(mut self, call_volume: u64, put_volume: u64) -> Self {
        self.call_volume = call_volume;
        self.put_volume = put_volume;
        self
    }

    /// Net exposure at this strike.
    #[must_use]
    pub fn net_gex(&self) -> f64 {
        self.call_gex + self.put_gex
    }

    /// Gross (unsigned) exposure at this strike.
    #[must_use]
    pub fn gross_gex(&self) -> f64 {
        self.call_gex.abs() + self.put_gex.abs()
    }

    /// Open interest across both sides.
    #[must_use]
    pub const fn total_oi(&self) -> u64 {
        self.call_oi + self.put_oi
    }

    /// Volume across both sides.
    #[must_use]
    pub const fn total_volume(&self) -> u64 {
        self.call_volume + self.put_volume
    }
}

/// A strike with concentrated exposure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    /// Strike price.
    pub strike: f64,
    /// Exposure at the strike (positive for call walls, negative for put walls).
    pub gex: f64,
}

/// Dealer gamma regime implied by the sign of net exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GammaRegime {
    /// Dealers long gamma: hedging dampens moves.
    PositiveGamma,
    /// Dealers short gamma: hedging amplifies moves.
    NegativeGamma,
    /// No net exposure.
    Neutral,
}

impl GammaRegime {
    /// Classify from net exposure.
    #[must_use]
    pub fn from_net_gex(net_gex: f64) -> Self {
        if net_gex > 0.0 {
            Self::PositiveGamma
        } else if net_gex < 0.0 {
            Self::NegativeGamma
        } else {
            Self::Neutral
        }
    }
}

impl std::fmt::Display for GammaRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PositiveGamma => write!(f, "POSITIVE_GAMMA"),
            Self::NegativeGamma => write!(f, "NEGATIVE_GAMMA"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Complete gamma exposure profile for one symbol.
///
/// Built fresh per analysis and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GexProfile {
    exposure: GexExposure,
    stress: StressMetrics,
    volatility_index: f64,
    regime: GammaRegime,
    as_of: DateTime<Utc>,
}

impl GexProfile {
    /// Combine an exposure profile with its stress metrics.
    #[must_use]
    pub fn new(
        exposure: GexExposure,
        stress: StressMetrics,
        volatility_index: f64,
        as_of: DateTime<Utc>,
    ) -> Self {
        let regime = GammaRegime::from_net_gex(exposure.net_gex());
        Self {
            exposure,
            stress,
            volatility_index,
            regime,
            as_of,
        }
    }

    /// Underlying symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        self.exposure.symbol()
    }

    /// Spot price used for the computation.
    #[must_use]
    pub const fn current_price(&self) -> f64 {
        self.exposure.current_price()
    }

    /// Price at which cumulative net exposure changes sign.
    #[must_use]
    pub const fn gamma_flip(&self) -> f64 {
        self.exposure.gamma_flip()
    }

    /// Net exposure (calls + puts).
    #[must_use]
    pub const fn net_gex(&self) -> f64 {
        self.exposure.net_gex()
    }

    /// Total call exposure.
    #[must_use]
    pub const fn total_call_gex(&self) -> f64 {
        self.exposure.total_call_gex()
    }

    /// Total put exposure (negative).
    #[must_use]
    pub const fn total_put_gex(&self) -> f64 {
        self.exposure.total_put_gex()
    }

    /// Strike rows in ascending strike order.
    #[must_use]
    pub fn strikes(&self) -> &[StrikeAggregate] {
        self.exposure.strikes()
    }

    /// Up to five strongest call walls, largest first.
    #[must_use]
    pub fn call_walls(&self) -> &[Wall] {
        self.exposure.call_walls()
    }

    /// Up to five strongest put walls, most negative first.
    #[must_use]
    pub fn put_walls(&self) -> &[Wall] {
        self.exposure.put_walls()
    }

    /// Total volume across strikes.
    #[must_use]
    pub const fn total_volume(&self) -> u64 {
        self.exposure.total_volume()
    }

    /// Total open interest across strikes.
    #[must_use]
    pub const fn total_oi(&self) -> u64 {
        self.exposure.total_oi()
    }

    /// Percent distance from spot to the gamma flip.
    #[must_use]
    pub const fn distance_to_flip(&self) -> f64 {
        self.exposure.distance_to_flip()
    }

    /// Dealer pain, 0 to 100.
    #[must_use]
    pub const fn dealer_pain(&self) -> f64 {
        self.stress.dealer_pain
    }

    /// Market maker status.
    #[must_use]
    pub const fn mm_status(&self) -> MmStatus {
        self.stress.mm_status
    }

    /// Order flow toxicity, -100 to 100.
    #[must_use]
    pub const fn toxicity_score(&self) -> f64 {
        self.stress.toxicity_score
    }

    /// Full stress metrics.
    #[must_use]
    pub const fn stress(&self) -> &StressMetrics {
        &self.stress
    }

    /// Exposure portion of the profile.
    #[must_use]
    pub const fn exposure(&self) -> &GexExposure {
        &self.exposure
    }

    /// Volatility index level supplied with the analysis.
    #[must_use]
    pub const fn volatility_index(&self) -> f64 {
        self.volatility_index
    }

    /// Gamma regime.
    #[must_use]
    pub const fn regime(&self) -> GammaRegime {
        self.regime
    }

    /// Timestamp of the underlying chain data.
    #[must_use]
    pub const fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regime_from_net_gex() {
        assert_eq!(GammaRegime::from_net_gex(1.0), GammaRegime::PositiveGamma);
        assert_eq!(GammaRegime::from_net_gex(-1.0), GammaRegime::NegativeGamma);
        assert_eq!(GammaRegime::from_net_gex(0.0), GammaRegime::Neutral);
    }

    #[test]
    fn test_strike_aggregate_totals() {
        let row = StrikeAggregate::new(100.0, 3e8, -1e8)
            .with_open_interest(1500, 900)
            .with_volume(40, 60);
        assert_eq!(row.net_gex(), 2e8);
        assert_eq!(row.gross_gex(), 4e8);
        assert_eq!(row.total_oi(), 2400);
        assert_eq!(row.total_volume(), 100);
    }
}
