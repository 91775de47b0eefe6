//! Stress metric value objects.

use serde::{Deserialize, Serialize};

use crate::config::StatusConfig;

/// Categorical market maker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MmStatus {
    /// Hedging losses are extreme.
    Trapped,
    /// Hedging is chasing price.
    Scrambling,
    /// Large positive gamma, dealers pin price.
    Defending,
    /// Spot sits next to the gamma flip.
    Vulnerable,
    /// Nothing notable.
    Neutral,
}

impl MmStatus {
    /// Classify from dealer pain, net GEX and flip distance.
    ///
    /// First matching rule wins; no history is kept between calls.
    #[must_use]
    pub fn classify(
        dealer_pain: f64,
        net_gex: f64,
        distance_to_flip: f64,
        thresholds: &StatusConfig,
    ) -> Self {
        if dealer_pain > thresholds.trapped_pain {
            Self::Trapped
        } else if dealer_pain > thresholds.scrambling_pain {
            Self::Scrambling
        } else if net_gex > thresholds.defending_gex {
            Self::Defending
        } else if distance_to_flip.abs() < thresholds.vulnerable_distance {
            Self::Vulnerable
        } else {
            Self::Neutral
        }
    }

    /// Expected dealer hedging behaviour in this state.
    #[must_use]
    pub const fn behavior(self) -> &'static str {
        match self {
            Self::Trapped => "Forced to chase price; hedging amplifies the move",
            Self::Scrambling => "Adjusting hedges aggressively into volatility",
            Self::Defending => "Selling rallies and buying dips to hold the range",
            Self::Vulnerable => "Near the gamma flip; regime can change quickly",
            Self::Neutral => "Balanced hedging with no forced flows",
        }
    }
}

impl std::fmt::Display for MmStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trapped => write!(f, "TRAPPED"),
            Self::Scrambling => write!(f, "SCRAMBLING"),
            Self::Defending => write!(f, "DEFENDING"),
            Self::Vulnerable => write!(f, "VULNERABLE"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Stress metrics derived from one exposure profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressMetrics {
    /// Dealer pain, 0 to 100.
    pub dealer_pain: f64,
    /// Share of gross exposure concentrated near spot, 0 to 100.
    pub pin_risk: f64,
    /// Volume to open interest ratio above the institutional threshold.
    pub institutional_flow: bool,
    /// Order flow toxicity, -100 to 100.
    pub toxicity_score: f64,
    /// Market maker status.
    pub mm_status: MmStatus,
}

impl StressMetrics {
    /// Expected dealer hedging behaviour.
    #[must_use]
    pub const fn mm_behavior(&self) -> &'static str {
        self.mm_status.behavior()
    }
}
