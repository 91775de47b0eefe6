//! Market maker pattern detection.
//!
//! A flat rule list over a finished profile. Each rule that fires appends one
//! pattern; the highest pattern confidence becomes the symbol's MM
//! vulnerability.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::calendar::SessionCalendar;
use crate::config::PatternConfig;
use crate::models::GexProfile;

/// Named dealer setups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternKind {
    /// Extreme dealer pain.
    TrappedMm,
    /// Short gamma next to the flip.
    GammaSqueeze,
    /// Spot pinned at the flip.
    PinRisk,
    /// Friday afternoon charm decay with large gamma.
    CharmFlow,
    /// Stressed dealers into monthly expiration.
    OpexPressure,
    /// Elevated volatility with short gamma.
    VannaSqueeze,
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TrappedMm => write!(f, "TRAPPED_MM"),
            Self::GammaSqueeze => write!(f, "GAMMA_SQUEEZE"),
            Self::PinRisk => write!(f, "PIN_RISK"),
            Self::CharmFlow => write!(f, "CHARM_FLOW"),
            Self::OpexPressure => write!(f, "OPEX_PRESSURE"),
            Self::VannaSqueeze => write!(f, "VANNA_SQUEEZE"),
        }
    }
}

/// How quickly a pattern should be acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    /// Act now.
    Critical,
    /// Act soon.
    High,
    /// Only valid inside a time window.
    TimeSensitive,
    /// Watch.
    Medium,
    /// Position ahead of an event.
    Moderate,
}

impl Urgency {
    /// Critical, high, or time-sensitive.
    #[must_use]
    pub const fn is_immediate(self) -> bool {
        matches!(self, Self::Critical | Self::High | Self::TimeSensitive)
    }
}

/// A detected pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MmPattern {
    /// Which setup.
    pub kind: PatternKind,
    /// Confidence, 0 to 100.
    pub confidence: f64,
    /// Action label.
    pub action: String,
    /// Concrete trade idea.
    pub trade: String,
    /// Urgency.
    pub urgency: Urgency,
    /// Expected return range.
    pub expected_return: String,
}

impl MmPattern {
    fn new(
        kind: PatternKind,
        confidence: f64,
        action: &str,
        trade: impl Into<String>,
        urgency: Urgency,
        expected_return: &str,
    ) -> Self {
        Self {
            kind,
            confidence,
            action: action.to_string(),
            trade: trade.into(),
            urgency,
            expected_return: expected_return.to_string(),
        }
    }
}

/// Patterns found on one profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternScan {
    /// Patterns in rule order.
    pub patterns: Vec<MmPattern>,
    /// Highest pattern confidence, 0 when none fired.
    pub mm_vulnerability: f64,
}

impl PatternScan {
    /// Highest-confidence pattern, first on ties.
    #[must_use]
    pub fn best(&self) -> Option<&MmPattern> {
        self.patterns
            .iter()
            .fold(None, |best: Option<&MmPattern>, p| match best {
                Some(b) if b.confidence >= p.confidence => Some(b),
                _ => Some(p),
            })
    }
}

/// Rule-based pattern detector.
#[derive(Debug, Clone, Default)]
pub struct PatternDetector {
    config: PatternConfig,
    calendar: SessionCalendar,
}

impl PatternDetector {
    /// Create a detector.
    #[must_use]
    pub const fn new(config: PatternConfig, calendar: SessionCalendar) -> Self {
        Self { config, calendar }
    }

    /// Run every rule against `profile` at market-local time `now`.
    #[must_use]
    pub fn detect(&self, profile: &GexProfile, now: NaiveDateTime) -> PatternScan {
        let cfg = &self.config;
        let pain = profile.dealer_pain();
        let net_gex = profile.net_gex();
        let distance = profile.distance_to_flip().abs();
        let mut patterns = Vec::new();

        if pain > cfg.trapped_pain {
            let side = if profile.current_price() < profile.gamma_flip() {
                "calls"
            } else {
                "puts"
            };
            patterns.push(MmPattern::new(
                PatternKind::TrappedMm,
                pain.min(cfg.trapped_ceiling),
                "EXPLOIT_IMMEDIATELY",
                format!("Buy 0DTE {side} for explosive move"),
                Urgency::Critical,
                "100-300%",
            ));
        }

        if net_gex < cfg.squeeze_net_gex && distance < cfg.squeeze_distance {
            patterns.push(MmPattern::new(
                PatternKind::GammaSqueeze,
                85.0,
                "BUY_CALLS",
                "Buy calls 1-2 strikes OTM, hold for squeeze",
                Urgency::High,
                "50-200%",
            ));
        }

        if distance < cfg.pin_distance {
            patterns.push(MmPattern::new(
                PatternKind::PinRisk,
                75.0,
                "SELL_PREMIUM",
                format!("Sell straddle at ${:.0} strike", profile.gamma_flip()),
                Urgency::Medium,
                "20-40%",
            ));
        }

        if self.calendar.is_friday_afternoon(now) && net_gex.abs() > cfg.charm_net_gex {
            patterns.push(MmPattern::new(
                PatternKind::CharmFlow,
                80.0,
                "SCALP_0DTE",
                "Buy 0DTE options at 3:00 PM in trend direction",
                Urgency::TimeSensitive,
                "50-150%",
            ));
        }

        if self.calendar.is_opex_week(now.date()) && pain > cfg.opex_pain {
            patterns.push(MmPattern::new(
                PatternKind::OpexPressure,
                70.0,
                "POSITION_FOR_UNWIND",
                "Buy weekly options for Friday gamma unwind",
                Urgency::Moderate,
                "30-100%",
            ));
        }

        if profile.volatility_index() > cfg.vanna_volatility_index && net_gex < 0.0 {
            patterns.push(MmPattern::new(
                PatternKind::VannaSqueeze,
                75.0,
                "BUY_CALLS",
                "Volatility spike with negative gamma favours a sharp rally",
                Urgency::High,
                "40-120%",
            ));
        }

        let mm_vulnerability = patterns.iter().map(|p| p.confidence).fold(0.0, f64::max);

        PatternScan {
            patterns,
            mm_vulnerability,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, Utc};

    use super::*;
    use crate::gex::GexExposure;
    use crate::models::StrikeAggregate;
    use crate::stress::{MmStatus, StressMetrics};

    fn profile(net_gex: f64, flip_strike: f64, pain: f64, vix: f64) -> GexProfile {
        // Two rows whose cumulative exposure never changes sign: flip falls back
        // to the row with the smaller magnitude.
        let (near, far) = (net_gex / 4.0, net_gex * 3.0 / 4.0);
        let rows = vec![
            StrikeAggregate::new(flip_strike, near.max(0.0), near.min(0.0)),
            StrikeAggregate::new(flip_strike + 10.0, far.max(0.0), far.min(0.0)),
        ];
        let exposure = GexExposure::from_strikes("T", 100.0, rows);
        let stress = StressMetrics {
            dealer_pain: pain,
            pin_risk: 0.0,
            institutional_flow: false,
            toxicity_score: 0.0,
            mm_status: MmStatus::Neutral,
        };
        GexProfile::new(exposure, stress, vix, DateTime::<Utc>::UNIX_EPOCH)
    }

    fn wednesday() -> NaiveDateTime {
        // 2026-04-08: not OPEX week, not Friday
        NaiveDate::from_ymd_opt(2026, 4, 8)
            .and_then(|d| d.and_hms_opt(11, 0, 0))
            .unwrap()
    }

    fn kinds(scan: &PatternScan) -> Vec<PatternKind> {
        scan.patterns.iter().map(|p| p.kind).collect()
    }

    #[test]
    fn test_quiet_profile_has_no_patterns() {
        let scan = PatternDetector::default().detect(&profile(1e9, 90.0, 10.0, 15.0), wednesday());
        assert!(scan.patterns.is_empty());
        assert_eq!(scan.mm_vulnerability, 0.0);
        assert!(scan.best().is_none());
    }

    #[test]
    fn test_trapped_squeeze_and_vanna() {
        // flip at 99.5 -> distance 0.5
        let scan =
            PatternDetector::default().detect(&profile(-2e9, 99.5, 92.0, 25.0), wednesday());

        assert_eq!(
            kinds(&scan),
            vec![
                PatternKind::TrappedMm,
                PatternKind::GammaSqueeze,
                PatternKind::VannaSqueeze
            ]
        );
        assert_eq!(scan.mm_vulnerability, 92.0);
        assert_eq!(scan.patterns[0].urgency, Urgency::Critical);
        // spot below flip is false here: 100 > 99.5
        assert!(scan.patterns[0].trade.contains("puts"));
        assert_eq!(scan.best().map(|p| p.kind), Some(PatternKind::TrappedMm));
    }

    #[test]
    fn test_trapped_confidence_is_capped() {
        let scan = PatternDetector::default().detect(&profile(-2e9, 80.0, 99.0, 15.0), wednesday());
        assert_eq!(scan.patterns[0].confidence, 95.0);
    }

    #[test]
    fn test_pin_charm_and_opex() {
        // Friday 2026-03-20 15:00 is OPEX Friday and Friday afternoon
        let now = NaiveDate::from_ymd_opt(2026, 3, 20)
            .and_then(|d| d.and_hms_opt(15, 0, 0))
            .unwrap();
        let scan = PatternDetector::default().detect(&profile(4e9, 99.9, 65.0, 15.0), now);

        assert_eq!(
            kinds(&scan),
            vec![
                PatternKind::PinRisk,
                PatternKind::CharmFlow,
                PatternKind::OpexPressure
            ]
        );
        assert_eq!(scan.mm_vulnerability, 80.0);
        assert!(Urgency::TimeSensitive.is_immediate());
        assert!(!Urgency::Moderate.is_immediate());
    }
}
