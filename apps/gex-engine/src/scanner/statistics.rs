//! Scan summaries and result views.

use serde::{Deserialize, Serialize};

use crate::models::{ScanResult, SignalType};
use crate::stress::PatternKind;

/// Opportunity score above which a symbol counts as an opportunity.
const OPPORTUNITY_SCORE: f64 = 50.0;
/// Vulnerability above which dealers count as trapped.
const TRAPPED_VULNERABILITY: f64 = 80.0;
/// Vulnerability above which dealers count as scrambling.
const SCRAMBLING_VULNERABILITY: f64 = 60.0;
/// Best-signal confidence counted as high.
const HIGH_CONFIDENCE: f64 = 75.0;
/// Dealer pain counted as high.
const HIGH_PAIN: f64 = 70.0;

/// Aggregate counts over one scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanStatistics {
    /// Results in the scan.
    pub total_scanned: usize,
    /// Symbols that failed.
    pub failed: usize,
    /// Opportunity score above 50.
    pub opportunities: usize,
    /// MM vulnerability above 80.
    pub trapped_mms: usize,
    /// MM vulnerability in (60, 80].
    pub scrambling_mms: usize,
    /// Mean MM vulnerability, one decimal.
    pub avg_vulnerability: f64,
    /// Best pattern urgency is critical, high or time sensitive.
    pub critical_alerts: usize,
    /// Best signal confidence above 75.
    pub high_confidence: usize,
}

impl ScanStatistics {
    /// Summarise `results`.
    #[must_use]
    pub fn from_results(results: &[ScanResult]) -> Self {
        if results.is_empty() {
            return Self::default();
        }

        let mut stats = Self {
            total_scanned: results.len(),
            ..Self::default()
        };
        let mut vulnerability_sum = 0.0;

        for result in results {
            if result.is_failed() {
                stats.failed += 1;
            }
            if result.opportunity_score > OPPORTUNITY_SCORE {
                stats.opportunities += 1;
            }

            let vulnerability = result.mm_vulnerability;
            vulnerability_sum += vulnerability;
            if vulnerability > TRAPPED_VULNERABILITY {
                stats.trapped_mms += 1;
            } else if vulnerability > SCRAMBLING_VULNERABILITY {
                stats.scrambling_mms += 1;
            }

            if result.best_pattern().is_some_and(|p| p.urgency.is_immediate()) {
                stats.critical_alerts += 1;
            }
            if result
                .best_signal()
                .is_some_and(|s| s.confidence > HIGH_CONFIDENCE)
            {
                stats.high_confidence += 1;
            }
        }

        let avg = vulnerability_sum / results.len() as f64;
        stats.avg_vulnerability = (avg * 10.0).round() / 10.0;
        stats
    }
}

/// Named views over scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultFilter {
    /// Everything.
    #[default]
    All,
    /// MM vulnerability above 80.
    TrappedMms,
    /// MM vulnerability in (60, 80].
    ScramblingMms,
    /// Has a gamma squeeze pattern.
    GammaSqueeze,
    /// Has a pin risk pattern.
    PinRisk,
    /// Has a charm flow pattern.
    CharmFlow,
    /// Has an OPEX pressure pattern.
    OpexPlays,
    /// Has a vanna squeeze pattern.
    VannaSqueeze,
    /// Best signal sells premium.
    PremiumSelling,
    /// Best signal is an iron condor.
    IronCondors,
    /// Best signal confidence above 75.
    HighConfidence,
    /// Best pattern needs action now.
    ImmediateAction,
    /// Dealer pain above 70.
    HighPain,
}

impl ResultFilter {
    /// Whether `result` belongs in this view.
    #[must_use]
    pub fn matches(self, result: &ScanResult) -> bool {
        let has_pattern =
            |kind: PatternKind| result.mm_patterns.iter().any(|p| p.kind == kind);
        let best_is = |signal_type: SignalType| {
            result
                .best_signal()
                .is_some_and(|s| s.signal_type == signal_type)
        };

        match self {
            Self::All => true,
            Self::TrappedMms => result.mm_vulnerability > TRAPPED_VULNERABILITY,
            Self::ScramblingMms => {
                result.mm_vulnerability > SCRAMBLING_VULNERABILITY
                    && result.mm_vulnerability <= TRAPPED_VULNERABILITY
            }
            Self::GammaSqueeze => has_pattern(PatternKind::GammaSqueeze),
            Self::PinRisk => has_pattern(PatternKind::PinRisk),
            Self::CharmFlow => has_pattern(PatternKind::CharmFlow),
            Self::OpexPlays => has_pattern(PatternKind::OpexPressure),
            Self::VannaSqueeze => has_pattern(PatternKind::VannaSqueeze),
            Self::PremiumSelling => best_is(SignalType::PremiumSelling),
            Self::IronCondors => best_is(SignalType::IronCondor),
            Self::HighConfidence => result
                .best_signal()
                .is_some_and(|s| s.confidence > HIGH_CONFIDENCE),
            Self::ImmediateAction => result
                .best_pattern()
                .is_some_and(|p| p.urgency.is_immediate()),
            Self::HighPain => result.profile.is_some() && result.dealer_pain() > HIGH_PAIN,
        }
    }

    /// Keep matching results, preserving order.
    #[must_use]
    pub fn apply<'a>(self, results: &'a [ScanResult]) -> Vec<&'a ScanResult> {
        results.iter().filter(|r| self.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Signal, TradeDirection};
    use crate::scanner::ScanFailure;
    use crate::signals::fixtures::positive_gamma_range;
    use crate::stress::{MmPattern, Urgency};

    fn pattern(kind: PatternKind, confidence: f64, urgency: Urgency) -> MmPattern {
        MmPattern {
            kind,
            confidence,
            action: String::new(),
            trade: String::new(),
            urgency,
            expected_return: String::new(),
        }
    }

    fn result(symbol: &str, score: f64, patterns: Vec<MmPattern>, signal: Signal) -> ScanResult {
        let mm_vulnerability = patterns.iter().map(|p| p.confidence).fold(0.0, f64::max);
        ScanResult {
            symbol: symbol.to_string(),
            profile: Some(positive_gamma_range(symbol)),
            signals: vec![signal],
            opportunity_score: score,
            mm_patterns: patterns,
            mm_vulnerability,
            failure: None,
        }
    }

    fn sample() -> Vec<ScanResult> {
        vec![
            result(
                "SPY",
                72.0,
                vec![pattern(PatternKind::TrappedMm, 90.0, Urgency::Critical)],
                Signal::new("SPY", SignalType::SqueezePlay, TradeDirection::LongCalls, 85.0),
            ),
            result(
                "QQQ",
                55.0,
                vec![
                    pattern(PatternKind::PinRisk, 75.0, Urgency::Medium),
                    pattern(PatternKind::OpexPressure, 70.0, Urgency::Moderate),
                ],
                Signal::new("QQQ", SignalType::PremiumSelling, TradeDirection::SellCalls, 70.0),
            ),
            result(
                "IWM",
                30.0,
                Vec::new(),
                Signal::new("IWM", SignalType::IronCondor, TradeDirection::IronCondor, 68.0),
            ),
            ScanResult::failed("TSLA", ScanFailure::NoChainData),
        ]
    }

    #[test]
    fn test_statistics() {
        let stats = ScanStatistics::from_results(&sample());

        assert_eq!(stats.total_scanned, 4);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.opportunities, 2);
        assert_eq!(stats.trapped_mms, 1);
        assert_eq!(stats.scrambling_mms, 1);
        // (90 + 75 + 0 + 0) / 4 = 41.25
        assert_eq!(stats.avg_vulnerability, 41.3);
        assert_eq!(stats.critical_alerts, 1);
        assert_eq!(stats.high_confidence, 1);
    }

    #[test]
    fn test_empty_statistics() {
        assert_eq!(ScanStatistics::from_results(&[]), ScanStatistics::default());
    }

    #[test]
    fn test_filters_preserve_order() {
        let results = sample();
        let symbols = |filter: ResultFilter| -> Vec<&str> {
            filter
                .apply(&results)
                .iter()
                .map(|r| r.symbol.as_str())
                .collect()
        };

        assert_eq!(symbols(ResultFilter::All), vec!["SPY", "QQQ", "IWM", "TSLA"]);
        assert_eq!(symbols(ResultFilter::TrappedMms), vec!["SPY"]);
        assert_eq!(symbols(ResultFilter::ScramblingMms), vec!["QQQ"]);
        assert_eq!(symbols(ResultFilter::PinRisk), vec!["QQQ"]);
        assert_eq!(symbols(ResultFilter::OpexPlays), vec!["QQQ"]);
        assert!(symbols(ResultFilter::GammaSqueeze).is_empty());
        assert_eq!(symbols(ResultFilter::PremiumSelling), vec!["QQQ"]);
        assert_eq!(symbols(ResultFilter::IronCondors), vec!["IWM"]);
        assert_eq!(symbols(ResultFilter::HighConfidence), vec!["SPY"]);
        assert_eq!(symbols(ResultFilter::ImmediateAction), vec!["SPY"]);
        assert!(symbols(ResultFilter::HighPain).is_empty());
    }
}
