//! Per-symbol scan result.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{GexProfile, Signal};
use crate::scanner::ScanFailure;
use crate::stress::MmPattern;

/// Market-wide inputs that are not part of a chain snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    /// Current volatility index level (e.g. VIX).
    pub volatility_index: f64,
    /// Market-local wall-clock time of the analysis.
    pub now: NaiveDateTime,
}

impl MarketContext {
    /// Create a market context.
    #[must_use]
    pub const fn new(volatility_index: f64, now: NaiveDateTime) -> Self {
        Self {
            volatility_index,
            now,
        }
    }
}

/// Outcome of analysing one symbol in a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Symbol.
    pub symbol: String,
    /// Exposure profile, absent when the symbol could not be analysed.
    pub profile: Option<GexProfile>,
    /// Signals, highest confidence first.
    pub signals: Vec<Signal>,
    /// Composite opportunity score in [0, 100].
    pub opportunity_score: f64,
    /// Market maker patterns detected on the profile.
    pub mm_patterns: Vec<MmPattern>,
    /// Highest pattern confidence, 0 when none.
    pub mm_vulnerability: f64,
    /// Why the symbol failed, if it did.
    pub failure: Option<ScanFailure>,
}

impl ScanResult {
    /// Placeholder for a symbol that could not be analysed.
    ///
    /// Carries a single zero-confidence WAIT signal and a zero score.
    #[must_use]
    pub fn failed(symbol: impl Into<String>, failure: ScanFailure) -> Self {
        let symbol = symbol.into();
        let wait = Signal::wait(symbol.clone(), format!("No data: {failure}"));
        Self {
            symbol,
            profile: None,
            signals: vec![wait],
            opportunity_score: 0.0,
            mm_patterns: Vec::new(),
            mm_vulnerability: 0.0,
            failure: Some(failure),
        }
    }

    /// Highest-confidence signal.
    #[must_use]
    pub fn best_signal(&self) -> Option<&Signal> {
        self.signals.first()
    }

    /// Highest-confidence pattern (first on ties).
    #[must_use]
    pub fn best_pattern(&self) -> Option<&MmPattern> {
        self.mm_patterns
            .iter()
            .fold(None, |best: Option<&MmPattern>, p| match best {
                Some(b) if b.confidence >= p.confidence => Some(b),
                _ => Some(p),
            })
    }

    /// Dealer pain of the profile, 0 when absent.
    #[must_use]
    pub fn dealer_pain(&self) -> f64 {
        self.profile.as_ref().map_or(0.0, GexProfile::dealer_pain)
    }

    /// Whether the symbol failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SignalType;

    #[test]
    fn test_failed_result_is_wait_placeholder() {
        let result = ScanResult::failed("TSLA", ScanFailure::NoChainData);

        assert!(result.is_failed());
        assert!(result.profile.is_none());
        assert_eq!(result.opportunity_score, 0.0);
        assert_eq!(result.dealer_pain(), 0.0);

        let best = result.best_signal().unwrap();
        assert_eq!(best.signal_type, SignalType::Wait);
        assert_eq!(best.confidence, 0.0);
        assert!(best.reasoning.contains("No data"));
    }
}
