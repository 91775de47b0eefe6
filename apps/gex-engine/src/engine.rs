//! Single-symbol analysis pipeline.
//!
//! Chain snapshot -> exposure profile -> stress metrics -> signals ->
//! patterns -> opportunity score. Every stage is pure over its inputs; the
//! only time dependence is the market context's `now`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::SessionCalendar;
use crate::config::Config;
use crate::gex::GexProfileBuilder;
use crate::models::{ChainSnapshot, GexProfile, MarketContext, ScanResult, Signal};
use crate::scanner::{OpportunityScorer, ScanFailure};
use crate::signals::SignalGenerator;
use crate::stress::{PatternDetector, StressAnalyzer};

/// Profile and signals for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Exposure profile, absent when the chain was unusable.
    pub profile: Option<GexProfile>,
    /// Signals, highest confidence first. Never empty.
    pub signals: Vec<Signal>,
}

/// The analysis pipeline, shared read-only by every scan task.
#[derive(Debug, Clone, Default)]
pub struct GexEngine {
    builder: GexProfileBuilder,
    generator: SignalGenerator,
    detector: PatternDetector,
    scorer: OpportunityScorer,
}

impl GexEngine {
    /// Assemble the pipeline from its stages.
    #[must_use]
    pub const fn new(
        builder: GexProfileBuilder,
        generator: SignalGenerator,
        detector: PatternDetector,
        scorer: OpportunityScorer,
    ) -> Self {
        Self {
            builder,
            generator,
            detector,
            scorer,
        }
    }

    /// Build the pipeline from application configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let calendar = SessionCalendar::from_config(&config.session);
        let stress = StressAnalyzer::new(config.stress.clone(), calendar);

        Self::new(
            GexProfileBuilder::new(config.pricing.gamma_model(), stress),
            SignalGenerator::new(config.strategies.clone(), config.pricing.trading_capital),
            PatternDetector::new(config.stress.patterns.clone(), calendar),
            OpportunityScorer::new(config.scanner.score.clone(), calendar),
        )
    }

    /// Profile builder.
    #[must_use]
    pub const fn builder(&self) -> &GexProfileBuilder {
        &self.builder
    }

    /// Signal generator.
    #[must_use]
    pub const fn generator(&self) -> &SignalGenerator {
        &self.generator
    }

    /// Analyse one symbol.
    ///
    /// A missing or unusable chain yields no profile and a single WAIT signal.
    #[must_use]
    pub fn analyze(
        &self,
        symbol: &str,
        chain: Option<&ChainSnapshot>,
        context: &MarketContext,
    ) -> Analysis {
        let profile = chain.and_then(|c| self.builder.build(c, context));
        let signals = self.generator.generate(profile.as_ref(), symbol);
        Analysis { profile, signals }
    }

    /// Analyse one symbol and score it for a scan.
    ///
    /// Signals below `min_confidence` are dropped unless that would leave
    /// none, in which case the unfiltered set is kept.
    #[must_use]
    pub fn evaluate(
        &self,
        symbol: &str,
        chain: Option<&ChainSnapshot>,
        context: &MarketContext,
        min_confidence: f64,
    ) -> ScanResult {
        let Analysis { profile, signals } = self.analyze(symbol, chain, context);
        let Some(profile) = profile else {
            return ScanResult::failed(symbol, ScanFailure::NoChainData);
        };

        let signals = filter_signals(signals, min_confidence);
        let patterns = self.detector.detect(&profile, context.now);
        let best_confidence = signals.first().map_or(0.0, |s| s.confidence);
        let opportunity_score = self.scorer.score(
            Some(&profile),
            best_confidence,
            patterns.mm_vulnerability,
            context.now,
        );

        debug!(
            symbol,
            signals = signals.len(),
            patterns = patterns.patterns.len(),
            opportunity_score,
            "Evaluated symbol"
        );

        ScanResult {
            symbol: symbol.to_string(),
            profile: Some(profile),
            signals,
            opportunity_score,
            mm_patterns: patterns.patterns,
            mm_vulnerability: patterns.mm_vulnerability,
            failure: None,
        }
    }
}

fn filter_signals(signals: Vec<Signal>, min_confidence: f64) -> Vec<Signal> {
    let kept: Vec<Signal> = signals
        .iter()
        .filter(|s| s.confidence >= min_confidence)
        .cloned()
        .collect();

    if kept.is_empty() { signals } else { kept }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpirationChain, OptionContract, SignalType, TradeDirection};
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 4, 8)
            .and_then(|d| d.and_hms_opt(11, 0, 0))
            .unwrap()
    }

    fn chain() -> ChainSnapshot {
        ChainSnapshot::new("SPY", 500.0).with_expiration(
            NaiveDate::from_ymd_opt(2026, 4, 10).unwrap(),
            ExpirationChain {
                calls: vec![
                    OptionContract::new(500.0, 40_000, Some(0.18), 9_000),
                    OptionContract::new(510.0, 60_000, Some(0.17), 4_000),
                ],
                puts: vec![
                    OptionContract::new(490.0, 55_000, Some(0.22), 12_000),
                    OptionContract::new(500.0, 30_000, Some(0.20), 8_000),
                ],
                days_to_expiry: 2,
                fetched_at: DateTime::<Utc>::UNIX_EPOCH,
            },
        )
    }

    #[test]
    fn test_missing_chain_is_wait() {
        let engine = GexEngine::default();
        let context = MarketContext::new(15.0, now());

        let analysis = engine.analyze("SPY", None, &context);
        assert!(analysis.profile.is_none());
        assert_eq!(analysis.signals.len(), 1);
        assert_eq!(analysis.signals[0].signal_type, SignalType::Wait);
        assert_eq!(analysis.signals[0].confidence, 0.0);

        let result = engine.evaluate("SPY", None, &context, 65.0);
        assert_eq!(result.failure, Some(ScanFailure::NoChainData));
        assert_eq!(result.opportunity_score, 0.0);
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let engine = GexEngine::default();
        let context = MarketContext::new(18.0, now());
        let snapshot = chain();

        let first = engine.analyze("SPY", Some(&snapshot), &context);
        let second = engine.analyze("SPY", Some(&snapshot), &context);
        assert!(first.profile.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_evaluate_scores_within_bounds() {
        let engine = GexEngine::default();
        let context = MarketContext::new(18.0, now());

        let result = engine.evaluate("SPY", Some(&chain()), &context, 65.0);
        assert!(!result.is_failed());
        assert!(!result.signals.is_empty());
        assert!((0.0..=100.0).contains(&result.opportunity_score));
    }

    #[test]
    fn test_filter_falls_back_to_unfiltered() {
        let low = vec![
            Signal::new("IWM", SignalType::Volatility, TradeDirection::LongStraddle, 40.0),
            Signal::wait("IWM", "nothing"),
        ];
        assert_eq!(filter_signals(low.clone(), 65.0), low);

        let mixed = vec![
            Signal::new("IWM", SignalType::SqueezePlay, TradeDirection::LongCalls, 80.0),
            Signal::new("IWM", SignalType::Volatility, TradeDirection::LongStraddle, 40.0),
        ];
        let kept = filter_signals(mixed, 65.0);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].confidence, 80.0);
    }
}
