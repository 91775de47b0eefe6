//! Signal generator: runs every strategy family and ranks the output.

use rust_decimal::Decimal;
use tracing::debug;

use super::{condor, premium, squeeze};
use crate::config::{PricingConfig, RiskManagementConfig, StrategiesConfig};
use crate::models::{GexProfile, Signal, SignalType, TradeDirection};

/// Capital and exit rules shared by the strategy families.
#[derive(Debug, Clone, Copy)]
pub(super) struct Sizing<'a> {
    trading_capital: Decimal,
    pub(super) risk: &'a RiskManagementConfig,
}

impl<'a> Sizing<'a> {
    pub(super) const fn new(trading_capital: Decimal, risk: &'a RiskManagementConfig) -> Self {
        Self {
            trading_capital,
            risk,
        }
    }

    /// `trading_capital * fraction`, rounded to cents.
    pub(super) fn position(&self, fraction: Decimal) -> Decimal {
        (self.trading_capital * fraction).round_dp(2)
    }

    /// Profit target for long premium, in percent.
    pub(super) fn long_target_pct(&self) -> f64 {
        self.risk.profit_target_long * 100.0
    }

    /// Profit target for short premium, in percent.
    pub(super) fn short_target_pct(&self) -> f64 {
        self.risk.profit_target_short * 100.0
    }

    /// Stop loss, in percent.
    pub(super) fn stop_pct(&self) -> f64 {
        self.risk.stop_loss_percentage * 100.0
    }
}

/// Deterministic multi-strategy rule engine.
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    config: StrategiesConfig,
    trading_capital: Decimal,
}

impl Default for SignalGenerator {
    fn default() -> Self {
        Self::new(
            StrategiesConfig::default(),
            PricingConfig::default().trading_capital,
        )
    }
}

impl SignalGenerator {
    /// Create a generator.
    #[must_use]
    pub const fn new(config: StrategiesConfig, trading_capital: Decimal) -> Self {
        Self {
            config,
            trading_capital,
        }
    }

    /// Strategy configuration.
    #[must_use]
    pub const fn config(&self) -> &StrategiesConfig {
        &self.config
    }

    /// Generate signals for `symbol`, highest confidence first.
    ///
    /// Never empty: an absent profile yields a single zero-confidence WAIT,
    /// and a profile on which no family fires yields one VOLATILITY or WAIT.
    /// Ties keep family emission order (squeeze, premium, condor).
    #[must_use]
    pub fn generate(&self, profile: Option<&GexProfile>, symbol: &str) -> Vec<Signal> {
        let Some(profile) = profile else {
            return vec![Signal::wait(symbol, "No GEX profile available")];
        };

        let sizing = Sizing::new(self.trading_capital, &self.config.risk_management);

        let mut signals = squeeze::signals(profile, symbol, &self.config.squeeze, &sizing);
        signals.extend(premium::signals(
            profile,
            symbol,
            &self.config.premium_selling,
            &sizing,
        ));
        signals.extend(condor::signals(
            profile,
            symbol,
            &self.config.iron_condor,
            &sizing,
        ));

        if signals.is_empty() {
            signals.push(self.fallback(profile, symbol, &sizing));
        }

        signals.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        debug!(
            symbol,
            count = signals.len(),
            best = signals.first().map_or(0.0, |s| s.confidence),
            "Generated signals"
        );

        signals
    }

    fn fallback(&self, profile: &GexProfile, symbol: &str, sizing: &Sizing<'_>) -> Signal {
        let cfg = &self.config.fallback;
        let pain = profile.dealer_pain();

        if pain <= cfg.volatility_pain {
            return Signal::wait(
                symbol,
                format!(
                    "No setup meets strategy thresholds (net GEX {:.2}B, dealer pain {pain:.0})",
                    profile.net_gex() / 1e9
                ),
            );
        }

        let spot = profile.current_price();
        let expected_move = profile.distance_to_flip().abs().max(2.0);

        Signal::new(
            symbol,
            SignalType::Volatility,
            TradeDirection::LongStraddle,
            cfg.confidence.score(pain, 0.0),
        )
        .with_levels(
            format!("Buy ATM straddle near ${spot:.2}"),
            format!("{expected_move:.1}% move either way"),
            format!("-{:.0}% premium", sizing.stop_pct()),
        )
        .with_expected_move(expected_move)
        .with_horizon("1-3 days")
        .with_win_rate(cfg.win_rate)
        .with_position_size(sizing.position(self.config.risk_management.max_position_size_volatility))
        .with_reasoning(format!(
            "Dealer pain {pain:.0} without a directional setup; {} dealers amplify moves",
            profile.mm_status()
        ))
    }
}
