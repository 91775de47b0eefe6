//! Trade signal value object.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Strategy family that produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalType {
    /// Dealer short-gamma squeeze.
    SqueezePlay,
    /// Sell premium against a wall.
    PremiumSelling,
    /// Range-bound iron condor between walls.
    IronCondor,
    /// Directionless volatility expansion.
    Volatility,
    /// No actionable setup.
    Wait,
}

impl std::fmt::Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SqueezePlay => write!(f, "SQUEEZE_PLAY"),
            Self::PremiumSelling => write!(f, "PREMIUM_SELLING"),
            Self::IronCondor => write!(f, "IRON_CONDOR"),
            Self::Volatility => write!(f, "VOLATILITY"),
            Self::Wait => write!(f, "WAIT"),
        }
    }
}

/// Trade expression of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeDirection {
    /// Buy calls.
    LongCalls,
    /// Buy puts.
    LongPuts,
    /// Sell calls.
    SellCalls,
    /// Sell puts.
    SellPuts,
    /// Sell an iron condor.
    IronCondor,
    /// Buy a straddle.
    LongStraddle,
    /// Stay flat.
    Wait,
}

impl std::fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LongCalls => write!(f, "LONG CALLS"),
            Self::LongPuts => write!(f, "LONG PUTS"),
            Self::SellCalls => write!(f, "SELL CALLS"),
            Self::SellPuts => write!(f, "SELL PUTS"),
            Self::IronCondor => write!(f, "IRON CONDOR"),
            Self::LongStraddle => write!(f, "LONG STRADDLE"),
            Self::Wait => write!(f, "WAIT"),
        }
    }
}

/// Clip a confidence to [0, 100] and round to 2 decimals.
///
/// Non-finite input maps to 0.
#[must_use]
pub fn round_confidence(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value.clamp(0.0, 100.0) * 100.0).round() / 100.0
}

/// A generated trade signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Underlying symbol.
    pub symbol: String,
    /// Strategy family.
    pub signal_type: SignalType,
    /// Trade expression.
    pub direction: TradeDirection,
    /// Confidence in [0, 100], 2 decimals.
    pub confidence: f64,
    /// Entry descriptor.
    pub entry: String,
    /// Target descriptor.
    pub target: String,
    /// Stop descriptor.
    pub stop: String,
    /// Expected underlying move in percent.
    pub expected_move: f64,
    /// Holding horizon descriptor.
    pub time_horizon: String,
    /// Historical win-rate estimate in percent.
    pub win_rate: f64,
    /// Capital allocated: trading capital times the family's risk fraction.
    pub position_size: Decimal,
    /// Human-readable reasoning.
    pub reasoning: String,
}

impl Signal {
    /// Create a signal; confidence is clipped and rounded.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        signal_type: SignalType,
        direction: TradeDirection,
        confidence: f64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            signal_type,
            direction,
            confidence: round_confidence(confidence),
            entry: String::new(),
            target: String::new(),
            stop: String::new(),
            expected_move: 0.0,
            time_horizon: String::new(),
            win_rate: 0.0,
            position_size: Decimal::ZERO,
            reasoning: String::new(),
        }
    }

    /// WAIT signal with zero confidence.
    #[must_use]
    pub fn wait(symbol: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self::new(symbol, SignalType::Wait, TradeDirection::Wait, 0.0)
            .with_levels("No entry", "N/A", "N/A")
            .with_horizon("N/A")
            .with_reasoning(reasoning)
    }

    /// Set entry, target and stop descriptors.
    #[must_use]
    pub fn with_levels(
        mut self,
        entry: impl Into<String>,
        target: impl Into<String>,
        stop: impl Into<String>,
    ) -> Self {
        self.entry = entry.into();
        self.target = target.into();
        self.stop = stop.into();
        self
    }

    /// Set expected move (percent).
    #[must_use]
    pub fn with_expected_move(mut self, expected_move: f64) -> Self {
        self.expected_move = if expected_move.is_finite() {
            (expected_move * 100.0).round() / 100.0
        } else {
            0.0
        };
        self
    }

    /// Set time horizon.
    #[must_use]
    pub fn with_horizon(mut self, time_horizon: impl Into<String>) -> Self {
        self.time_horizon = time_horizon.into();
        self
    }

    /// Set win rate estimate (percent).
    #[must_use]
    pub const fn with_win_rate(mut self, win_rate: f64) -> Self {
        self.win_rate = win_rate;
        self
    }

    /// Set position size.
    #[must_use]
    pub const fn with_position_size(mut self, position_size: Decimal) -> Self {
        self.position_size = position_size;
        self
    }

    /// Set reasoning.
    #[must_use]
    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(55.556, 55.56 ; "rounds up")]
    #[test_case(12.344, 12.34 ; "rounds down")]
    #[test_case(120.0, 100.0 ; "clips above")]
    #[test_case(-3.0, 0.0 ; "clips below")]
    #[test_case(f64::NAN, 0.0 ; "nan is zero")]
    #[test_case(72.0, 72.0 ; "unchanged")]
    fn test_round_confidence(input: f64, expected: f64) {
        assert_eq!(round_confidence(input), expected);
    }

    #[test]
    fn test_wait_signal() {
        let signal = Signal::wait("AAPL", "no data");
        assert_eq!(signal.signal_type, SignalType::Wait);
        assert_eq!(signal.direction, TradeDirection::Wait);
        assert_eq!(signal.confidence, 0.0);
        assert_eq!(signal.position_size, Decimal::ZERO);
        assert_eq!(signal.reasoning, "no data");
    }

    #[test]
    fn test_display() {
        assert_eq!(SignalType::IronCondor.to_string(), "IRON_CONDOR");
        assert_eq!(TradeDirection::SellPuts.to_string(), "SELL PUTS");
    }
}
