//! Configuration module for the GEX engine.
//!
//! Provides configuration loading, validation, and environment variable
//! interpolation for the pricing model, the strategy rule engine, the stress
//! heuristics, and the scanner.
//!
//! # Usage
//!
//! ```rust,ignore
//! use gex_engine::config::{Config, load_config};
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("custom/config.yaml"))?;
//!
//! println!("workers: {}", config.scanner.max_workers);
//! ```
//!
//! Every section carries serde defaults, so an empty document is a valid
//! configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveTime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::GammaModel;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Pricing inputs supplied from outside the core.
    #[serde(default)]
    pub pricing: PricingConfig,
    /// Strategy thresholds for the signal rule engine.
    #[serde(default)]
    pub strategies: StrategiesConfig,
    /// Dealer stress heuristics.
    #[serde(default)]
    pub stress: StressConfig,
    /// Market session hours.
    #[serde(default)]
    pub session: SessionConfig,
    /// Scanner configuration.
    #[serde(default)]
    pub scanner: ScannerConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Pricing
// ============================================

/// Pricing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Annualised risk-free rate.
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
    /// Capital used to size positions.
    #[serde(default = "default_trading_capital")]
    pub trading_capital: Decimal,
    /// Volatility index level used when the provider cannot supply one.
    #[serde(default = "default_volatility_index")]
    pub default_volatility_index: f64,
    /// Day-count convention for time to expiry.
    #[serde(default = "default_days_per_year")]
    pub days_per_year: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: default_risk_free_rate(),
            trading_capital: default_trading_capital(),
            default_volatility_index: default_volatility_index(),
            days_per_year: default_days_per_year(),
        }
    }
}

impl PricingConfig {
    /// Gamma model bound to these parameters.
    #[must_use]
    pub const fn gamma_model(&self) -> GammaModel {
        GammaModel::new(self.risk_free_rate, self.days_per_year)
    }
}

const fn default_risk_free_rate() -> f64 {
    0.05
}
const fn default_trading_capital() -> Decimal {
    dec!(100000)
}
const fn default_volatility_index() -> f64 {
    15.0
}
const fn default_days_per_year() -> f64 {
    365.0
}

// ============================================
// Strategies
// ============================================

/// Strategy configuration for the signal rule engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategiesConfig {
    /// Squeeze family.
    #[serde(default)]
    pub squeeze: SqueezeConfig,
    /// Premium-selling family.
    #[serde(default)]
    pub premium_selling: PremiumSellingConfig,
    /// Iron-condor family.
    #[serde(default)]
    pub iron_condor: IronCondorConfig,
    /// Fallback branch when no family fires.
    #[serde(default)]
    pub fallback: FallbackConfig,
    /// Position sizing and exits.
    #[serde(default)]
    pub risk_management: RiskManagementConfig,
}

/// A GEX threshold with per-symbol overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolThreshold {
    /// Threshold for symbols without an override.
    pub default: f64,
    /// Per-symbol thresholds, keyed by upper-case symbol.
    #[serde(default, deserialize_with = "uppercase_keys")]
    pub overrides: BTreeMap<String, f64>,
}

fn uppercase_keys<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = BTreeMap::<String, f64>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(symbol, value)| (symbol.to_ascii_uppercase(), value))
        .collect())
}

impl SymbolThreshold {
    /// Threshold for `symbol`.
    #[must_use]
    pub fn for_symbol(&self, symbol: &str) -> f64 {
        self.overrides
            .get(&symbol.to_ascii_uppercase())
            .copied()
            .unwrap_or(self.default)
    }

    fn values(&self) -> impl Iterator<Item = f64> + '_ {
        std::iter::once(self.default).chain(self.overrides.values().copied())
    }
}

/// Inclusive percent band measured from spot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceBand {
    /// Lower bound (percent).
    pub min: f64,
    /// Upper bound (percent).
    pub max: f64,
}

impl DistanceBand {
    /// Whether `distance` falls inside the band.
    #[must_use]
    pub fn contains(&self, distance: f64) -> bool {
        distance >= self.min && distance <= self.max
    }
}

/// Days-to-expiry window quoted on a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DteRange {
    /// Shortest expiry (days).
    pub min: u32,
    /// Longest expiry (days).
    pub max: u32,
}

impl std::fmt::Display for DteRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{} DTE", self.min, self.max)
    }
}

/// Linear confidence blend: `base + pain_weight * pain + distance_weight * term`,
/// capped at `ceiling`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBlend {
    /// Starting confidence.
    pub base: f64,
    /// Weight on dealer pain.
    #[serde(default)]
    pub pain_weight: f64,
    /// Weight on the family-specific distance term.
    #[serde(default)]
    pub distance_weight: f64,
    /// Family ceiling.
    pub ceiling: f64,
}

impl ConfidenceBlend {
    /// Blend the inputs. Negative terms are treated as zero.
    #[must_use]
    pub fn score(&self, dealer_pain: f64, distance_term: f64) -> f64 {
        let raw = self.base
            + self.pain_weight * dealer_pain.max(0.0)
            + self.distance_weight * distance_term.max(0.0);
        raw.min(self.ceiling)
    }
}

/// Confidence earned by a dealer wall: `base + wall_weight * strength`, capped
/// at `ceiling`, where strength is the wall's magnitude relative to
/// [`PremiumSellingConfig::wall_strength`], itself capped at 2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallConfidence {
    /// Confidence of a zero-strength wall.
    pub base: f64,
    /// Points per unit of relative wall strength.
    pub wall_weight: f64,
    /// Family ceiling.
    pub ceiling: f64,
}

impl WallConfidence {
    /// Confidence for a wall of `gex_magnitude` against `full_strength`.
    #[must_use]
    pub fn score(&self, gex_magnitude: f64, full_strength: f64) -> f64 {
        let strength = (gex_magnitude.abs() / full_strength).min(2.0);
        (self.base + self.wall_weight * strength).min(self.ceiling)
    }
}

/// Squeeze family configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqueezeConfig {
    /// Net GEX below which dealers are considered squeezable (long calls).
    #[serde(default = "default_squeeze_negative_gex")]
    pub negative_gex: SymbolThreshold,
    /// Net GEX above which a long-puts reversal is considered.
    #[serde(default = "default_squeeze_positive_gex")]
    pub positive_gex: SymbolThreshold,
    /// Dealer pain that triggers long calls regardless of net GEX.
    #[serde(default = "default_squeeze_pain_trigger")]
    pub pain_trigger: f64,
    /// Flip distance (percent) inside which long-calls confidence gains.
    #[serde(default = "default_squeeze_flip_distance")]
    pub flip_distance: f64,
    /// Flip distance (percent) required for long puts.
    #[serde(default = "default_squeeze_put_flip_distance")]
    pub put_flip_distance: f64,
    /// Long-calls confidence.
    #[serde(default = "default_long_calls_confidence")]
    pub long_calls_confidence: ConfidenceBlend,
    /// Long-puts confidence.
    #[serde(default = "default_long_puts_confidence")]
    pub long_puts_confidence: ConfidenceBlend,
    /// Quoted expiry window.
    #[serde(default = "default_squeeze_dte")]
    pub dte_range: DteRange,
    /// Historical win-rate estimate for long calls (percent).
    #[serde(default = "default_long_calls_win_rate")]
    pub long_calls_win_rate: f64,
    /// Historical win-rate estimate for long puts (percent).
    #[serde(default = "default_long_puts_win_rate")]
    pub long_puts_win_rate: f64,
}

impl Default for SqueezeConfig {
    fn default() -> Self {
        Self {
            negative_gex: default_squeeze_negative_gex(),
            positive_gex: default_squeeze_positive_gex(),
            pain_trigger: default_squeeze_pain_trigger(),
            flip_distance: default_squeeze_flip_distance(),
            put_flip_distance: default_squeeze_put_flip_distance(),
            long_calls_confidence: default_long_calls_confidence(),
            long_puts_confidence: default_long_puts_confidence(),
            dte_range: default_squeeze_dte(),
            long_calls_win_rate: default_long_calls_win_rate(),
            long_puts_win_rate: default_long_puts_win_rate(),
        }
    }
}

fn default_squeeze_negative_gex() -> SymbolThreshold {
    SymbolThreshold {
        default: -100e6,
        overrides: BTreeMap::from([("SPY".to_string(), -1e9), ("QQQ".to_string(), -500e6)]),
    }
}
fn default_squeeze_positive_gex() -> SymbolThreshold {
    SymbolThreshold {
        default: 500e6,
        overrides: BTreeMap::from([("SPY".to_string(), 2e9), ("QQQ".to_string(), 1e9)]),
    }
}
const fn default_squeeze_pain_trigger() -> f64 {
    70.0
}
const fn default_squeeze_flip_distance() -> f64 {
    1.5
}
const fn default_squeeze_put_flip_distance() -> f64 {
    0.5
}
const fn default_long_calls_confidence() -> ConfidenceBlend {
    ConfidenceBlend {
        base: 65.0,
        pain_weight: 0.3,
        distance_weight: 10.0,
        ceiling: 95.0,
    }
}
const fn default_long_puts_confidence() -> ConfidenceBlend {
    ConfidenceBlend {
        base: 55.0,
        pain_weight: 0.2,
        distance_weight: 20.0,
        ceiling: 75.0,
    }
}
const fn default_squeeze_dte() -> DteRange {
    DteRange { min: 0, max: 7 }
}
const fn default_long_calls_win_rate() -> f64 {
    65.0
}
const fn default_long_puts_win_rate() -> f64 {
    58.0
}

/// Premium-selling family configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PremiumSellingConfig {
    /// Net GEX above which premium selling is considered.
    #[serde(default = "default_premium_positive_gex")]
    pub positive_gex: f64,
    /// Wall magnitude at which the wall earns its full confidence bonus.
    #[serde(default = "default_wall_strength")]
    pub wall_strength: f64,
    /// Call wall distance above spot (percent).
    #[serde(default = "default_call_wall_band")]
    pub call_wall_band: DistanceBand,
    /// Put wall distance below spot (percent).
    #[serde(default = "default_put_wall_band")]
    pub put_wall_band: DistanceBand,
    /// Confidence from the strength of the wall being sold against.
    #[serde(default = "default_premium_confidence")]
    pub confidence: WallConfidence,
    /// Quoted expiry window for short calls.
    #[serde(default = "default_call_dte")]
    pub call_dte_range: DteRange,
    /// Quoted expiry window for short puts.
    #[serde(default = "default_put_dte")]
    pub put_dte_range: DteRange,
    /// Historical win-rate estimate for short calls (percent).
    #[serde(default = "default_sell_calls_win_rate")]
    pub call_win_rate: f64,
    /// Historical win-rate estimate for short puts (percent).
    #[serde(default = "default_sell_puts_win_rate")]
    pub put_win_rate: f64,
}

impl Default for PremiumSellingConfig {
    fn default() -> Self {
        Self {
            positive_gex: default_premium_positive_gex(),
            wall_strength: default_wall_strength(),
            call_wall_band: default_call_wall_band(),
            put_wall_band: default_put_wall_band(),
            confidence: default_premium_confidence(),
            call_dte_range: default_call_dte(),
            put_dte_range: default_put_dte(),
            call_win_rate: default_sell_calls_win_rate(),
            put_win_rate: default_sell_puts_win_rate(),
        }
    }
}

const fn default_premium_positive_gex() -> f64 {
    3e9
}
const fn default_wall_strength() -> f64 {
    500e6
}
const fn default_call_wall_band() -> DistanceBand {
    DistanceBand { min: 1.0, max: 5.0 }
}
const fn default_put_wall_band() -> DistanceBand {
    DistanceBand { min: 1.0, max: 8.0 }
}
const fn default_premium_confidence() -> WallConfidence {
    WallConfidence {
        base: 60.0,
        wall_weight: 10.0,
        ceiling: 85.0,
    }
}
const fn default_call_dte() -> DteRange {
    DteRange { min: 0, max: 2 }
}
const fn default_put_dte() -> DteRange {
    DteRange { min: 2, max: 5 }
}
const fn default_sell_calls_win_rate() -> f64 {
    70.0
}
const fn default_sell_puts_win_rate() -> f64 {
    72.0
}

/// Iron-condor family configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IronCondorConfig {
    /// Net GEX above which a condor is considered.
    #[serde(default = "default_condor_min_gex")]
    pub min_gex: f64,
    /// Minimum distance between the nearest call and put walls (percent of spot).
    #[serde(default = "default_min_wall_spread")]
    pub min_wall_spread: f64,
    /// Confidence: base plus `distance_weight * (spread - min_wall_spread)`.
    #[serde(default = "default_condor_confidence")]
    pub confidence: ConfidenceBlend,
    /// Quoted expiry window.
    #[serde(default = "default_condor_dte")]
    pub dte_range: DteRange,
    /// Historical win-rate estimate (percent).
    #[serde(default = "default_condor_win_rate")]
    pub win_rate: f64,
}

impl Default for IronCondorConfig {
    fn default() -> Self {
        Self {
            min_gex: default_condor_min_gex(),
            min_wall_spread: default_min_wall_spread(),
            confidence: default_condor_confidence(),
            dte_range: default_condor_dte(),
            win_rate: default_condor_win_rate(),
        }
    }
}

const fn default_condor_min_gex() -> f64 {
    1e9
}
const fn default_min_wall_spread() -> f64 {
    3.0
}
const fn default_condor_confidence() -> ConfidenceBlend {
    ConfidenceBlend {
        base: 60.0,
        pain_weight: 0.0,
        distance_weight: 2.0,
        ceiling: 80.0,
    }
}
const fn default_condor_dte() -> DteRange {
    DteRange { min: 5, max: 10 }
}
const fn default_condor_win_rate() -> f64 {
    68.0
}

/// Fallback branch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Dealer pain above which a volatility signal replaces WAIT.
    #[serde(default = "default_volatility_pain")]
    pub volatility_pain: f64,
    /// Volatility confidence as `pain_weight * dealer_pain`, capped.
    #[serde(default = "default_volatility_confidence")]
    pub confidence: ConfidenceBlend,
    /// Historical win-rate estimate (percent).
    #[serde(default = "default_volatility_win_rate")]
    pub win_rate: f64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            volatility_pain: default_volatility_pain(),
            confidence: default_volatility_confidence(),
            win_rate: default_volatility_win_rate(),
        }
    }
}

const fn default_volatility_pain() -> f64 {
    60.0
}
const fn default_volatility_confidence() -> ConfidenceBlend {
    ConfidenceBlend {
        base: 0.0,
        pain_weight: 0.8,
        distance_weight: 0.0,
        ceiling: 75.0,
    }
}
const fn default_volatility_win_rate() -> f64 {
    55.0
}

/// Position sizing and exit rules, as fractions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskManagementConfig {
    /// Capital fraction per squeeze trade.
    #[serde(default = "default_squeeze_fraction")]
    pub max_position_size_squeeze: Decimal,
    /// Capital fraction per premium-selling trade.
    #[serde(default = "default_premium_fraction")]
    pub max_position_size_premium: Decimal,
    /// Capital fraction per iron condor.
    #[serde(default = "default_condor_fraction")]
    pub max_position_size_condor: Decimal,
    /// Capital fraction per volatility trade.
    #[serde(default = "default_volatility_fraction")]
    pub max_position_size_volatility: Decimal,
    /// Stop as a fraction of premium paid or received.
    #[serde(default = "default_stop_loss")]
    pub stop_loss_percentage: f64,
    /// Profit target for long premium.
    #[serde(default = "default_target_long")]
    pub profit_target_long: f64,
    /// Profit target for short premium.
    #[serde(default = "default_target_short")]
    pub profit_target_short: f64,
}

impl Default for RiskManagementConfig {
    fn default() -> Self {
        Self {
            max_position_size_squeeze: default_squeeze_fraction(),
            max_position_size_premium: default_premium_fraction(),
            max_position_size_condor: default_condor_fraction(),
            max_position_size_volatility: default_volatility_fraction(),
            stop_loss_percentage: default_stop_loss(),
            profit_target_long: default_target_long(),
            profit_target_short: default_target_short(),
        }
    }
}

impl RiskManagementConfig {
    fn fractions(&self) -> [(&'static str, Decimal); 4] {
        [
            ("max_position_size_squeeze", self.max_position_size_squeeze),
            ("max_position_size_premium", self.max_position_size_premium),
            ("max_position_size_condor", self.max_position_size_condor),
            ("max_position_size_volatility", self.max_position_size_volatility),
        ]
    }
}

const fn default_squeeze_fraction() -> Decimal {
    dec!(0.03)
}
const fn default_premium_fraction() -> Decimal {
    dec!(0.05)
}
const fn default_condor_fraction() -> Decimal {
    dec!(0.02)
}
const fn default_volatility_fraction() -> Decimal {
    dec!(0.02)
}
const fn default_stop_loss() -> f64 {
    0.50
}
const fn default_target_long() -> f64 {
    1.00
}
const fn default_target_short() -> f64 {
    0.50
}

// ============================================
// Stress heuristics
// ============================================

/// Dealer stress heuristics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StressConfig {
    /// Dealer pain scoring.
    #[serde(default)]
    pub dealer_pain: DealerPainConfig,
    /// Market maker status thresholds.
    #[serde(default)]
    pub status: StatusConfig,
    /// Order flow toxicity scoring.
    #[serde(default)]
    pub toxicity: ToxicityConfig,
    /// Pattern detector thresholds.
    #[serde(default)]
    pub patterns: PatternConfig,
}

/// Dealer pain scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealerPainConfig {
    /// Points per billion of negative net GEX.
    #[serde(default = "default_points_per_billion")]
    pub points_per_billion: f64,
    /// Cap on the negative-GEX component.
    #[serde(default = "default_negative_gex_cap")]
    pub negative_gex_cap: f64,
    /// Flip distance (percent) for the near-flip bonus.
    #[serde(default = "default_near_flip")]
    pub near_flip_distance: f64,
    /// Near-flip bonus.
    #[serde(default = "default_near_flip_points")]
    pub near_flip_points: f64,
    /// Flip distance (percent) for the close-to-flip bonus.
    #[serde(default = "default_close_flip")]
    pub close_flip_distance: f64,
    /// Close-to-flip bonus.
    #[serde(default = "default_close_flip_points")]
    pub close_flip_points: f64,
    /// Band around spot (percent) counted as near the money for pin risk.
    #[serde(default = "default_pin_band")]
    pub pin_band_pct: f64,
    /// Pin risk above which the pin bonus applies.
    #[serde(default = "default_pin_risk_threshold")]
    pub pin_risk_threshold: f64,
    /// Pin bonus.
    #[serde(default = "default_pin_points")]
    pub pin_points: f64,
    /// Volume to open interest ratio that flags institutional flow.
    #[serde(default = "default_institutional_ratio")]
    pub institutional_ratio: f64,
    /// Institutional flow bonus.
    #[serde(default = "default_institutional_points")]
    pub institutional_points: f64,
}

impl Default for DealerPainConfig {
    fn default() -> Self {
        Self {
            points_per_billion: default_points_per_billion(),
            negative_gex_cap: default_negative_gex_cap(),
            near_flip_distance: default_near_flip(),
            near_flip_points: default_near_flip_points(),
            close_flip_distance: default_close_flip(),
            close_flip_points: default_close_flip_points(),
            pin_band_pct: default_pin_band(),
            pin_risk_threshold: default_pin_risk_threshold(),
            pin_points: default_pin_points(),
            institutional_ratio: default_institutional_ratio(),
            institutional_points: default_institutional_points(),
        }
    }
}

const fn default_points_per_billion() -> f64 {
    10.0
}
const fn default_negative_gex_cap() -> f64 {
    50.0
}
const fn default_near_flip() -> f64 {
    1.0
}
const fn default_near_flip_points() -> f64 {
    30.0
}
const fn default_close_flip() -> f64 {
    2.0
}
const fn default_close_flip_points() -> f64 {
    20.0
}
const fn default_pin_band() -> f64 {
    1.0
}
const fn default_pin_risk_threshold() -> f64 {
    70.0
}
const fn default_pin_points() -> f64 {
    20.0
}
const fn default_institutional_ratio() -> f64 {
    0.5
}
const fn default_institutional_points() -> f64 {
    10.0
}

/// Market maker status thresholds, evaluated in field order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Dealer pain above which dealers are trapped.
    #[serde(default = "default_trapped_pain")]
    pub trapped_pain: f64,
    /// Dealer pain above which dealers are scrambling.
    #[serde(default = "default_scrambling_pain")]
    pub scrambling_pain: f64,
    /// Net GEX above which dealers are defending.
    #[serde(default = "default_defending_gex")]
    pub defending_gex: f64,
    /// Flip distance (percent) inside which dealers are vulnerable.
    #[serde(default = "default_vulnerable_distance")]
    pub vulnerable_distance: f64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            trapped_pain: default_trapped_pain(),
            scrambling_pain: default_scrambling_pain(),
            defending_gex: default_defending_gex(),
            vulnerable_distance: default_vulnerable_distance(),
        }
    }
}

const fn default_trapped_pain() -> f64 {
    80.0
}
const fn default_scrambling_pain() -> f64 {
    60.0
}
const fn default_defending_gex() -> f64 {
    3e9
}
const fn default_vulnerable_distance() -> f64 {
    1.0
}

/// Order flow toxicity heuristic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToxicityConfig {
    /// Open interest on either side that marks a strike as institutionally held.
    #[serde(default = "default_large_oi")]
    pub large_oi: u64,
    /// Number of such strikes required (strictly more than).
    #[serde(default = "default_large_oi_strikes")]
    pub large_oi_strikes: usize,
    /// Points added for concentrated open interest.
    #[serde(default = "default_large_oi_points")]
    pub large_oi_points: f64,
    /// Expirations at or inside this many days count as near term.
    #[serde(default = "default_near_term_dte")]
    pub near_term_dte: i64,
    /// Near-term share of volume above which retail dominates.
    #[serde(default = "default_near_term_share")]
    pub near_term_share: f64,
    /// Points subtracted for near-term dominance.
    #[serde(default = "default_near_term_points")]
    pub near_term_points: f64,
    /// Strikes beyond this distance from spot (percent) are far out of the money.
    #[serde(default = "default_far_otm_pct")]
    pub far_otm_pct: f64,
    /// Number of active far-OTM contracts required (strictly more than).
    #[serde(default = "default_far_otm_contracts")]
    pub far_otm_contracts: usize,
    /// Points subtracted for far-OTM activity.
    #[serde(default = "default_far_otm_points")]
    pub far_otm_points: f64,
    /// Volume below which a strike counts as small-lot.
    #[serde(default = "default_small_lot_volume")]
    pub small_lot_volume: u64,
    /// Number of small-lot strikes required (strictly more than).
    #[serde(default = "default_small_lot_strikes")]
    pub small_lot_strikes: usize,
    /// Points subtracted for small-lot activity.
    #[serde(default = "default_small_lot_points")]
    pub small_lot_points: f64,
    /// Points added inside the institutional execution windows.
    #[serde(default = "default_window_points")]
    pub institutional_window_points: f64,
}

impl Default for ToxicityConfig {
    fn default() -> Self {
        Self {
            large_oi: default_large_oi(),
            large_oi_strikes: default_large_oi_strikes(),
            large_oi_points: default_large_oi_points(),
            near_term_dte: default_near_term_dte(),
            near_term_share: default_near_term_share(),
            near_term_points: default_near_term_points(),
            far_otm_pct: default_far_otm_pct(),
            far_otm_contracts: default_far_otm_contracts(),
            far_otm_points: default_far_otm_points(),
            small_lot_volume: default_small_lot_volume(),
            small_lot_strikes: default_small_lot_strikes(),
            small_lot_points: default_small_lot_points(),
            institutional_window_points: default_window_points(),
        }
    }
}

const fn default_large_oi() -> u64 {
    1000
}
const fn default_large_oi_strikes() -> usize {
    5
}
const fn default_large_oi_points() -> f64 {
    20.0
}
const fn default_near_term_dte() -> i64 {
    7
}
const fn default_near_term_share() -> f64 {
    0.7
}
const fn default_near_term_points() -> f64 {
    20.0
}
const fn default_far_otm_pct() -> f64 {
    10.0
}
const fn default_far_otm_contracts() -> usize {
    10
}
const fn default_far_otm_points() -> f64 {
    15.0
}
const fn default_small_lot_volume() -> u64 {
    10
}
const fn default_small_lot_strikes() -> usize {
    20
}
const fn default_small_lot_points() -> f64 {
    10.0
}
const fn default_window_points() -> f64 {
    10.0
}

/// Market maker pattern thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Dealer pain above which dealers are trapped.
    #[serde(default = "default_trapped_pain")]
    pub trapped_pain: f64,
    /// Confidence ceiling for the trapped pattern.
    #[serde(default = "default_trapped_ceiling")]
    pub trapped_ceiling: f64,
    /// Net GEX below which a gamma squeeze can develop.
    #[serde(default = "default_pattern_squeeze_gex")]
    pub squeeze_net_gex: f64,
    /// Flip distance (percent) for the gamma squeeze pattern.
    #[serde(default = "default_vulnerable_distance")]
    pub squeeze_distance: f64,
    /// Flip distance (percent) for pin risk.
    #[serde(default = "default_pin_distance")]
    pub pin_distance: f64,
    /// Absolute net GEX required for Friday charm flow.
    #[serde(default = "default_charm_gex")]
    pub charm_net_gex: f64,
    /// Dealer pain required in OPEX week.
    #[serde(default = "default_scrambling_pain")]
    pub opex_pain: f64,
    /// Volatility index above which vanna flows matter.
    #[serde(default = "default_vanna_vix")]
    pub vanna_volatility_index: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            trapped_pain: default_trapped_pain(),
            trapped_ceiling: default_trapped_ceiling(),
            squeeze_net_gex: default_pattern_squeeze_gex(),
            squeeze_distance: default_vulnerable_distance(),
            pin_distance: default_pin_distance(),
            charm_net_gex: default_charm_gex(),
            opex_pain: default_scrambling_pain(),
            vanna_volatility_index: default_vanna_vix(),
        }
    }
}

const fn default_trapped_ceiling() -> f64 {
    95.0
}
const fn default_pattern_squeeze_gex() -> f64 {
    -1e9
}
const fn default_pin_distance() -> f64 {
    0.3
}
const fn default_charm_gex() -> f64 {
    2e9
}
const fn default_vanna_vix() -> f64 {
    20.0
}

// ============================================
// Session
// ============================================

/// Regular trading session in market-local time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session open.
    #[serde(default = "default_session_open")]
    pub open: NaiveTime,
    /// Session close.
    #[serde(default = "default_session_close")]
    pub close: NaiveTime,
    /// Hour (market-local) from which Friday counts as afternoon.
    #[serde(default = "default_friday_afternoon_hour")]
    pub friday_afternoon_hour: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            open: default_session_open(),
            close: default_session_close(),
            friday_afternoon_hour: default_friday_afternoon_hour(),
        }
    }
}

fn default_session_open() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 30, 0).unwrap_or(NaiveTime::MIN)
}
fn default_session_close() -> NaiveTime {
    NaiveTime::from_hms_opt(16, 0, 0).unwrap_or(NaiveTime::MIN)
}
const fn default_friday_afternoon_hour() -> u32 {
    14
}

// ============================================
// Scanner
// ============================================

/// Scanner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Maximum symbols in flight at once.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    /// Per-symbol ceiling in seconds.
    #[serde(default = "default_task_timeout")]
    pub task_timeout_secs: u64,
    /// Signals below this confidence are dropped unless nothing remains.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    /// Offline batches smaller than this run sequentially.
    #[serde(default = "default_min_parallel_jobs")]
    pub min_parallel_jobs: usize,
    /// Expirations further out than this are discarded on load.
    #[serde(default = "default_max_days_to_expiry")]
    pub max_days_to_expiry: i64,
    /// Universe scanned by the binary.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    /// Directory of chain snapshots replayed by the binary.
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: String,
    /// Opportunity score weights.
    #[serde(default)]
    pub score: ScoreWeights,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            task_timeout_secs: default_task_timeout(),
            min_confidence: default_min_confidence(),
            min_parallel_jobs: default_min_parallel_jobs(),
            max_days_to_expiry: default_max_days_to_expiry(),
            symbols: default_symbols(),
            snapshot_dir: default_snapshot_dir(),
            score: ScoreWeights::default(),
        }
    }
}

impl ScannerConfig {
    /// Per-symbol timeout.
    #[must_use]
    pub const fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }
}

const fn default_max_workers() -> usize {
    25
}
const fn default_task_timeout() -> u64 {
    10
}
const fn default_min_confidence() -> f64 {
    65.0
}
const fn default_min_parallel_jobs() -> usize {
    4
}
const fn default_max_days_to_expiry() -> i64 {
    14
}
fn default_symbols() -> Vec<String> {
    ["SPY", "QQQ", "IWM", "AAPL", "NVDA", "TSLA", "AMD", "META"]
        .iter()
        .map(ToString::to_string)
        .collect()
}
fn default_snapshot_dir() -> String {
    "data/snapshots".to_string()
}

/// A flip-proximity bonus tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlipBonus {
    /// Applies when `|distance_to_flip|` is strictly below this (percent).
    pub within: f64,
    /// Points awarded.
    pub bonus: f64,
}

/// Opportunity score weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight on market maker vulnerability.
    #[serde(default = "default_vulnerability_weight")]
    pub vulnerability: f64,
    /// Weight on dealer pain.
    #[serde(default = "default_pain_weight")]
    pub dealer_pain: f64,
    /// Weight on the best signal's confidence.
    #[serde(default = "default_confidence_weight")]
    pub confidence: f64,
    /// Flip-proximity tiers; the largest matching bonus applies.
    #[serde(default = "default_flip_bonuses")]
    pub flip_bonuses: Vec<FlipBonus>,
    /// Bonus during OPEX week.
    #[serde(default = "default_opex_bonus")]
    pub opex_bonus: f64,
    /// Bonus during quad witching week.
    #[serde(default = "default_quad_witching_bonus")]
    pub quad_witching_bonus: f64,
    /// Bonus on Friday afternoon.
    #[serde(default = "default_friday_bonus")]
    pub friday_afternoon_bonus: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            vulnerability: default_vulnerability_weight(),
            dealer_pain: default_pain_weight(),
            confidence: default_confidence_weight(),
            flip_bonuses: default_flip_bonuses(),
            opex_bonus: default_opex_bonus(),
            quad_witching_bonus: default_quad_witching_bonus(),
            friday_afternoon_bonus: default_friday_bonus(),
        }
    }
}

const fn default_vulnerability_weight() -> f64 {
    0.4
}
const fn default_pain_weight() -> f64 {
    0.2
}
const fn default_confidence_weight() -> f64 {
    0.2
}
fn default_flip_bonuses() -> Vec<FlipBonus> {
    vec![
        FlipBonus {
            within: 0.5,
            bonus: 10.0,
        },
        FlipBonus {
            within: 1.0,
            bonus: 7.0,
        },
        FlipBonus {
            within: 2.0,
            bonus: 3.0,
        },
    ]
}
const fn default_opex_bonus() -> f64 {
    5.0
}
const fn default_quad_witching_bonus() -> f64 {
    5.0
}
const fn default_friday_bonus() -> f64 {
    3.0
}

// ============================================
// Observability
// ============================================

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Serve Prometheus metrics.
    #[serde(default)]
    pub metrics_enabled: bool,
    /// Prometheus listener address.
    #[serde(default = "default_metrics_addr")]
    pub metrics_addr: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_addr: default_metrics_addr(),
        }
    }
}

fn default_metrics_addr() -> String {
    "0.0.0.0:9090".to_string()
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string.
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = if interpolated.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml_bw::from_str(&interpolated)?
    };
    validate_config(&config)?;
    Ok(config)
}

/// Replace `${VAR}` and `${VAR:-default}` with environment values.
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let mut result = input.to_string();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        // This regex pattern is compile-time constant and always valid
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    for cap in re.captures_iter(input) {
        let (Some(full_match), Some(var_match)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let default_value = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_match.as_str()) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        };

        result = result.replace(full_match.as_str(), &value);
    }

    result
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let pricing = &config.pricing;
    if !(0.0..=1.0).contains(&pricing.risk_free_rate) {
        return Err(invalid("risk_free_rate must be between 0.0 and 1.0"));
    }
    if pricing.trading_capital <= Decimal::ZERO {
        return Err(invalid("trading_capital must be positive"));
    }
    if pricing.days_per_year <= 0.0 {
        return Err(invalid("days_per_year must be positive"));
    }

    let strategies = &config.strategies;
    for (name, fraction) in strategies.risk_management.fractions() {
        if fraction <= Decimal::ZERO || fraction > Decimal::ONE {
            return Err(invalid(format!("{name} must be in (0, 1]")));
        }
    }

    let squeeze = &strategies.squeeze;
    if squeeze.negative_gex.values().any(|v| v >= 0.0) {
        return Err(invalid("squeeze.negative_gex thresholds must be negative"));
    }
    if squeeze.positive_gex.values().any(|v| v <= 0.0) {
        return Err(invalid("squeeze.positive_gex thresholds must be positive"));
    }

    let premium = &strategies.premium_selling;
    for (name, band) in [
        ("call_wall_band", premium.call_wall_band),
        ("put_wall_band", premium.put_wall_band),
    ] {
        if band.min < 0.0 || band.min > band.max {
            return Err(invalid(format!(
                "premium_selling.{name} must satisfy 0 <= min <= max"
            )));
        }
    }
    if premium.wall_strength <= 0.0 {
        return Err(invalid("premium_selling.wall_strength must be positive"));
    }
    if premium.confidence.wall_weight < 0.0 {
        return Err(invalid("premium_selling.confidence.wall_weight must be non-negative"));
    }

    let scanner = &config.scanner;
    if scanner.max_workers == 0 {
        return Err(invalid("scanner.max_workers must be greater than 0"));
    }
    if scanner.task_timeout_secs == 0 {
        return Err(invalid("scanner.task_timeout_secs must be greater than 0"));
    }
    if !(0.0..=100.0).contains(&scanner.min_confidence) {
        return Err(invalid("scanner.min_confidence must be between 0 and 100"));
    }

    let score = &scanner.score;
    let weights = [
        score.vulnerability,
        score.dealer_pain,
        score.confidence,
        score.opex_bonus,
        score.quad_witching_bonus,
        score.friday_afternoon_bonus,
    ];
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0)
        || score.flip_bonuses.iter().any(|t| !t.bonus.is_finite() || t.bonus < 0.0)
    {
        return Err(invalid("scanner.score weights must be non-negative"));
    }

    if config.session.open >= config.session.close {
        return Err(invalid("session.open must be before session.close"));
    }

    Ok(())
}
