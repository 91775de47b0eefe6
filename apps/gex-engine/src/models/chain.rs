//! Option chain snapshot as delivered by the market-data collaborator.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One listed contract on one side of one expiration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    /// Strike price.
    pub strike: f64,
    /// Open interest (contracts).
    #[serde(default)]
    pub open_interest: u64,
    /// Implied volatility as a decimal (0.25 = 25%), if the provider has one.
    #[serde(default)]
    pub implied_volatility: Option<f64>,
    /// Session volume (contracts).
    #[serde(default)]
    pub volume: u64,
}

impl OptionContract {
    /// Create a contract.
    #[must_use]
    pub const fn new(
        strike: f64,
        open_interest: u64,
        implied_volatility: Option<f64>,
        volume: u64,
    ) -> Self {
        Self {
            strike,
            open_interest,
            implied_volatility,
            volume,
        }
    }

    /// Whether the strike can be priced at all.
    #[must_use]
    pub fn has_valid_strike(&self) -> bool {
        self.strike.is_finite() && self.strike > 0.0
    }
}

/// Calls and puts for a single expiration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpirationChain {
    /// Call contracts.
    #[serde(default)]
    pub calls: Vec<OptionContract>,
    /// Put contracts.
    #[serde(default)]
    pub puts: Vec<OptionContract>,
    /// Calendar days until expiration.
    pub days_to_expiry: i64,
    /// When the provider returned this chain.
    pub fetched_at: DateTime<Utc>,
}

impl ExpirationChain {
    /// Total traded volume across both sides.
    #[must_use]
    pub fn total_volume(&self) -> u64 {
        self.calls
            .iter()
            .chain(self.puts.iter())
            .map(|c| c.volume)
            .sum()
    }

    /// Iterate both sides.
    pub fn contracts(&self) -> impl Iterator<Item = &OptionContract> {
        self.calls.iter().chain(self.puts.iter())
    }
}

/// Per-symbol chain snapshot across the retained expirations.
///
/// Expirations are keyed by date so iteration order is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    /// Underlying symbol.
    pub symbol: String,
    /// Spot price of the underlying.
    pub spot: f64,
    /// Chains by expiration date.
    #[serde(default)]
    pub expirations: BTreeMap<NaiveDate, ExpirationChain>,
}

impl ChainSnapshot {
    /// Create a snapshot with no expirations.
    #[must_use]
    pub fn new(symbol: impl Into<String>, spot: f64) -> Self {
        Self {
            symbol: symbol.into(),
            spot,
            expirations: BTreeMap::new(),
        }
    }

    /// Add an expiration.
    #[must_use]
    pub fn with_expiration(mut self, expiration: NaiveDate, chain: ExpirationChain) -> Self {
        self.expirations.insert(expiration, chain);
        self
    }

    /// Whether the snapshot carries anything the exposure model can use.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.spot.is_finite() && self.spot > 0.0 && !self.expirations.is_empty()
    }

    /// Keep only expirations with `0 < days_to_expiry <= max_days`.
    #[must_use]
    pub fn within_horizon(mut self, max_days: i64) -> Self {
        self.expirations
            .retain(|_, chain| chain.days_to_expiry > 0 && chain.days_to_expiry <= max_days);
        self
    }

    /// Traded volume across all expirations.
    #[must_use]
    pub fn total_volume(&self) -> u64 {
        self.expirations.values().map(ExpirationChain::total_volume).sum()
    }
}
