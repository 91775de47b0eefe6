//! Chain snapshot to exposure profile.

use tracing::debug;

use super::exposure::GexExposure;
use crate::models::{ChainSnapshot, GexProfile, MarketContext, OptionContract, StrikeAggregate};
use crate::pricing::GammaModel;
use crate::stress::StressAnalyzer;

/// Shares per listed equity option contract.
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

#[derive(Debug, Clone, Copy)]
enum Side {
    Call,
    Put,
}

/// Builds gamma exposure profiles from chain snapshots.
///
/// Pure over its inputs: the same snapshot and market context always produce
/// the same profile.
#[derive(Debug, Clone, Default)]
pub struct GexProfileBuilder {
    gamma: GammaModel,
    stress: StressAnalyzer,
}

impl GexProfileBuilder {
    /// Create a builder.
    #[must_use]
    pub const fn new(gamma: GammaModel, stress: StressAnalyzer) -> Self {
        Self { gamma, stress }
    }

    /// Gamma model in use.
    #[must_use]
    pub const fn gamma_model(&self) -> &GammaModel {
        &self.gamma
    }

    /// Build a full profile, or `None` when the snapshot has no expirations
    /// or no valid spot.
    #[must_use]
    pub fn build(&self, chain: &ChainSnapshot, context: &MarketContext) -> Option<GexProfile> {
        let exposure = self.build_exposure(chain)?;
        let stress = self.stress.analyze(&exposure, chain, context.now);
        let as_of = chain
            .expirations
            .values()
            .map(|exp| exp.fetched_at)
            .max()
            .unwrap_or_default();

        Some(GexProfile::new(
            exposure,
            stress,
            context.volatility_index,
            as_of,
        ))
    }

    /// Build the exposure portion only.
    #[must_use]
    pub fn build_exposure(&self, chain: &ChainSnapshot) -> Option<GexExposure> {
        if !chain.is_usable() {
            debug!(
                symbol = %chain.symbol,
                spot = chain.spot,
                expirations = chain.expirations.len(),
                "Snapshot not usable for exposure"
            );
            return None;
        }

        let strikes = self.aggregate(chain);
        debug!(symbol = %chain.symbol, strikes = strikes.len(), "Aggregated strikes");

        Some(GexExposure::from_strikes(
            chain.symbol.clone(),
            chain.spot,
            strikes,
        ))
    }

    /// Aggregate per-contract exposure by strike across all expirations.
    ///
    /// Rows come back sorted by ascending strike with `cumulative_gex` unset.
    /// Contracts with a non-positive or non-finite strike are skipped.
    #[must_use]
    pub fn aggregate(&self, chain: &ChainSnapshot) -> Vec<StrikeAggregate> {
        let mut rows: Vec<StrikeAggregate> = Vec::new();

        for expiration in chain.expirations.values() {
            let dte = expiration.days_to_expiry;
            for contract in &expiration.calls {
                self.accumulate(&mut rows, chain.spot, dte, contract, Side::Call);
            }
            for contract in &expiration.puts {
                self.accumulate(&mut rows, chain.spot, dte, contract, Side::Put);
            }
        }

        rows
    }

    fn accumulate(
        &self,
        rows: &mut Vec<StrikeAggregate>,
        spot: f64,
        days_to_expiry: i64,
        contract: &OptionContract,
        side: Side,
    ) {
        if !contract.has_valid_strike() {
            return;
        }

        let gamma = self.gamma.contract_gamma(
            spot,
            contract.strike,
            days_to_expiry,
            contract.implied_volatility,
        );
        let gex = spot * gamma * contract.open_interest as f64 * CONTRACT_MULTIPLIER;

        let idx = match rows.binary_search_by(|row| row.strike.total_cmp(&contract.strike)) {
            Ok(idx) => idx,
            Err(idx) => {
                rows.insert(idx, StrikeAggregate::new(contract.strike, 0.0, 0.0));
                idx
            }
        };
        let row = &mut rows[idx];

        match side {
            Side::Call => {
                row.call_gex += gex;
                row.call_oi = row.call_oi.saturating_add(contract.open_interest);
                row.call_volume = row.call_volume.saturating_add(contract.volume);
            }
            Side::Put => {
                row.put_gex -= gex;
                row.put_oi = row.put_oi.saturating_add(contract.open_interest);
                row.put_volume = row.put_volume.saturating_add(contract.volume);
            }
        }
    }
}
