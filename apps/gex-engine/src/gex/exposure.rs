//! Strike-indexed exposure with derived totals, flip and walls.

use serde::{Deserialize, Serialize};

use super::flip::gamma_flip;
use super::walls::{call_walls, put_walls};
use crate::models::{StrikeAggregate, Wall};

/// Exposure portion of a profile: everything derivable from strike rows alone.
///
/// Invariants established by [`GexExposure::from_strikes`]:
/// - rows sorted by ascending strike, non-finite strikes dropped
/// - `net_gex == total_call_gex + total_put_gex`
/// - the last row's `cumulative_gex` equals `net_gex` (within float tolerance)
/// - `gamma_flip` lies within the strike range, or equals spot when there are no rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GexExposure {
    symbol: String,
    current_price: f64,
    strikes: Vec<StrikeAggregate>,
    net_gex: f64,
    total_call_gex: f64,
    total_put_gex: f64,
    total_volume: u64,
    total_oi: u64,
    gamma_flip: f64,
    distance_to_flip: f64,
    call_walls: Vec<Wall>,
    put_walls: Vec<Wall>,
}

impl GexExposure {
    /// Assemble exposure from aggregated strike rows.
    #[must_use]
    pub fn from_strikes(
        symbol: impl Into<String>,
        current_price: f64,
        mut strikes: Vec<StrikeAggregate>,
    ) -> Self {
        strikes.retain(|row| row.strike.is_finite());
        strikes.sort_by(|a, b| a.strike.total_cmp(&b.strike));

        let mut cumulative = 0.0;
        let mut total_call_gex = 0.0;
        let mut total_put_gex = 0.0;
        let mut total_volume = 0u64;
        let mut total_oi = 0u64;

        for row in &mut strikes {
            cumulative += row.net_gex();
            row.cumulative_gex = cumulative;
            total_call_gex += row.call_gex;
            total_put_gex += row.put_gex;
            total_volume = total_volume.saturating_add(row.total_volume());
            total_oi = total_oi.saturating_add(row.total_oi());
        }

        let gamma_flip = gamma_flip(&strikes, current_price);
        let distance_to_flip = if current_price.is_finite() && current_price > 0.0 {
            (current_price - gamma_flip) / current_price * 100.0
        } else {
            0.0
        };

        Self {
            symbol: symbol.into(),
            current_price,
            call_walls: call_walls(&strikes),
            put_walls: put_walls(&strikes),
            strikes,
            net_gex: total_call_gex + total_put_gex,
            total_call_gex,
            total_put_gex,
            total_volume,
            total_oi,
            gamma_flip,
            distance_to_flip,
        }
    }

    /// Underlying symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Spot price.
    #[must_use]
    pub const fn current_price(&self) -> f64 {
        self.current_price
    }

    /// Strike rows, ascending.
    #[must_use]
    pub fn strikes(&self) -> &[StrikeAggregate] {
        &self.strikes
    }

    /// Net exposure.
    #[must_use]
    pub const fn net_gex(&self) -> f64 {
        self.net_gex
    }

    /// Total call exposure.
    #[must_use]
    pub const fn total_call_gex(&self) -> f64 {
        self.total_call_gex
    }

    /// Total put exposure.
    #[must_use]
    pub const fn total_put_gex(&self) -> f64 {
        self.total_put_gex
    }

    /// Total volume.
    #[must_use]
    pub const fn total_volume(&self) -> u64 {
        self.total_volume
    }

    /// Total open interest.
    #[must_use]
    pub const fn total_oi(&self) -> u64 {
        self.total_oi
    }

    /// Gamma flip price.
    #[must_use]
    pub const fn gamma_flip(&self) -> f64 {
        self.gamma_flip
    }

    /// `(current_price - gamma_flip) / current_price * 100`.
    #[must_use]
    pub const fn distance_to_flip(&self) -> f64 {
        self.distance_to_flip
    }

    /// Call walls, largest first.
    #[must_use]
    pub fn call_walls(&self) -> &[Wall] {
        &self.call_walls
    }

    /// Put walls, most negative first.
    #[must_use]
    pub fn put_walls(&self) -> &[Wall] {
        &self.put_walls
    }

    /// Rows whose strike lies within `pct` percent of spot.
    pub fn strikes_near_spot(&self, pct: f64) -> impl Iterator<Item = &StrikeAggregate> {
        let spot = self.current_price;
        self.strikes
            .iter()
            .filter(move |row| spot > 0.0 && ((row.strike - spot) / spot).abs() * 100.0 <= pct)
    }
}
