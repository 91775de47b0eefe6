//! Black-Scholes gamma.
//!
//! Gamma is computed from the standard d1 term:
//!
//! ```text
//! d1    = (ln(S/K) + (r + 0.5 * sigma^2) * T) / (sigma * sqrt(T))
//! gamma = phi(d1) / (S * sigma * sqrt(T))
//! ```
//!
//! Degenerate inputs never produce an error; they produce exactly `0.0`.

// Black-Scholes uses standard mathematical notation (s, k, t, r, sigma)
#![allow(clippy::many_single_char_names)]

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Floor applied to implied volatility before pricing.
///
/// Near-zero volatility makes gamma explode at the money.
pub const MIN_IMPLIED_VOL: f64 = 0.15;

/// Volatility used when a contract carries no implied volatility.
pub const DEFAULT_IMPLIED_VOL: f64 = 0.30;

/// Standard normal PDF.
fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Black-Scholes d1 parameter.
fn d1(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / (sigma * t.sqrt())
}

/// Black-Scholes gamma for a European option.
///
/// Returns `0.0` when `t <= 0`, `sigma <= 0`, `s <= 0`, `k <= 0`, any input
/// is not finite, or the result itself is not finite.
#[must_use]
pub fn black_scholes_gamma(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    if !(s.is_finite() && k.is_finite() && t.is_finite() && r.is_finite() && sigma.is_finite()) {
        return 0.0;
    }
    if t <= 0.0 || sigma <= 0.0 || s <= 0.0 || k <= 0.0 {
        return 0.0;
    }

    let gamma = norm_pdf(d1(s, k, t, r, sigma)) / (s * sigma * t.sqrt());

    if gamma.is_finite() && gamma >= 0.0 {
        gamma
    } else {
        0.0
    }
}

/// Normalise a contract's implied volatility for pricing.
///
/// Missing or non-finite values default to [`DEFAULT_IMPLIED_VOL`];
/// everything else is floored at [`MIN_IMPLIED_VOL`].
#[must_use]
pub fn effective_volatility(implied_volatility: Option<f64>) -> f64 {
    match implied_volatility {
        Some(iv) if iv.is_finite() => iv.max(MIN_IMPLIED_VOL),
        _ => DEFAULT_IMPLIED_VOL,
    }
}

/// Gamma model bound to a risk-free rate and day-count convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GammaModel {
    /// Annualised risk-free rate.
    pub risk_free_rate: f64,
    /// Days per year used to convert days-to-expiry into years.
    pub days_per_year: f64,
}

impl Default for GammaModel {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.05,
            days_per_year: 365.0,
        }
    }
}

impl GammaModel {
    /// Create a gamma model.
    #[must_use]
    pub const fn new(risk_free_rate: f64, days_per_year: f64) -> Self {
        Self {
            risk_free_rate,
            days_per_year,
        }
    }

    /// Gamma of one contract given its days to expiry and raw implied volatility.
    #[must_use]
    pub fn contract_gamma(
        &self,
        spot: f64,
        strike: f64,
        days_to_expiry: i64,
        implied_volatility: Option<f64>,
    ) -> f64 {
        if self.days_per_year <= 0.0 {
            return 0.0;
        }
        let t = days_to_expiry as f64 / self.days_per_year;
        black_scholes_gamma(
            spot,
            strike,
            t,
            self.risk_free_rate,
            effective_volatility(implied_volatility),
        )
    }
}
