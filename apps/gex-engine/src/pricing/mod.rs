//! Closed-form option pricing used by the exposure model.
//!
//! Only gamma is needed to size dealer hedging flows, so this module
//! exposes the Black-Scholes gamma together with the implied volatility
//! normalisation applied to raw chain data.

mod gamma;

pub use gamma::{
    DEFAULT_IMPLIED_VOL, GammaModel, MIN_IMPLIED_VOL, black_scholes_gamma, effective_volatility,
};
