//! Rule-based signal generation.
//!
//! Three strategy families run unconditionally and their outputs are
//! concatenated:
//!
//! 1. **Squeeze**: long calls when dealers are short gamma or in pain, long
//!    puts when large positive gamma sits on the flip
//! 2. **Premium selling**: short calls/puts against the strongest walls
//! 3. **Iron condor**: range trade between the nearest walls
//!
//! When nothing fires, a single VOLATILITY or WAIT signal is emitted, so the
//! output is never empty. Thresholds come from [`crate::config::StrategiesConfig`].

mod condor;
mod generator;
mod premium;
mod squeeze;

#[cfg(test)]
pub(crate) mod fixtures;

pub use generator::SignalGenerator;
