//! Gamma exposure profile construction.
//!
//! Converts a chain snapshot into strike-indexed exposure:
//!
//! - per contract: `call_gex = spot * gamma * oi * 100`, `put_gex = -spot * gamma * oi * 100`
//! - rows aggregated by strike across every retained expiration
//! - cumulative exposure over ascending strikes
//! - gamma flip by linear interpolation of the cumulative sign change
//! - top call and put walls

mod builder;
mod exposure;
mod flip;
mod walls;

pub use builder::{CONTRACT_MULTIPLIER, GexProfileBuilder};
pub use exposure::GexExposure;
pub use flip::gamma_flip;
pub use walls::{MAX_WALLS, call_walls, put_walls};
