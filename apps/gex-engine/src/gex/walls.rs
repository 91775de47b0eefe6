//! Call and put walls.

use crate::models::{StrikeAggregate, Wall};

/// Number of walls kept on each side.
pub const MAX_WALLS: usize = 5;

/// Strikes with strictly positive call exposure, largest first.
///
/// Ties keep ascending strike order.
#[must_use]
pub fn call_walls(strikes: &[StrikeAggregate]) -> Vec<Wall> {
    let mut walls: Vec<Wall> = strikes
        .iter()
        .filter(|row| row.call_gex > 0.0)
        .map(|row| Wall {
            strike: row.strike,
            gex: row.call_gex,
        })
        .collect();
    walls.sort_by(|a, b| b.gex.total_cmp(&a.gex));
    walls.truncate(MAX_WALLS);
    walls
}

/// Strikes with strictly negative put exposure, most negative first.
///
/// Ties keep ascending strike order.
#[must_use]
pub fn put_walls(strikes: &[StrikeAggregate]) -> Vec<Wall> {
    let mut walls: Vec<Wall> = strikes
        .iter()
        .filter(|row| row.put_gex < 0.0)
        .map(|row| Wall {
            strike: row.strike,
            gex: row.put_gex,
        })
        .collect();
    walls.sort_by(|a, b| a.gex.total_cmp(&b.gex));
    walls.truncate(MAX_WALLS);
    walls
}
