//! Gamma flip location.

use crate::models::StrikeAggregate;

/// Locate the price at which cumulative net exposure changes sign.
///
/// Walks adjacent strike pairs in ascending order and interpolates linearly
/// inside the first interval whose cumulative values change sign (a zero at
/// either end counts). Intervals with equal cumulative values are skipped.
///
/// Falls back to the strike with the smallest absolute cumulative exposure
/// when no interval changes sign, and to `current_price` when `strikes` is
/// empty. `strikes` must be sorted ascending with `cumulative_gex` filled.
#[must_use]
pub fn gamma_flip(strikes: &[StrikeAggregate], current_price: f64) -> f64 {
    if strikes.is_empty() {
        return current_price;
    }

    for pair in strikes.windows(2) {
        let (lo, hi) = (&pair[0], &pair[1]);
        let (cum_lo, cum_hi) = (lo.cumulative_gex, hi.cumulative_gex);

        let crosses = (cum_lo <= 0.0 && cum_hi >= 0.0) || (cum_lo >= 0.0 && cum_hi <= 0.0);
        if !crosses {
            continue;
        }

        let jump = (cum_hi - cum_lo).abs();
        if jump == 0.0 || !jump.is_finite() {
            continue;
        }

        let flip = lo.strike + (cum_lo.abs() / jump) * (hi.strike - lo.strike);
        if flip.is_finite() {
            return flip.clamp(lo.strike, hi.strike);
        }
    }

    strikes
        .iter()
        .fold(None, |best: Option<&StrikeAggregate>, row| match best {
            Some(b) if b.cumulative_gex.abs() <= row.cumulative_gex.abs() => Some(b),
            _ => Some(row),
        })
        .map_or(current_price, |row| row.strike)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rows(points: &[(f64, f64)]) -> Vec<StrikeAggregate> {
        points
            .iter()
            .map(|&(strike, cumulative)| {
                let mut row = StrikeAggregate::new(strike, 0.0, 0.0);
                row.cumulative_gex = cumulative;
                row
            })
            .collect()
    }

    #[test]
    fn test_interpolates_first_sign_change() {
        let strikes = rows(&[(95.0, -2e8), (100.0, 1e8), (105.0, 3e8)]);
        let flip = gamma_flip(&strikes, 100.0);
        assert!((flip - (95.0 + (2e8 / 3e8) * 5.0)).abs() < 1e-9);
        assert!((flip - 98.333_333).abs() < 1e-5);
    }

    #[test]
    fn test_zero_boundary_counts_as_crossing() {
        let strikes = rows(&[(90.0, 0.0), (95.0, 5e7), (100.0, 1e8)]);
        assert_eq!(gamma_flip(&strikes, 97.0), 90.0);

        let strikes = rows(&[(90.0, -5e7), (95.0, 0.0), (100.0, 1e8)]);
        assert_eq!(gamma_flip(&strikes, 97.0), 95.0);
    }

    #[test]
    fn test_adjacent_equal_values_are_skipped() {
        let strikes = rows(&[(90.0, 0.0), (95.0, 0.0), (100.0, -4e8), (105.0, 4e8)]);
        // (90,95) crosses but has zero jump; (95,100) then yields 95 exactly.
        assert_eq!(gamma_flip(&strikes, 100.0), 95.0);

        let strikes = rows(&[(90.0, 0.0), (95.0, 0.0)]);
        // No usable interval: fallback to smallest |cum| (first on ties).
        assert_eq!(gamma_flip(&strikes, 100.0), 90.0);
    }

    #[test]
    fn test_fallback_without_sign_change() {
        let strikes = rows(&[(90.0, 5e8), (95.0, 2e8), (100.0, 7e8)]);
        assert_eq!(gamma_flip(&strikes, 93.0), 95.0);
    }

    #[test]
    fn test_empty_falls_back_to_current_price() {
        assert_eq!(gamma_flip(&[], 412.5), 412.5);
    }

    #[test]
    fn test_single_strike() {
        let strikes = rows(&[(100.0, -3e8)]);
        assert_eq!(gamma_flip(&strikes, 98.0), 100.0);
    }

    proptest! {
        #[test]
        fn prop_flip_within_strike_range(
            cumulative in proptest::collection::vec(-1e10f64..1e10, 1..40),
            spot in 1.0f64..1000.0,
        ) {
            let points: Vec<(f64, f64)> = cumulative
                .iter()
                .enumerate()
                .map(|(i, c)| (50.0 + i as f64 * 2.5, *c))
                .collect();
            let strikes = rows(&points);
            let flip = gamma_flip(&strikes, spot);
            let min = strikes[0].strike;
            let max = strikes[strikes.len() - 1].strike;
            prop_assert!(flip >= min && flip <= max, "flip {} outside [{}, {}]", flip, min, max);
        }
    }
}
