//! Premium-selling family.

use super::generator::Sizing;
use crate::config::PremiumSellingConfig;
use crate::models::{GexProfile, Signal, SignalType, TradeDirection};

/// Short calls against the strongest call wall and short puts against the
/// strongest put wall, when net GEX is large and the wall sits inside its
/// distance band.
pub(super) fn signals(
    profile: &GexProfile,
    symbol: &str,
    cfg: &PremiumSellingConfig,
    sizing: &Sizing<'_>,
) -> Vec<Signal> {
    let net_gex = profile.net_gex();
    if net_gex <= cfg.positive_gex {
        return Vec::new();
    }

    let mut out = Vec::new();
    let spot = profile.current_price();
    let position = sizing.position(sizing.risk.max_position_size_premium);

    if let Some(wall) = profile.call_walls().first() {
        let distance = (wall.strike - spot) / spot * 100.0;
        if cfg.call_wall_band.contains(distance) {
            out.push(
                Signal::new(
                    symbol,
                    SignalType::PremiumSelling,
                    TradeDirection::SellCalls,
                    cfg.confidence.score(wall.gex, cfg.wall_strength),
                )
                .with_levels(
                    format!("Sell ${:.2} calls at the call wall", wall.strike),
                    format!("Keep {:.0}% of premium", sizing.short_target_pct()),
                    format!(
                        "Close above ${:.2} or at -{:.0}% premium",
                        wall.strike,
                        sizing.stop_pct()
                    ),
                )
                .with_expected_move(distance)
                .with_horizon(cfg.call_dte_range.to_string())
                .with_win_rate(cfg.call_win_rate)
                .with_position_size(position)
                .with_reasoning(format!(
                    "Net GEX {:.2}B with a {:.2}B call wall {distance:.2}% above spot; dealers sell into rallies",
                    net_gex / 1e9,
                    wall.gex / 1e9
                )),
            );
        }
    }

    if let Some(wall) = profile.put_walls().first() {
        let distance = (spot - wall.strike) / spot * 100.0;
        if cfg.put_wall_band.contains(distance) {
            out.push(
                Signal::new(
                    symbol,
                    SignalType::PremiumSelling,
                    TradeDirection::SellPuts,
                    cfg.confidence.score(wall.gex, cfg.wall_strength),
                )
                .with_levels(
                    format!("Sell ${:.2} puts at the put wall", wall.strike),
                    format!("Keep {:.0}% of premium", sizing.short_target_pct()),
                    format!(
                        "Close below ${:.2} or at -{:.0}% premium",
                        wall.strike,
                        sizing.stop_pct()
                    ),
                )
                .with_expected_move(distance)
                .with_horizon(cfg.put_dte_range.to_string())
                .with_win_rate(cfg.put_win_rate)
                .with_position_size(position)
                .with_reasoning(format!(
                    "Net GEX {:.2}B with a {:.2}B put wall {distance:.2}% below spot; dealers buy dips into support",
                    net_gex / 1e9,
                    wall.gex / 1e9
                )),
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::config::RiskManagementConfig;
    use crate::models::StrikeAggregate;
    use crate::signals::fixtures::{positive_gamma_range, profile};

    fn run(p: &GexProfile) -> Vec<Signal> {
        let risk = RiskManagementConfig::default();
        signals(p, "T", &PremiumSellingConfig::default(), &Sizing::new(dec!(100000), &risk))
    }

    #[test]
    fn test_sells_both_walls_in_band() {
        let out = run(&positive_gamma_range("T"));

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].direction, TradeDirection::SellCalls);
        assert!(out[0].entry.contains("103.00"));
        assert_eq!(out[0].expected_move, 3.0);
        assert_eq!(out[0].time_horizon, "0-2 DTE");
        assert_eq!(out[1].direction, TradeDirection::SellPuts);
        assert!(out[1].entry.contains("96.00"));
        assert_eq!(out[1].position_size, dec!(5000));
    }

    #[test]
    fn test_requires_large_positive_gamma() {
        let p = profile(
            "T",
            100.0,
            vec![
                StrikeAggregate::new(97.0, 0.0, -1e9),
                StrikeAggregate::new(103.0, 3e9, 0.0),
            ],
            0.0,
        );
        // Net is exactly 2e9, below the 3e9 threshold
        assert!(run(&p).is_empty());
    }

    #[test]
    fn test_wall_outside_band_is_ignored() {
        // Strongest call wall at spot (0%), strongest put wall 10% below
        let p = profile(
            "T",
            100.0,
            vec![
                StrikeAggregate::new(90.0, 0.0, -2e9),
                StrikeAggregate::new(100.0, 6e9, 0.0),
            ],
            0.0,
        );
        assert!(run(&p).is_empty());
    }

    #[test]
    fn test_weak_wall_scales_confidence_down() {
        // Call wall sits below spot; the 2.5e8 put wall is half the reference
        // strength: 60 + 10 * 0.5
        let p = profile(
            "T",
            100.0,
            vec![StrikeAggregate::new(98.0, 3.5e9, -2.5e8)],
            0.0,
        );
        let out = run(&p);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].direction, TradeDirection::SellPuts);
        assert_eq!(out[0].confidence, 65.0);
    }
}
