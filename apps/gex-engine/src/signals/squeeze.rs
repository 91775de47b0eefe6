//! Squeeze family.

use super::generator::Sizing;
use crate::config::SqueezeConfig;
use crate::models::{GexProfile, Signal, SignalType, TradeDirection};

/// Long calls when net GEX is below the symbol's negative threshold or dealer
/// pain exceeds the trigger; long puts when net GEX is above the positive
/// threshold and spot sits on the flip.
pub(super) fn signals(
    profile: &GexProfile,
    symbol: &str,
    cfg: &SqueezeConfig,
    sizing: &Sizing<'_>,
) -> Vec<Signal> {
    let mut out = Vec::new();

    let net_gex = profile.net_gex();
    let pain = profile.dealer_pain();
    let spot = profile.current_price();
    let flip = profile.gamma_flip();
    let distance = profile.distance_to_flip().abs();
    let negative = cfg.negative_gex.for_symbol(symbol);
    let positive = cfg.positive_gex.for_symbol(symbol);
    let position = sizing.position(sizing.risk.max_position_size_squeeze);

    if net_gex < negative || pain > cfg.pain_trigger {
        let expected_move = (distance * 2.0).max(2.0);
        let target = profile
            .call_walls()
            .iter()
            .map(|w| w.strike)
            .filter(|&k| k > spot)
            .reduce(f64::min)
            .unwrap_or(spot * (1.0 + expected_move / 100.0));
        let stop = flip.min(spot);

        out.push(
            Signal::new(
                symbol,
                SignalType::SqueezePlay,
                TradeDirection::LongCalls,
                cfg.long_calls_confidence
                    .score(pain, cfg.flip_distance - distance),
            )
            .with_levels(
                format!("Buy calls at or above ${:.2}", spot.max(flip)),
                format!("${target:.2} or +{:.0}% premium", sizing.long_target_pct()),
                format!("Close below ${stop:.2} or -{:.0}% premium", sizing.stop_pct()),
            )
            .with_expected_move(expected_move)
            .with_horizon(cfg.dte_range.to_string())
            .with_win_rate(cfg.long_calls_win_rate)
            .with_position_size(position)
            .with_reasoning(format!(
                "Net GEX {:.2}B vs {:.2}B threshold, dealer pain {pain:.0}, {distance:.2}% from flip at ${flip:.2}; dealer hedging amplifies upside",
                net_gex / 1e9,
                negative / 1e9
            )),
        );
    }

    if net_gex > positive && distance < cfg.put_flip_distance {
        let expected_move = distance.max(1.0);
        let target = profile
            .put_walls()
            .iter()
            .map(|w| w.strike)
            .filter(|&k| k < spot)
            .reduce(f64::max)
            .unwrap_or(spot * (1.0 - expected_move / 100.0));
        let stop = flip.max(spot);

        out.push(
            Signal::new(
                symbol,
                SignalType::SqueezePlay,
                TradeDirection::LongPuts,
                cfg.long_puts_confidence
                    .score(pain, cfg.put_flip_distance - distance),
            )
            .with_levels(
                format!("Buy puts at or below ${:.2}", spot.min(flip)),
                format!("${target:.2} or +{:.0}% premium", sizing.long_target_pct()),
                format!("Close above ${stop:.2} or -{:.0}% premium", sizing.stop_pct()),
            )
            .with_expected_move(expected_move)
            .with_horizon(cfg.dte_range.to_string())
            .with_win_rate(cfg.long_puts_win_rate)
            .with_position_size(position)
            .with_reasoning(format!(
                "Net GEX {:.2}B above {:.2}B with spot {distance:.2}% from flip at ${flip:.2}; a break below the flip flips dealers short gamma",
                net_gex / 1e9,
                positive / 1e9
            )),
        );
    }

    out
}
