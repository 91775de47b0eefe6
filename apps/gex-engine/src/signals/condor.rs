//! Iron-condor family.

use super::generator::Sizing;
use crate::config::IronCondorConfig;
use crate::models::{GexProfile, Signal, SignalType, TradeDirection};

/// Iron condor between the nearest call wall above spot and the nearest put
/// wall below it, when net GEX is large enough and the walls are wide apart.
pub(super) fn signals(
    profile: &GexProfile,
    symbol: &str,
    cfg: &IronCondorConfig,
    sizing: &Sizing<'_>,
) -> Vec<Signal> {
    let net_gex = profile.net_gex();
    if net_gex <= cfg.min_gex || profile.call_walls().is_empty() || profile.put_walls().is_empty()
    {
        return Vec::new();
    }

    let spot = profile.current_price();
    let call_wall = profile
        .call_walls()
        .iter()
        .map(|w| w.strike)
        .filter(|&k| k > spot)
        .reduce(f64::min);
    let put_wall = profile
        .put_walls()
        .iter()
        .map(|w| w.strike)
        .filter(|&k| k < spot)
        .reduce(f64::max);
    let (Some(call_wall), Some(put_wall)) = (call_wall, put_wall) else {
        return Vec::new();
    };

    let spread = (call_wall - put_wall) / spot * 100.0;
    if spread <= cfg.min_wall_spread {
        return Vec::new();
    }

    let bias = if profile.total_put_gex().abs() > profile.total_call_gex() {
        "wider put spread"
    } else {
        "wider call spread"
    };

    vec![
        Signal::new(
            symbol,
            SignalType::IronCondor,
            TradeDirection::IronCondor,
            cfg.confidence
                .score(profile.dealer_pain(), spread - cfg.min_wall_spread),
        )
        .with_levels(
            format!("Sell ${put_wall:.2} put / ${call_wall:.2} call iron condor, {bias}"),
            format!("Keep {:.0}% of credit", sizing.short_target_pct()),
            format!("Close on a break of ${put_wall:.2} or ${call_wall:.2}"),
        )
        .with_expected_move(spread / 2.0)
        .with_horizon(cfg.dte_range.to_string())
        .with_win_rate(cfg.win_rate)
        .with_position_size(sizing.position(sizing.risk.max_position_size_condor))
        .with_reasoning(format!(
            "Net GEX {:.2}B pins price between walls {spread:.2}% apart",
            net_gex / 1e9
        )),
    ]
}
