//! End-to-end analysis scenarios through the public API.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use gex_engine::calendar::Clock;
use gex_engine::stress::{MmStatus, StressMetrics};
use gex_engine::{
    ChainSnapshot, ExpirationChain, FixedClock, GexEngine, GexExposure, GexProfile,
    GexProfileBuilder, MarketContext, OptionContract, SignalGenerator, SignalType,
    StrikeAggregate, TradeDirection,
};
use proptest::prelude::*;

fn market_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 4, 8)
        .and_then(|d| d.and_hms_opt(11, 15, 0))
        .unwrap()
}

fn neutral_stress(dealer_pain: f64) -> StressMetrics {
    StressMetrics {
        dealer_pain,
        pin_risk: 0.0,
        institutional_flow: false,
        toxicity_score: 0.0,
        mm_status: MmStatus::Neutral,
    }
}

#[test]
fn test_scenario_flip_interpolation() {
    let exposure = GexExposure::from_strikes(
        "SPY",
        100.0,
        vec![
            StrikeAggregate::new(105.0, 2e8, 0.0),
            StrikeAggregate::new(95.0, 0.0, -2e8),
            StrikeAggregate::new(100.0, 4e8, -1e8),
        ],
    );

    let cumulative: Vec<f64> = exposure.strikes().iter().map(|r| r.cumulative_gex).collect();
    assert_eq!(cumulative, vec![-2e8, 1e8, 3e8]);

    let expected = 95.0 + (2e8 / 3e8) * 5.0;
    assert!((exposure.gamma_flip() - expected).abs() < 1e-9);
    assert!(exposure.gamma_flip() > 97.5 && exposure.gamma_flip() < 100.0);
}

#[test]
fn test_scenario_spy_short_gamma_squeeze() {
    let exposure = GexExposure::from_strikes(
        "SPY",
        500.0,
        vec![
            StrikeAggregate::new(495.0, 2e8, -1.2e9),
            StrikeAggregate::new(505.0, 1e8, -6e8),
        ],
    );
    assert!((exposure.net_gex() + 1.5e9).abs() < 1.0);

    let profile = GexProfile::new(exposure, neutral_stress(15.0), 17.0, DateTime::<Utc>::UNIX_EPOCH);
    let signals = SignalGenerator::default().generate(Some(&profile), "SPY");

    let squeeze = signals
        .iter()
        .find(|s| s.signal_type == SignalType::SqueezePlay && s.direction == TradeDirection::LongCalls)
        .expect("long calls squeeze signal");
    assert!(squeeze.confidence >= 65.0);
    assert!(squeeze.confidence <= 100.0);
}

#[test]
fn test_scenario_empty_chain() {
    let context = MarketContext::new(15.0, market_time());
    let snapshot = ChainSnapshot::new("QQQ", 430.0);

    let profile = GexProfileBuilder::default().build(&snapshot, &context);
    assert!(profile.is_none());

    let signals = SignalGenerator::default().generate(profile.as_ref(), "QQQ");
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].signal_type, SignalType::Wait);
    assert_eq!(signals[0].confidence, 0.0);
}

fn realistic_chain() -> ChainSnapshot {
    let fetched_at = DateTime::parse_from_rfc3339("2026-04-08T15:14:00Z")
        .unwrap()
        .with_timezone(&Utc);
    let near = ExpirationChain {
        calls: vec![
            OptionContract::new(505.0, 42_000, Some(0.16), 18_000),
            OptionContract::new(510.0, 65_000, Some(0.15), 9_000),
            OptionContract::new(520.0, 30_000, None, 2_000),
        ],
        puts: vec![
            OptionContract::new(495.0, 51_000, Some(0.19), 22_000),
            OptionContract::new(490.0, 47_000, Some(0.21), 8_000),
            OptionContract::new(480.0, 25_000, Some(f64::NAN), 1_000),
        ],
        days_to_expiry: 2,
        fetched_at,
    };
    let weekly = ExpirationChain {
        calls: vec![OptionContract::new(510.0, 80_000, Some(0.17), 6_000)],
        puts: vec![OptionContract::new(490.0, 90_000, Some(0.22), 7_500)],
        days_to_expiry: 9,
        fetched_at,
    };

    ChainSnapshot::new("SPY", 501.3)
        .with_expiration(NaiveDate::from_ymd_opt(2026, 4, 10).unwrap(), near)
        .with_expiration(NaiveDate::from_ymd_opt(2026, 4, 17).unwrap(), weekly)
}

#[test]
fn test_analyze_is_idempotent_under_fixed_clock() {
    let engine = GexEngine::default();
    let clock = FixedClock(market_time());
    let snapshot = realistic_chain();

    let first = engine.analyze("SPY", Some(&snapshot), &MarketContext::new(16.2, clock.now()));
    let second = engine.analyze("SPY", Some(&snapshot), &MarketContext::new(16.2, clock.now()));

    assert!(first.profile.is_some());
    assert_eq!(first, second);

    let profile = first.profile.unwrap();
    assert_eq!(profile.as_of().to_rfc3339(), "2026-04-08T15:14:00+00:00");
    let strikes: Vec<f64> = profile.strikes().iter().map(|r| r.strike).collect();
    assert_eq!(strikes, vec![480.0, 490.0, 495.0, 505.0, 510.0, 520.0]);
    assert!(profile.call_walls().len() <= 5);
    assert!(profile.put_walls().len() <= 5);
}

#[test]
fn test_evaluate_keeps_best_signal_first() {
    let engine = GexEngine::default();
    let context = MarketContext::new(16.2, market_time());

    let result = engine.evaluate("SPY", Some(&realistic_chain()), &context, 65.0);
    assert!(!result.is_failed());
    for pair in result.signals.windows(2) {
        assert!(pair[0].confidence >= pair[1].confidence);
    }
    assert_eq!(result.best_signal(), result.signals.first());
}

fn arb_contract(spot: f64) -> impl Strategy<Value = OptionContract> {
    (
        0.8f64..1.2,
        0u64..100_000,
        prop::option::of(-0.5f64..2.0),
        0u64..50_000,
    )
        .prop_map(move |(moneyness, oi, iv, volume)| {
            OptionContract::new((spot * moneyness).round(), oi, iv, volume)
        })
}

fn arb_snapshot() -> impl Strategy<Value = ChainSnapshot> {
    (50.0f64..600.0).prop_flat_map(|spot| {
        (
            prop::collection::vec(arb_contract(spot), 0..12),
            prop::collection::vec(arb_contract(spot), 0..12),
            1i64..=14,
        )
            .prop_map(move |(calls, puts, dte)| {
                ChainSnapshot::new("PROP", spot).with_expiration(
                    NaiveDate::from_ymd_opt(2026, 4, 17).unwrap(),
                    ExpirationChain {
                        calls,
                        puts,
                        days_to_expiry: dte,
                        fetched_at: DateTime::<Utc>::UNIX_EPOCH,
                    },
                )
            })
    })
}

proptest! {
    #[test]
    fn prop_pipeline_outputs_stay_in_bounds(snapshot in arb_snapshot(), vix in 9.0f64..60.0) {
        let engine = GexEngine::default();
        let context = MarketContext::new(vix, market_time());
        let result = engine.evaluate("PROP", Some(&snapshot), &context, 65.0);

        prop_assert!(!result.signals.is_empty());
        prop_assert!((0.0..=100.0).contains(&result.opportunity_score));
        for signal in &result.signals {
            prop_assert!((0.0..=100.0).contains(&signal.confidence));
        }

        if let Some(profile) = &result.profile {
            prop_assert!((0.0..=100.0).contains(&profile.dealer_pain()));
            prop_assert!(profile.toxicity_score().abs() <= 100.0);

            if let (Some(first), Some(last)) = (profile.strikes().first(), profile.strikes().last()) {
                prop_assert!(profile.gamma_flip() >= first.strike);
                prop_assert!(profile.gamma_flip() <= last.strike);
                let gross = profile.total_call_gex().abs() + profile.total_put_gex().abs();
                let tolerance = 1e-9 * gross.max(1.0);
                prop_assert!((last.cumulative_gex - profile.net_gex()).abs() <= tolerance);
            }
        }
    }
}
