//! Integration tests for the concurrent scanner.
//!
//! Chains are served from an in-memory provider with injected failures and
//! latency; the clock is fixed so every time-windowed heuristic is stable.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use gex_engine::scanner::{ConcurrentScanner, Progress, ScanFailure};
use gex_engine::{
    ChainProvider, ChainProviderError, ChainSnapshot, ExpirationChain, FixedClock, GexEngine,
    InMemoryChainProvider, OptionContract, SignalType,
};

// Wednesday, outside OPEX week and the institutional windows
fn quiet_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 4, 8)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap()
}

fn chain(symbol: &str, spot: f64, put_oi: u64) -> ChainSnapshot {
    let expiration = ExpirationChain {
        calls: vec![
            OptionContract::new(spot * 1.01, 80_000, Some(0.22), 1_500),
            OptionContract::new(spot * 1.03, 35_000, Some(0.20), 900),
        ],
        puts: vec![
            OptionContract::new(spot * 0.99, put_oi, Some(0.26), 2_500),
            OptionContract::new(spot * 0.97, 15_000, Some(0.28), 700),
        ],
        days_to_expiry: 2,
        fetched_at: DateTime::<Utc>::UNIX_EPOCH,
    };
    ChainSnapshot::new(symbol, spot)
        .with_expiration(NaiveDate::from_ymd_opt(2026, 4, 10).unwrap(), expiration)
}

fn symbols(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

fn scanner(provider: Arc<dyn ChainProvider>) -> ConcurrentScanner {
    ConcurrentScanner::new(
        Arc::new(GexEngine::default()),
        provider,
        Arc::new(FixedClock(quiet_now())),
    )
}

#[tokio::test]
async fn test_failed_symbols_become_trailing_placeholders() {
    let provider = Arc::new(InMemoryChainProvider::new());
    provider.set_volatility_index(18.0);

    let universe = [
        "SPY", "QQQ", "IWM", "AAPL", "NVDA", "TSLA", "AMD", "META", "MSFT", "GOOGL",
    ];
    for (i, symbol) in universe.iter().enumerate() {
        let spot = 100.0 + 25.0 * i as f64;
        provider.insert(chain(symbol, spot, 30_000 + 4_000 * i as u64));
    }
    provider.fail(
        "TSLA",
        ChainProviderError::DataUnavailable {
            message: "upstream 503".to_string(),
        },
    );
    provider.fail(
        "META",
        ChainProviderError::SymbolNotFound {
            symbol: "META".to_string(),
        },
    );

    let results = scanner(provider)
        .with_max_workers(4)
        .scan(&symbols(&universe), 65.0, None)
        .await;

    assert_eq!(results.len(), 10);

    let failed: Vec<&str> = results
        .iter()
        .filter(|r| r.is_failed())
        .map(|r| r.symbol.as_str())
        .collect();
    assert_eq!(failed, vec!["TSLA", "META"]);

    // Placeholders rank last, in input order
    assert_eq!(results[8].symbol, "TSLA");
    assert_eq!(results[9].symbol, "META");
    for placeholder in &results[8..] {
        assert_eq!(placeholder.opportunity_score, 0.0);
        assert!(placeholder.profile.is_none());
        let wait = placeholder.best_signal().unwrap();
        assert_eq!(wait.signal_type, SignalType::Wait);
        assert_eq!(wait.confidence, 0.0);
        assert!(matches!(placeholder.failure, Some(ScanFailure::Fetch { .. })));
    }

    for result in &results[..8] {
        assert!(result.opportunity_score > 0.0);
        assert!(!result.signals.is_empty());
        assert_eq!(
            result.profile.as_ref().map(|p| p.volatility_index()),
            Some(18.0)
        );
    }

    for pair in results.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            a.opportunity_score > b.opportunity_score
                || (a.opportunity_score == b.opportunity_score
                    && a.dealer_pain() >= b.dealer_pain())
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_symbol_times_out_without_stalling_batch() {
    let provider = Arc::new(InMemoryChainProvider::new());
    provider.insert(chain("SPY", 500.0, 40_000));
    provider.insert(chain("QQQ", 430.0, 40_000));
    provider.delay("QQQ", Duration::from_secs(60));

    let timeouts = AtomicUsize::new(0);
    let on_progress = |progress: &Progress| {
        timeouts.store(progress.failures.timeout as usize, Ordering::SeqCst);
    };

    let results = scanner(provider)
        .with_task_timeout(Duration::from_secs(5))
        .scan(&symbols(&["QQQ", "SPY"]), 65.0, Some(&on_progress))
        .await;

    assert_eq!(timeouts.load(Ordering::SeqCst), 1);

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].symbol, "SPY");
    assert!(!results[0].is_failed());
    assert_eq!(results[1].symbol, "QQQ");
    assert_eq!(results[1].failure, Some(ScanFailure::Timeout { secs: 5 }));
}

#[tokio::test]
async fn test_missing_volatility_index_uses_default() {
    let provider = Arc::new(InMemoryChainProvider::new());
    provider.insert(chain("IWM", 210.0, 30_000));

    let results = scanner(provider)
        .with_default_volatility_index(14.5)
        .scan(&symbols(&["IWM"]), 65.0, None)
        .await;

    let profile = results[0].profile.as_ref().unwrap();
    assert_eq!(profile.volatility_index(), 14.5);
}

#[tokio::test]
async fn test_progress_reported_once_per_symbol() {
    let provider = Arc::new(InMemoryChainProvider::new());
    for symbol in ["SPY", "QQQ", "IWM"] {
        provider.insert(chain(symbol, 300.0, 30_000));
    }

    let calls = AtomicUsize::new(0);
    let last_completed = AtomicUsize::new(0);
    let on_progress = |progress: &Progress| {
        calls.fetch_add(1, Ordering::SeqCst);
        last_completed.store(progress.completed() as usize, Ordering::SeqCst);
        assert_eq!(progress.total, 4);
    };

    let results = scanner(provider)
        .scan(&symbols(&["SPY", "QQQ", "IWM", "NOPE"]), 65.0, Some(&on_progress))
        .await;

    assert_eq!(results.len(), 4);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(last_completed.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_empty_universe() {
    let provider = Arc::new(InMemoryChainProvider::new());
    let results = scanner(provider).scan(&[], 65.0, None).await;
    assert!(results.is_empty());
}

/// Provider that records how many fetches are in flight at once.
struct CountingProvider {
    inner: InMemoryChainProvider,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl ChainProvider for CountingProvider {
    async fn fetch_chain(&self, symbol: &str) -> Result<ChainSnapshot, ChainProviderError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        let result = self.inner.fetch_chain(symbol).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn volatility_index(&self) -> Result<f64, ChainProviderError> {
        Ok(16.0)
    }
}

#[tokio::test(start_paused = true)]
async fn test_worker_pool_bounds_in_flight_fetches() {
    let provider = Arc::new(CountingProvider {
        inner: InMemoryChainProvider::new(),
        in_flight: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    });
    let universe: Vec<String> = (0..12).map(|i| format!("SYM{i}")).collect();
    for symbol in &universe {
        provider.inner.insert(chain(symbol, 150.0, 25_000));
    }

    let results = scanner(Arc::clone(&provider) as Arc<dyn ChainProvider>)
        .with_max_workers(3)
        .scan(&universe, 65.0, None)
        .await;

    assert_eq!(results.len(), 12);
    assert!(results.iter().all(|r| !r.is_failed()));
    let peak = provider.peak.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak in-flight fetches was {peak}");
    assert!(peak >= 2);
}

struct HungVolatilityIndex {
    inner: InMemoryChainProvider,
}

#[async_trait]
impl ChainProvider for HungVolatilityIndex {
    async fn fetch_chain(&self, symbol: &str) -> Result<ChainSnapshot, ChainProviderError> {
        self.inner.fetch_chain(symbol).await
    }

    async fn volatility_index(&self) -> Result<f64, ChainProviderError> {
        std::future::pending().await
    }
}

#[tokio::test(start_paused = true)]
async fn test_unresponsive_volatility_index_falls_back_to_default() {
    let provider = Arc::new(HungVolatilityIndex {
        inner: InMemoryChainProvider::new(),
    });
    provider.inner.insert(chain("SPY", 500.0, 30_000));

    let scanner = scanner(provider)
        .with_task_timeout(Duration::from_secs(5))
        .with_default_volatility_index(17.0);
    let universe = symbols(&["SPY"]);
    let scan = scanner.scan(&universe, 65.0, None);
    let results = tokio::time::timeout(Duration::from_secs(3600), scan)
        .await
        .expect("scan finishes without a volatility index");

    assert_eq!(results.len(), 1);
    let profile = results[0].profile.as_ref().unwrap();
    assert_eq!(profile.volatility_index(), 17.0);
}
