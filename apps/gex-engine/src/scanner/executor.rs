//! Concurrent symbol scanner.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use tracing::{Instrument, Level, debug, info, span, warn};
use uuid::Uuid;

use super::error::ScanFailure;
use super::progress::{Progress, ProgressTracker};
use super::rank_results;
use crate::calendar::Clock;
use crate::config::Config;
use crate::engine::GexEngine;
use crate::infrastructure::ChainProvider;
use crate::models::{MarketContext, ScanResult};
use crate::observability;

/// Progress callback invoked once per finished symbol.
pub type ProgressCallback<'a> = dyn Fn(&Progress) + Send + Sync + 'a;

/// Fans the analysis pipeline out across a symbol universe.
///
/// At most `max_workers` symbol tasks are in flight. Each task owns its fetch
/// and analysis; results flow back to the single coordinating loop in
/// [`scan`](Self::scan), which is the only writer of the result buffer and
/// the progress tracker.
pub struct ConcurrentScanner {
    engine: Arc<GexEngine>,
    provider: Arc<dyn ChainProvider>,
    clock: Arc<dyn Clock>,
    max_workers: usize,
    task_timeout: Duration,
    default_volatility_index: f64,
}

impl ConcurrentScanner {
    /// Create a scanner with 25 workers, a 10s task ceiling and a default
    /// volatility index of 15.
    #[must_use]
    pub fn new(
        engine: Arc<GexEngine>,
        provider: Arc<dyn ChainProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            engine,
            provider,
            clock,
            max_workers: 25,
            task_timeout: Duration::from_secs(10),
            default_volatility_index: 15.0,
        }
    }

    /// Create a scanner from application configuration.
    #[must_use]
    pub fn from_config(
        config: &Config,
        provider: Arc<dyn ChainProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(Arc::new(GexEngine::from_config(config)), provider, clock)
            .with_max_workers(config.scanner.max_workers)
            .with_task_timeout(config.scanner.task_timeout())
            .with_default_volatility_index(config.pricing.default_volatility_index)
    }

    /// Set the worker pool size (at least 1).
    #[must_use]
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Set the per-symbol time ceiling.
    #[must_use]
    pub const fn with_task_timeout(mut self, task_timeout: Duration) -> Self {
        self.task_timeout = task_timeout;
        self
    }

    /// Volatility index used when the provider cannot supply one.
    #[must_use]
    pub const fn with_default_volatility_index(mut self, value: f64) -> Self {
        self.default_volatility_index = value;
        self
    }

    /// Worker pool size.
    #[must_use]
    pub const fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Scan `symbols` and return one result per symbol, ranked.
    ///
    /// Never fails: a symbol whose fetch errors, times out, or yields no
    /// usable chain is kept as a zero-score WAIT placeholder. Ranking happens
    /// once, after every task has finished.
    pub async fn scan(
        &self,
        symbols: &[String],
        min_confidence: f64,
        on_progress: Option<&ProgressCallback<'_>>,
    ) -> Vec<ScanResult> {
        let scan_id = Uuid::new_v4();
        let span = span!(Level::INFO, "scan", scan_id = %scan_id, symbols = symbols.len());

        self.run(symbols, min_confidence, on_progress)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        symbols: &[String],
        min_confidence: f64,
        on_progress: Option<&ProgressCallback<'_>>,
    ) -> Vec<ScanResult> {
        if symbols.is_empty() {
            return Vec::new();
        }

        let start_time = Instant::now();
        let mut tracker = ProgressTracker::new(symbols.len() as u64);
        let context = MarketContext::new(self.volatility_index().await, self.clock.now());

        info!(
            "Starting scan: {} symbols, {} workers, vix {:.2}",
            symbols.len(),
            self.max_workers,
            context.volatility_index
        );

        let mut completions = stream::iter(symbols.iter().cloned().enumerate())
            .map(|(index, symbol)| self.spawn_symbol(index, symbol, context, min_confidence))
            .buffer_unordered(self.max_workers);

        let mut finished: Vec<(usize, ScanResult)> = Vec::with_capacity(symbols.len());
        while let Some((index, result, latency)) = completions.next().await {
            tracker.record(&result);

            let outcome = result.failure.as_ref().map_or("ok", ScanFailure::label);
            observability::record_symbol_scanned(outcome, latency.as_secs_f64());
            observability::record_signals(&result.signals);

            let progress = tracker.progress();
            debug!(
                symbol = %result.symbol,
                outcome,
                "Progress: {:.1}% ({}/{}) - ETA: {:.1}s",
                progress.percentage(),
                progress.completed(),
                progress.total,
                progress.eta().unwrap_or_default().as_secs_f64()
            );
            if let Some(callback) = on_progress {
                callback(&progress);
            }

            finished.push((index, result));
        }

        // Input order first so equal keys rank by position in `symbols`
        finished.sort_by_key(|(index, _)| *index);
        let mut results: Vec<ScanResult> = finished.into_iter().map(|(_, r)| r).collect();
        rank_results(&mut results);

        let elapsed = start_time.elapsed();
        let final_progress = tracker.progress();
        observability::record_scan_completed(
            symbols.len(),
            final_progress.failed(),
            elapsed.as_secs_f64(),
        );

        info!(
            timeouts = final_progress.failures.timeout,
            fetch_errors = final_progress.failures.fetch,
            leader = final_progress.leader.as_ref().map_or("-", |l| l.symbol.as_str()),
            "Scan complete: {}/{} succeeded in {:.2}s",
            final_progress.succeeded,
            final_progress.total,
            elapsed.as_secs_f64()
        );

        results
    }

    /// Fetched once per scan under the same ceiling as a symbol task.
    async fn volatility_index(&self) -> f64 {
        let fetch = self.provider.volatility_index();
        match tokio::time::timeout(self.task_timeout, fetch).await {
            Ok(Ok(value)) if value.is_finite() && value >= 0.0 => value,
            Ok(Ok(value)) => {
                warn!(value, "Invalid volatility index, using default");
                self.default_volatility_index
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Volatility index unavailable, using default");
                self.default_volatility_index
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.task_timeout.as_secs(),
                    "Volatility index timed out, using default"
                );
                self.default_volatility_index
            }
        }
    }

    fn spawn_symbol(
        &self,
        index: usize,
        symbol: String,
        context: MarketContext,
        min_confidence: f64,
    ) -> impl Future<Output = (usize, ScanResult, Duration)> + Send {
        let engine = Arc::clone(&self.engine);
        let provider = Arc::clone(&self.provider);
        let task_timeout = self.task_timeout;
        let span = span!(Level::DEBUG, "scan_symbol", symbol = %symbol);

        let handle = tokio::spawn(
            scan_symbol(
                engine,
                provider,
                symbol.clone(),
                context,
                min_confidence,
                task_timeout,
            )
            .instrument(span),
        );

        async move {
            let start = Instant::now();
            let result = handle.await.unwrap_or_else(|e| {
                warn!(symbol = %symbol, error = %e, "Symbol task aborted");
                ScanResult::failed(
                    symbol,
                    ScanFailure::TaskAborted {
                        message: e.to_string(),
                    },
                )
            });
            (index, result, start.elapsed())
        }
    }
}

async fn scan_symbol(
    engine: Arc<GexEngine>,
    provider: Arc<dyn ChainProvider>,
    symbol: String,
    context: MarketContext,
    min_confidence: f64,
    task_timeout: Duration,
) -> ScanResult {
    let work = async {
        let chain = provider.fetch_chain(&symbol).await?;
        Ok::<_, ScanFailure>(engine.evaluate(&symbol, Some(&chain), &context, min_confidence))
    };

    match tokio::time::timeout(task_timeout, work).await {
        Ok(Ok(result)) => result,
        Ok(Err(failure)) => {
            warn!(symbol = %symbol, error = %failure, "Symbol scan failed");
            ScanResult::failed(symbol, failure)
        }
        Err(_) => {
            warn!(symbol = %symbol, timeout_secs = task_timeout.as_secs(), "Symbol scan timed out");
            ScanResult::failed(
                symbol,
                ScanFailure::Timeout {
                    secs: task_timeout.as_secs(),
                },
            )
        }
    }
}
