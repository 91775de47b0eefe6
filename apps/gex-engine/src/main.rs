//! GEX Engine Binary
//!
//! Scans the configured symbol universe against a directory of captured
//! chain snapshots and logs the ranked results.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin gex-engine
//! ```
//!
//! # Environment Variables
//!
//! - `GEX_CONFIG`: Config file path (default: config.yaml; built-in defaults if absent)
//! - `GEX_SNAPSHOT_DIR`: Overrides `scanner.snapshot_dir`
//! - `OTEL_ENABLED`: Set to `false` for console-only logging
//! - `RUST_LOG`: Log level (default: info)

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use gex_engine::config::{Config, load_config};
use gex_engine::observability::{MetricsConfig, init_metrics};
use gex_engine::scanner::{ConcurrentScanner, Progress, ScanStatistics};
use gex_engine::telemetry::init_telemetry;
use gex_engine::{SnapshotDirectory, SystemClock};

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    let _telemetry = init_telemetry();

    tracing::info!("Starting GEX engine");

    let config = load_app_config()?;

    if config.observability.metrics_enabled {
        let metrics_config = MetricsConfig::from_config(&config.observability)?;
        init_metrics(&metrics_config)?;
    }

    let snapshot_dir = std::env::var("GEX_SNAPSHOT_DIR")
        .unwrap_or_else(|_| config.scanner.snapshot_dir.clone());
    let provider = Arc::new(SnapshotDirectory::new(
        &snapshot_dir,
        config.scanner.max_days_to_expiry,
    ));

    tracing::info!(
        snapshot_dir = %snapshot_dir,
        symbols = config.scanner.symbols.len(),
        workers = config.scanner.max_workers,
        min_confidence = config.scanner.min_confidence,
        "Scanner configured"
    );

    let scanner = ConcurrentScanner::from_config(&config, provider, Arc::new(SystemClock));
    let report = |progress: &Progress| {
        tracing::info!(
            completed = progress.completed(),
            total = progress.total,
            failed = progress.failed(),
            "Scan progress {:.0}%",
            progress.percentage()
        );
    };

    let results = scanner
        .scan(
            &config.scanner.symbols,
            config.scanner.min_confidence,
            Some(&report),
        )
        .await;

    for (rank, result) in results.iter().enumerate() {
        match (&result.failure, result.best_signal()) {
            (Some(failure), _) => {
                tracing::warn!(
                    rank = rank + 1,
                    symbol = %result.symbol,
                    reason = %failure,
                    "No analysis"
                );
            }
            (None, Some(signal)) => {
                tracing::info!(
                    rank = rank + 1,
                    symbol = %result.symbol,
                    score = result.opportunity_score,
                    dealer_pain = result.dealer_pain(),
                    mm_vulnerability = result.mm_vulnerability,
                    signal = %signal.signal_type,
                    direction = %signal.direction,
                    confidence = signal.confidence,
                    "{}",
                    signal.reasoning
                );
            }
            (None, None) => {}
        }
    }

    let stats = ScanStatistics::from_results(&results);
    tracing::info!(
        total = stats.total_scanned,
        failed = stats.failed,
        opportunities = stats.opportunities,
        trapped = stats.trapped_mms,
        scrambling = stats.scrambling_mms,
        avg_vulnerability = stats.avg_vulnerability,
        critical_alerts = stats.critical_alerts,
        high_confidence = stats.high_confidence,
        "Scan statistics"
    );

    Ok(())
}

/// Load the config file, falling back to defaults when the default path is absent.
fn load_app_config() -> anyhow::Result<Config> {
    match std::env::var("GEX_CONFIG") {
        Ok(path) => load_config(Some(&path)).with_context(|| format!("loading {path}")),
        Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            load_config(Some(DEFAULT_CONFIG_PATH)).context("loading config.yaml")
        }
        Err(_) => {
            tracing::warn!("No config.yaml found, using built-in defaults");
            Ok(Config::default())
        }
    }
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
