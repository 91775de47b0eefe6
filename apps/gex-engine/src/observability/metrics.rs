//! Prometheus metrics for the scanner.
//!
//! Recording functions are safe to call without an installed exporter; the
//! `metrics` facade drops samples until one is installed.
//!
//! # Example
//!
//! ```ignore
//! use gex_engine::observability::{init_metrics, MetricsConfig};
//!
//! init_metrics(&MetricsConfig::default())?;
//! record_symbol_scanned("ok", 0.042);
//! ```

use std::net::SocketAddr;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::config::ObservabilityConfig;
use crate::models::Signal;

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for durations (in seconds).
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 9090)),
            // 1ms to 30s; the per-symbol ceiling defaults to 10s
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
            ],
        }
    }
}

impl MetricsConfig {
    /// Create a new metrics configuration with custom address.
    #[must_use]
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            listen_addr: addr,
            ..Default::default()
        }
    }

    /// Build from the observability section of the application config.
    pub fn from_config(config: &ObservabilityConfig) -> Result<Self, MetricsError> {
        let addr = config
            .metrics_addr
            .parse::<SocketAddr>()
            .map_err(|e| MetricsError::Configuration(format!("{}: {e}", config.metrics_addr)))?;
        Ok(Self::with_addr(addr))
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the metrics exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.duration_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Scan Metrics
// ============================================================================

/// Record one finished symbol task.
///
/// # Arguments
///
/// * `outcome` - `"ok"` or a failure label (e.g. `"timeout"`, `"fetch_error"`)
/// * `latency_seconds` - Time from task start to completion
pub fn record_symbol_scanned(outcome: &str, latency_seconds: f64) {
    counter!("gex_symbols_scanned_total", "outcome" => outcome.to_string()).increment(1);
    histogram!("gex_symbol_latency_seconds").record(latency_seconds);
}

/// Record the signals emitted for one symbol, by family.
pub fn record_signals(signals: &[Signal]) {
    for signal in signals {
        counter!(
            "gex_signals_total",
            "type" => signal.signal_type.to_string()
        )
        .increment(1);
    }
}

/// Record a finished scan.
///
/// # Arguments
///
/// * `symbols` - Symbols in the scan
/// * `failed` - Symbols that failed
/// * `duration_seconds` - Wall time of the whole scan
pub fn record_scan_completed(symbols: usize, failed: u64, duration_seconds: f64) {
    counter!("gex_scans_total").increment(1);
    histogram!("gex_scan_duration_seconds").record(duration_seconds);
    gauge!("gex_scan_symbols").set(symbols as f64);
    gauge!("gex_scan_failed_symbols").set(failed as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_observability_section() {
        let config = MetricsConfig::from_config(&ObservabilityConfig {
            metrics_enabled: true,
            metrics_addr: "127.0.0.1:9100".to_string(),
        })
        .unwrap();
        assert_eq!(config.listen_addr.port(), 9100);

        let err = MetricsConfig::from_config(&ObservabilityConfig {
            metrics_enabled: true,
            metrics_addr: "not an address".to_string(),
        });
        assert!(matches!(err, Err(MetricsError::Configuration(_))));
    }

    #[test]
    fn test_recording_without_exporter_is_noop() {
        record_symbol_scanned("ok", 0.01);
        record_signals(&[Signal::wait("SPY", "test")]);
        record_scan_completed(8, 1, 0.5);
    }
}
