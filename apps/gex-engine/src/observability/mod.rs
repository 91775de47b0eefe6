//! Observability module for metrics.
//!
//! Tracing and log setup lives in [`crate::telemetry`]; this module exports
//! scan metrics to Prometheus.

mod metrics;

pub use metrics::{
    MetricsConfig, MetricsError, init_metrics, record_scan_completed, record_signals,
    record_symbol_scanned,
};
