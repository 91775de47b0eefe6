//! Tracing setup for scan runs.
//!
//! Console output always; spans (`scan`, `scan_symbol`, `batch_symbol`) are
//! additionally exported over OTLP gRPC unless `OTEL_ENABLED=false`.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `OTEL_ENABLED` | `true` |
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | `http://localhost:4317` |
//! | `OTEL_SERVICE_NAME` | `gex-engine` |
//! | `GEX_ENV` | unset; `development` gives compact colored output |
//! | `RUST_LOG` | `info` |

use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_ENDPOINT: &str = "http://localhost:4317";
const DEFAULT_SERVICE: &str = "gex-engine";

/// Tracing settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetrySettings {
    /// OTLP endpoint; `None` keeps output on the console.
    pub otlp_endpoint: Option<String>,
    /// `service.name` resource attribute.
    pub service_name: String,
    /// Compact colored console output.
    pub development: bool,
    /// `EnvFilter` directives.
    pub log_filter: String,
}

impl TelemetrySettings {
    /// Read settings from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns a variable's value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = lookup("OTEL_ENABLED").is_none_or(|v| v != "false");
        let otlp_endpoint = enabled.then(|| {
            lookup("OTEL_EXPORTER_OTLP_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
        });

        Self {
            otlp_endpoint,
            service_name: lookup("OTEL_SERVICE_NAME")
                .unwrap_or_else(|| DEFAULT_SERVICE.to_string()),
            development: lookup("GEX_ENV").is_some_and(|v| v == "development"),
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.log_filter).unwrap_or_else(|_| EnvFilter::new("info"))
    }

    fn resource(&self) -> Resource {
        Resource::builder()
            .with_service_name(self.service_name.clone())
            .with_attribute(KeyValue::new("service.version", env!("CARGO_PKG_VERSION")))
            .build()
    }
}

/// Flushes exported spans when the scan process exits.
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    /// Whether spans are being exported.
    #[must_use]
    pub const fn is_exporting(&self) -> bool {
        self.provider.is_some()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        let Some(provider) = self.provider.take() else {
            return;
        };
        if let Err(e) = provider.shutdown() {
            eprintln!("span flush on exit failed: {e}");
        }
    }
}

/// Install the global subscriber from environment settings.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
#[must_use]
pub fn init_telemetry() -> TelemetryGuard {
    init_with(&TelemetrySettings::from_env())
}

/// Install the global subscriber from explicit settings.
///
/// An exporter that cannot be built degrades to console-only output.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
#[must_use]
pub fn init_with(settings: &TelemetrySettings) -> TelemetryGuard {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(!settings.development)
        .with_ansi(settings.development);
    let registry = Registry::default()
        .with(settings.env_filter())
        .with(fmt_layer);

    let Some(endpoint) = settings.otlp_endpoint.as_deref() else {
        registry.init();
        tracing::info!("Span export disabled, console only");
        return TelemetryGuard { provider: None };
    };

    let exporter = match opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
    {
        Ok(exporter) => exporter,
        Err(e) => {
            registry.init();
            tracing::warn!(error = %e, endpoint, "OTLP exporter unavailable, console only");
            return TelemetryGuard { provider: None };
        }
    };

    // Scans are short-lived batch runs; batching would drop spans at exit
    let provider = SdkTracerProvider::builder()
        .with_resource(settings.resource())
        .with_simple_exporter(exporter)
        .build();
    let tracer = provider.tracer(settings.service_name.clone());

    registry
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .init();

    tracing::info!(
        service_name = %settings.service_name,
        endpoint,
        "Exporting scan spans"
    );

    TelemetryGuard {
        provider: Some(provider),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> TelemetrySettings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        TelemetrySettings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_export_to_local_collector() {
        let s = settings(&[]);
        assert_eq!(s.otlp_endpoint.as_deref(), Some(DEFAULT_ENDPOINT));
        assert_eq!(s.service_name, "gex-engine");
        assert!(!s.development);
        assert_eq!(s.log_filter, "info");
    }

    #[test]
    fn test_disabled_export_drops_endpoint() {
        let s = settings(&[
            ("OTEL_ENABLED", "false"),
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "http://collector:4317"),
        ]);
        assert_eq!(s.otlp_endpoint, None);
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "http://collector:4317"),
            ("OTEL_SERVICE_NAME", "gex-nightly"),
            ("GEX_ENV", "development"),
            ("RUST_LOG", "gex_engine=debug"),
        ]);
        assert_eq!(s.otlp_endpoint.as_deref(), Some("http://collector:4317"));
        assert_eq!(s.service_name, "gex-nightly");
        assert!(s.development);
        assert_eq!(s.log_filter, "gex_engine=debug");
    }

    #[test]
    fn test_invalid_filter_falls_back() {
        let s = settings(&[("RUST_LOG", "gex_engine=[")]);
        // Must not panic
        let _ = s.env_filter();
    }
}
