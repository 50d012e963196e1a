//! Tracing pipeline initialisation.
//!
//! Call [`init_tracing`] once at process startup.
//!
//! # Environment variables
//!
//! | Variable | Effect |
//! |---|---|
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | OTLP collector base URL (e.g. `http://localhost:4318`). When set, spans are exported over OTLP/HTTP. |
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `DECKWATCH_LOG_FORMAT` | `json` or `compact`; overrides the configured format. |
//!
//! # Example
//!
//! ```rust,no_run
//! use deckwatch_runtime::telemetry::{init_tracing, LogFormat};
//!
//! let _guard = init_tracing("deckwatch", LogFormat::Compact);
//! ```

use deckwatch_types::AdvisorError;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Console log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    /// Parse `compact` or `json`, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Some(LogFormat::Compact),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }

    /// `DECKWATCH_LOG_FORMAT` if set and valid, otherwise `configured`.
    pub fn from_env_or(configured: LogFormat) -> Self {
        std::env::var("DECKWATCH_LOG_FORMAT")
            .ok()
            .and_then(|v| Self::parse(&v))
            .unwrap_or(configured)
    }
}

/// Install the global `tracing` subscriber.
///
/// With `OTEL_EXPORTER_OTLP_ENDPOINT` set, a `tracing-opentelemetry` layer
/// forwards every span (including the per-tick `#[instrument]` span) to the
/// collector.  Otherwise only the console formatter is installed.
///
/// Hold the returned [`TelemetryGuard`] for the lifetime of the process;
/// dropping it flushes pending spans.
pub fn init_tracing(service_name: &str, format: LogFormat) -> TelemetryGuard {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let format = LogFormat::from_env_or(format);

    let provider = otlp_endpoint(std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok()).and_then(
        |endpoint| match span_exporter(service_name, &endpoint) {
            Ok(provider) => Some(provider),
            Err(e) => {
                eprintln!("[deckwatch] {e}; spans stay local");
                None
            }
        },
    );
    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer(service_name.to_string())));

    let registry = tracing_subscriber::registry().with(env_filter).with(otel_layer);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init(),
    }

    TelemetryGuard { provider }
}

/// Keeps the OTLP span exporter alive; shuts it down on drop.
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    /// Whether spans leave the process.
    pub fn exports_spans(&self) -> bool {
        self.provider.is_some()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("[deckwatch] span exporter shutdown failed: {e}");
        }
    }
}

/// Trimmed collector URL, or `None` when unset or blank.
fn otlp_endpoint(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
}

/// OTLP/HTTP span pipeline tagged with `service_name`.
///
/// Spans are exported synchronously as each one closes; the tick loop has no
/// async runtime to drive a batch exporter.
fn span_exporter(service_name: &str, endpoint: &str) -> Result<SdkTracerProvider, AdvisorError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| AdvisorError::Config(format!("OTLP exporter for {endpoint}: {e}")))?;

    Ok(SdkTracerProvider::builder()
        .with_resource(
            Resource::builder()
                .with_service_name(service_name.to_string())
                .build(),
        )
        .with_simple_exporter(exporter)
        .build())
}
