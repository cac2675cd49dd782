//! No-op observability stubs
//!
//! Used when the datadog feature is disabled. Spans still go through the
//! `tracing` subscriber installed here; nothing is exported.

use crate::recorder::MetricsRecorder;

/// No-op metrics client - compiles to nothing
#[derive(Clone, Copy, Default)]
pub struct Metrics;

impl Metrics {
    #[inline(always)]
    pub fn new(_config: &DatadogConfig) -> Self {
        Metrics
    }
}

impl MetricsRecorder for Metrics {
    #[inline(always)]
    fn incr(&self, _name: &str, _tags: &[&str]) {}

    #[inline(always)]
    fn timing(&self, _name: &str, _duration_ms: f64, _tags: &[&str]) {}
}

/// No-op configuration
#[derive(Clone, Default)]
pub struct DatadogConfig;

impl DatadogConfig {
    #[inline(always)]
    pub fn from_env() -> Self {
        DatadogConfig
    }
}

/// Basic fmt subscriber with `RUST_LOG` filtering
pub fn init_tracing(_config: &DatadogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
}

/// No-op shutdown
#[inline(always)]
pub fn shutdown() {}
