//! Datadog configuration from the standard `DD_*` environment variables
//!
//! The service name defaults to `<store>-client`, with the store taken from
//! the hook configuration, so spans land under the client of that store
//! unless `DD_SERVICE` says otherwise.

use std::net::SocketAddr;

use crate::config::HookConfig;

const DEFAULT_STATSD_ADDR: &str = "127.0.0.1:8125";

#[derive(Debug, Clone)]
pub struct DatadogConfig {
    pub service_name: String,
    /// Store the instrumented client talks to (`db.system`)
    pub store: String,
    pub env: String,
    pub version: String,
    pub statsd_addr: SocketAddr,
    pub trace_addr: String,
    pub trace_sample_rate: f64,
    pub metric_prefix: String,
    pub tags: Vec<(String, String)>,
}

impl Default for DatadogConfig {
    fn default() -> Self {
        DatadogConfig::for_store(&HookConfig::default().store)
    }
}

impl DatadogConfig {
    /// Defaults for a client of `store`
    pub fn for_store(store: &str) -> Self {
        DatadogConfig {
            service_name: format!("{}-client", store),
            store: store.to_string(),
            env: "development".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            statsd_addr: SocketAddr::from(([127, 0, 0, 1], 8125)),
            trace_addr: "http://127.0.0.1:8126".to_string(),
            trace_sample_rate: 1.0,
            metric_prefix: "redis_apm".to_string(),
            tags: Vec::new(),
        }
    }

    pub fn from_env() -> Self {
        let defaults = DatadogConfig::for_store(&HookConfig::from_env().store);

        let statsd_addr = std::env::var("DD_DOGSTATSD_URL")
            .unwrap_or_else(|_| DEFAULT_STATSD_ADDR.to_string())
            .parse()
            .unwrap_or_else(|e| {
                tracing::warn!("Invalid DD_DOGSTATSD_URL ({}), using {}", e, DEFAULT_STATSD_ADDR);
                defaults.statsd_addr
            });

        let trace_sample_rate = std::env::var("DD_TRACE_SAMPLE_RATE")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .map(|r| r.clamp(0.0, 1.0))
            .unwrap_or(defaults.trace_sample_rate);

        DatadogConfig {
            service_name: std::env::var("DD_SERVICE").unwrap_or(defaults.service_name),
            store: defaults.store,
            env: std::env::var("DD_ENV").unwrap_or(defaults.env),
            version: std::env::var("DD_VERSION").unwrap_or(defaults.version),
            statsd_addr,
            trace_addr: std::env::var("DD_TRACE_AGENT_URL").unwrap_or(defaults.trace_addr),
            trace_sample_rate,
            metric_prefix: std::env::var("DD_METRIC_PREFIX").unwrap_or(defaults.metric_prefix),
            tags: std::env::var("DD_TAGS")
                .map(|v| parse_tags(&v))
                .unwrap_or_default(),
        }
    }

    /// Global tags as `key:value` strings
    pub fn formatted_tags(&self) -> Vec<String> {
        self.tags.iter().map(|(k, v)| format!("{}:{}", k, v)).collect()
    }
}

/// Parse `k1:v1,k2:v2`; entries without a colon are dropped
fn parse_tags(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|pair| {
            let (k, v) = pair.trim().split_once(':')?;
            if k.is_empty() {
                return None;
            }
            Some((k.to_string(), v.to_string()))
        })
        .collect()
}
