//! DogStatsD Metrics Client
//!
//! Thread-safe, non-blocking UDP metrics client for Datadog.
//! Gracefully degrades if the Datadog agent is unavailable.

use dogstatsd::{Client, Options};
use std::sync::Arc;

use super::config::DatadogConfig;
use crate::recorder::MetricsRecorder;

/// Metrics client wrapper with graceful degradation
#[derive(Clone)]
pub struct Metrics {
    client: Arc<Option<Client>>,
    prefix: String,
    global_tags: Vec<String>,
}

impl Metrics {
    /// Create a new metrics client from configuration
    pub fn new(config: &DatadogConfig) -> Self {
        let client = match Client::new(Options {
            to_addr: config.statsd_addr.to_string(),
            ..Default::default()
        }) {
            Ok(c) => {
                tracing::info!("DogStatsD client connected to {}", config.statsd_addr);
                Some(c)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to create DogStatsD client: {}. Metrics disabled.",
                    e
                );
                None
            }
        };

        Metrics {
            client: Arc::new(client),
            prefix: config.metric_prefix.clone(),
            global_tags: config.formatted_tags(),
        }
    }

    fn metric_name(&self, name: &str) -> String {
        format!("{}.{}", self.prefix, name)
    }

    fn merge_tags(&self, tags: &[&str]) -> Vec<String> {
        self.global_tags
            .iter()
            .cloned()
            .chain(tags.iter().map(|s| s.to_string()))
            .collect()
    }
}

impl MetricsRecorder for Metrics {
    #[inline]
    fn incr(&self, name: &str, tags: &[&str]) {
        if let Some(ref client) = *self.client {
            let _ = client.incr(&self.metric_name(name), self.merge_tags(tags));
        }
    }

    #[inline]
    fn timing(&self, name: &str, duration_ms: f64, tags: &[&str]) {
        if let Some(ref client) = *self.client {
            let _ = client.timing(&self.metric_name(name), duration_ms as i64, self.merge_tags(tags));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::SpanEvent;

    #[test]
    fn test_metrics_graceful_degradation() {
        // Unreachable agent - should not panic
        let config = DatadogConfig {
            statsd_addr: "127.0.0.1:0".parse().unwrap(),
            ..DatadogConfig::from_env()
        };
        let metrics = Metrics::new(&config);

        metrics.incr("test.counter", &[]);
        metrics.timing("test.timing", 1.5, &[]);
        metrics.record_span(SpanEvent::Started, "command");
        metrics.record_span_duration("command", 0.4);
    }
}
