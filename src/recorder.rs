//! Metrics Recorder Trait
//!
//! Defines a trait abstraction for metrics recording that supports:
//! - Production: Real DogStatsD client (`datadog` feature)
//! - Tests: In-memory recording for verification
//!
//! The hook uses it to report on its own spans: how many were started,
//! ended, or skipped because the tracer recorded nothing, and how long each
//! ended span stayed open.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use parking_lot::Mutex;

/// Lifecycle events of a hook span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanEvent {
    Started,
    Ended,
    Skipped,
}

impl SpanEvent {
    pub fn metric_name(self) -> &'static str {
        match self {
            SpanEvent::Started => "apm.span.started",
            SpanEvent::Ended => "apm.span.ended",
            SpanEvent::Skipped => "apm.span.skipped",
        }
    }
}

pub const SPAN_DURATION: &str = "apm.span.duration";

/// Trait for recording metrics
pub trait MetricsRecorder: Send + Sync + 'static {
    /// Increment a counter by 1
    fn incr(&self, name: &str, tags: &[&str]);

    /// Record a timing in milliseconds
    fn timing(&self, name: &str, duration_ms: f64, tags: &[&str]);

    /// Count a hook span event; `kind` is `command` or `pipeline`
    fn record_span(&self, event: SpanEvent, kind: &str) {
        let kind_tag = format!("kind:{}", kind);
        self.incr(event.metric_name(), &[&kind_tag]);
    }

    /// Time between a span's before- and after-callback
    fn record_span_duration(&self, kind: &str, duration_ms: f64) {
        let kind_tag = format!("kind:{}", kind);
        self.timing(SPAN_DURATION, duration_ms, &[&kind_tag]);
    }
}

/// No-op metrics recorder - zero overhead when metrics are disabled
#[derive(Clone, Default)]
pub struct NoopMetrics;

impl MetricsRecorder for NoopMetrics {
    #[inline]
    fn incr(&self, _name: &str, _tags: &[&str]) {}
    #[inline]
    fn timing(&self, _name: &str, _duration_ms: f64, _tags: &[&str]) {}
    #[inline]
    fn record_span(&self, _event: SpanEvent, _kind: &str) {}
    #[inline]
    fn record_span_duration(&self, _kind: &str, _duration_ms: f64) {}
}

/// Recorded metric for testing
#[derive(Debug, Clone)]
pub struct RecordedMetric {
    pub name: String,
    pub value: f64,
    pub tags: Vec<String>,
    pub metric_type: MetricType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Timing,
}

/// In-memory metrics recorder - records all metrics for verification
#[derive(Default)]
pub struct SimulatedMetrics {
    recorded: Mutex<Vec<RecordedMetric>>,
    started: AtomicU64,
    ended: AtomicU64,
    skipped: AtomicU64,
}

impl SimulatedMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get metrics by name
    pub fn get_by_name(&self, name: &str) -> Vec<RecordedMetric> {
        self.recorded
            .lock()
            .iter()
            .filter(|m| m.name == name)
            .cloned()
            .collect()
    }

    pub fn spans_started(&self) -> u64 {
        self.started.load(Ordering::SeqCst)
    }

    pub fn spans_ended(&self) -> u64 {
        self.ended.load(Ordering::SeqCst)
    }

    pub fn spans_skipped(&self) -> u64 {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Clear all recorded metrics
    pub fn clear(&self) {
        self.recorded.lock().clear();
        self.started.store(0, Ordering::SeqCst);
        self.ended.store(0, Ordering::SeqCst);
        self.skipped.store(0, Ordering::SeqCst);
    }

    fn push(&self, name: &str, value: f64, tags: &[&str], metric_type: MetricType) {
        self.recorded.lock().push(RecordedMetric {
            name: name.to_string(),
            value,
            tags: tags.iter().map(|s| s.to_string()).collect(),
            metric_type,
        });
    }
}

impl MetricsRecorder for SimulatedMetrics {
    fn incr(&self, name: &str, tags: &[&str]) {
        self.push(name, 1.0, tags, MetricType::Counter);
    }

    fn timing(&self, name: &str, duration_ms: f64, tags: &[&str]) {
        self.push(name, duration_ms, tags, MetricType::Timing);
    }

    fn record_span(&self, event: SpanEvent, kind: &str) {
        let counter = match event {
            SpanEvent::Started => &self.started,
            SpanEvent::Ended => &self.ended,
            SpanEvent::Skipped => &self.skipped,
        };
        counter.fetch_add(1, Ordering::SeqCst);

        let kind_tag = format!("kind:{}", kind);
        self.incr(event.metric_name(), &[&kind_tag]);
    }
}

/// Arc wrapper for trait object usage
pub type SharedMetrics = Arc<dyn MetricsRecorder>;

/// Create a no-op metrics recorder
pub fn noop_metrics() -> SharedMetrics {
    Arc::new(NoopMetrics)
}

/// Create an in-memory metrics recorder for testing
pub fn simulated_metrics() -> Arc<SimulatedMetrics> {
    Arc::new(SimulatedMetrics::new())
}
