//! Spans through the `tracing` crate
//!
//! Each started span is a `redis.command` span whose display name travels in
//! `otel.name`, so the OpenTelemetry layer (and the Datadog exporter behind
//! it) reports the command label rather than the static span name.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info_span, Span};

use super::{ActiveSpan, SpanHandle, SpanId, Tracer};
use crate::context::Context;

/// Tracer backed by the global `tracing` subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTracer;

impl TracingTracer {
    pub fn new() -> Self {
        TracingTracer
    }
}

/// Owns the only handle to an open `tracing` span; taking it out closes it
struct TracingSpan {
    span: Mutex<Option<Span>>,
}

impl ActiveSpan for TracingSpan {
    fn end(&self) {
        // dropping the last handle closes the span
        drop(self.span.lock().take());
    }
}

/// Context entry naming the span that children should attach to
#[derive(Clone)]
struct ParentSpan(Arc<TracingSpan>);

/// Create a span for a client-side command, under `parent` if given
#[inline]
fn command_span(name: &str, span_type: &str, parent: Option<&Span>) -> Span {
    match parent {
        Some(p) => info_span!(
            parent: p,
            "redis.command",
            otel.name = %name,
            span.type = %span_type,
            db.system = "redis",
            otel.kind = "client"
        ),
        None => info_span!(
            "redis.command",
            otel.name = %name,
            span.type = %span_type,
            db.system = "redis",
            otel.kind = "client"
        ),
    }
}

impl Tracer for TracingTracer {
    fn start_span(
        &self,
        ctx: &Context,
        name: &str,
        span_type: &str,
    ) -> (Option<SpanHandle>, Context) {
        let span = match ctx.value::<ParentSpan>() {
            Some(ParentSpan(parent)) => {
                let guard = parent.span.lock();
                command_span(name, span_type, guard.as_ref())
            }
            None => command_span(name, span_type, None),
        };

        let id = match span.id() {
            Some(id) if !span.is_disabled() => SpanId(id.into_u64()),
            _ => return (None, ctx.clone()),
        };

        let active = Arc::new(TracingSpan {
            span: Mutex::new(Some(span)),
        });
        let derived = ctx.with_value(ParentSpan(active.clone()));
        (Some(SpanHandle::new(id, active)), derived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subscriber_yields_no_span() {
        // No subscriber is installed for unit tests, so every span is disabled
        let ctx = Context::background();
        let (span, derived) = TracingTracer::new().start_span(&ctx, "GET", "db.redis");

        assert!(span.is_none());
        assert!(derived.same_as(&ctx));
    }

    #[test]
    fn test_spans_open_and_close_under_subscriber() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let tracer = TracingTracer::new();
            let root = Context::background();

            let (outer, ctx) = tracer.start_span(&root, "MULTI", "db.redis");
            let outer = outer.expect("span should be enabled");
            assert_eq!(ctx.depth(), 1);

            let (inner, _) = tracer.start_span(&ctx, "GET", "db.redis");
            let inner = inner.expect("child span should be enabled");
            assert_ne!(inner.id(), outer.id());

            inner.end();
            outer.end();
            assert!(outer.is_ended());

            // parent already closed: the child falls back to the current span
            let (late, _) = tracer.start_span(&ctx, "SET", "db.redis");
            assert!(late.is_some());
        });
    }
}
