//! Command hooks
//!
//! [`Hook`] is the contract the client runs around every command and every
//! pipeline. [`ApmHook`] is the implementation that reports each one as an
//! APM span: opened in the before-callback, stored in the derived context,
//! and ended in the matching after-callback.

use std::sync::Arc;
use std::time::Instant;

use tracing::trace;

use crate::apm::{SpanHandle, Tracer, TracingTracer};
use crate::command::{command_name, pipeline_name, Cmder};
use crate::config::HookConfig;
use crate::context::Context;
use crate::error::Result;
use crate::recorder::{noop_metrics, SharedMetrics, SpanEvent};

/// Callbacks the client runs around command execution
pub trait Hook: Send + Sync {
    /// Runs before a single command; the returned context is used for the
    /// command and handed to `after_process`
    fn before_process(&self, ctx: &Context, cmd: &dyn Cmder) -> Result<Context>;

    fn after_process(&self, ctx: &Context, cmd: &dyn Cmder) -> Result<()>;

    /// Runs before a pipeline, with its commands in submission order
    fn before_process_pipeline(&self, ctx: &Context, cmds: &[&dyn Cmder]) -> Result<Context>;

    fn after_process_pipeline(&self, ctx: &Context, cmds: &[&dyn Cmder]) -> Result<()>;
}

/// Context key for the span opened by an `ApmHook`.
///
/// Stored even when the tracer yields nothing, so a nested command never
/// sees an enclosing command's span.
struct HookSpan {
    span: Option<SpanHandle>,
    started: Instant,
}

fn span_from_context(ctx: &Context) -> Option<&HookSpan> {
    ctx.value::<HookSpan>().filter(|s| s.span.is_some())
}

/// Reports commands and pipelines as APM spans
///
/// Never fails: every callback returns `Ok`, whatever the tracer does.
pub struct ApmHook {
    tracer: Arc<dyn Tracer>,
    span_type: String,
    metrics: SharedMetrics,
}

impl ApmHook {
    pub fn new(tracer: impl Tracer + 'static) -> Self {
        Self::with_config(tracer, &HookConfig::default())
    }

    pub fn with_config(tracer: impl Tracer + 'static, config: &HookConfig) -> Self {
        ApmHook {
            tracer: Arc::new(tracer),
            span_type: config.span_type(),
            metrics: noop_metrics(),
        }
    }

    /// Count started, ended and skipped spans and time their lifetime on `metrics`
    pub fn with_metrics(mut self, metrics: SharedMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn span_type(&self) -> &str {
        &self.span_type
    }

    fn start(&self, ctx: &Context, name: &str, kind: &str) -> Context {
        let (span, derived) = self.tracer.start_span(ctx, name, &self.span_type);
        if span.is_some() {
            self.metrics.record_span(SpanEvent::Started, kind);
        } else {
            trace!(span = %name, "tracer recorded no span");
            self.metrics.record_span(SpanEvent::Skipped, kind);
        }
        derived.with_value(HookSpan {
            span,
            started: Instant::now(),
        })
    }

    fn end(&self, ctx: &Context, kind: &str) {
        if let Some(HookSpan {
            span: Some(span),
            started,
        }) = span_from_context(ctx)
        {
            trace!(span_id = %span.id(), "ending span");
            span.end();
            self.metrics.record_span(SpanEvent::Ended, kind);
            self.metrics
                .record_span_duration(kind, started.elapsed().as_secs_f64() * 1000.0);
        }
    }
}

impl Default for ApmHook {
    fn default() -> Self {
        ApmHook::new(TracingTracer::new())
    }
}

impl Hook for ApmHook {
    fn before_process(&self, ctx: &Context, cmd: &dyn Cmder) -> Result<Context> {
        Ok(self.start(ctx, &command_name(cmd), "command"))
    }

    fn after_process(&self, ctx: &Context, _cmd: &dyn Cmder) -> Result<()> {
        self.end(ctx, "command");
        Ok(())
    }

    fn before_process_pipeline(&self, ctx: &Context, cmds: &[&dyn Cmder]) -> Result<Context> {
        Ok(self.start(ctx, &pipeline_name(cmds), "pipeline"))
    }

    fn after_process_pipeline(&self, ctx: &Context, _cmds: &[&dyn Cmder]) -> Result<()> {
        self.end(ctx, "pipeline");
        Ok(())
    }
}

/// Ready-to-register hook reporting through the `tracing` subscriber
pub fn new_hook() -> Arc<dyn Hook> {
    Arc::new(ApmHook::default())
}
