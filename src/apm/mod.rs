//! APM client seam
//!
//! The hook never talks to an APM agent directly. It asks a [`Tracer`] to
//! start a span under a context and later ends the returned [`SpanHandle`].
//!
//! - [`TracingTracer`]: spans through the `tracing` crate, exported to the
//!   agent by whatever subscriber the application installed
//! - [`NoopTracer`]: tracing disabled, never yields a span
//! - [`RecordingTracer`]: in-memory double that records starts and ends

mod noop;
mod recording;
mod tracing_tracer;

pub use noop::NoopTracer;
pub use recording::{RecordedSpan, RecordingTracer};
pub use tracing_tracer::TracingTracer;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::context::Context;

/// Identity of a span, unique among the open spans of one tracer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpanId(pub u64);

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Tracer-side half of an open span
pub trait ActiveSpan: Send + Sync {
    /// Close the span. Called at most once per handle.
    fn end(&self);
}

/// An open span as seen by instrumentation code
#[derive(Clone)]
pub struct SpanHandle {
    id: SpanId,
    inner: Arc<dyn ActiveSpan>,
    ended: Arc<AtomicBool>,
}

impl SpanHandle {
    pub fn new(id: SpanId, inner: Arc<dyn ActiveSpan>) -> Self {
        SpanHandle {
            id,
            inner,
            ended: Arc::new(AtomicBool::new(false)),
        }
    }

    #[inline]
    pub fn id(&self) -> SpanId {
        self.id
    }

    /// End the span; later calls on this handle or its clones do nothing
    pub fn end(&self) {
        if !self.ended.swap(true, Ordering::AcqRel) {
            self.inner.end();
        }
    }

    pub fn is_ended(&self) -> bool {
        self.ended.load(Ordering::Acquire)
    }
}

impl fmt::Debug for SpanHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpanHandle")
            .field("id", &self.id)
            .field("ended", &self.is_ended())
            .finish()
    }
}

/// Starts spans on behalf of instrumentation
pub trait Tracer: Send + Sync {
    /// Start a span named `name` with category `span_type` under `ctx`.
    ///
    /// Returns `None` when the tracer records nothing for this span, along
    /// with the unchanged context. Otherwise the returned context makes the
    /// new span the parent of anything started from it.
    fn start_span(&self, ctx: &Context, name: &str, span_type: &str)
        -> (Option<SpanHandle>, Context);
}

impl<T: Tracer + ?Sized> Tracer for Arc<T> {
    fn start_span(
        &self,
        ctx: &Context,
        name: &str,
        span_type: &str,
    ) -> (Option<SpanHandle>, Context) {
        (**self).start_span(ctx, name, span_type)
    }
}
