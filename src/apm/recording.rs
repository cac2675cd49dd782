//! Recording tracer for tests
//!
//! Records every start and end in memory so tests can check which span a
//! hook closed. Ids are handed out sequentially from 1.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{ActiveSpan, SpanHandle, SpanId, Tracer};
use crate::context::Context;

/// A span as seen by [`RecordingTracer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSpan {
    pub id: SpanId,
    pub name: String,
    pub span_type: String,
    pub parent: Option<SpanId>,
}

#[derive(Default)]
struct Recording {
    next_id: AtomicU64,
    disabled: AtomicBool,
    started: Mutex<Vec<RecordedSpan>>,
    ended: Mutex<Vec<SpanId>>,
}

struct RecordedEnd {
    id: SpanId,
    recording: Arc<Recording>,
}

impl ActiveSpan for RecordedEnd {
    fn end(&self) {
        self.recording.ended.lock().push(self.id);
    }
}

#[derive(Clone, Copy)]
struct RecordedParent(SpanId);

/// In-memory tracer; clones share one recording
#[derive(Clone, Default)]
pub struct RecordingTracer {
    recording: Arc<Recording>,
}

impl RecordingTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracer that refuses every span, like a disabled agent
    pub fn disabled() -> Self {
        let tracer = Self::new();
        tracer.set_enabled(false);
        tracer
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.recording.disabled.store(!enabled, Ordering::SeqCst);
    }

    /// All started spans, in start order
    pub fn started(&self) -> Vec<RecordedSpan> {
        self.recording.started.lock().clone()
    }

    /// Ids of ended spans, in end order
    pub fn ended_ids(&self) -> Vec<SpanId> {
        self.recording.ended.lock().clone()
    }

    /// Started spans that have been ended, in end order
    pub fn ended(&self) -> Vec<RecordedSpan> {
        let started = self.recording.started.lock();
        self.recording
            .ended
            .lock()
            .iter()
            .filter_map(|id| started.iter().find(|s| s.id == *id).cloned())
            .collect()
    }

    /// Started spans not yet ended
    pub fn open_spans(&self) -> Vec<RecordedSpan> {
        let started = self.recording.started.lock();
        let ended = self.recording.ended.lock();
        started
            .iter()
            .filter(|s| !ended.contains(&s.id))
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.recording.started.lock().clear();
        self.recording.ended.lock().clear();
    }
}

impl Tracer for RecordingTracer {
    fn start_span(
        &self,
        ctx: &Context,
        name: &str,
        span_type: &str,
    ) -> (Option<SpanHandle>, Context) {
        if self.recording.disabled.load(Ordering::SeqCst) {
            return (None, ctx.clone());
        }

        let id = SpanId(self.recording.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.recording.started.lock().push(RecordedSpan {
            id,
            name: name.to_string(),
            span_type: span_type.to_string(),
            parent: ctx.value::<RecordedParent>().map(|p| p.0),
        });

        let handle = SpanHandle::new(
            id,
            Arc::new(RecordedEnd {
                id,
                recording: self.recording.clone(),
            }),
        );
        (Some(handle), ctx.with_value(RecordedParent(id)))
    }
}
