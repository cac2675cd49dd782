//! APM instrumentation for redis clients
//!
//! [`ApmHook`] reports every command as a span named after the command (for
//! example `GET`) with span type `db.redis`, and every pipeline as a single
//! span whose name lists its commands (`GET, SET, INCR`).
//!
//! ```rust,ignore
//! use redis_apm::{new_hook, Context, HookedConnection};
//!
//! let client = redis::Client::open("redis://127.0.0.1/")?;
//! let mut conn = HookedConnection::new(client.get_connection()?);
//! conn.add_hook(new_hook());
//!
//! let ctx = Context::background();
//! let _: () = conn.query(&ctx, redis::cmd("SET").arg("key").arg("value"))?;
//! ```

pub mod apm;
pub mod client;
pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod hook;
pub mod hooks;
pub mod recorder;

// Observability: feature-gated Datadog integration
#[cfg(feature = "datadog")]
pub mod observability;

#[cfg(not(feature = "datadog"))]
#[path = "observability_noop.rs"]
pub mod observability;

pub use apm::{NoopTracer, RecordingTracer, SpanHandle, SpanId, Tracer, TracingTracer};
pub use client::HookedConnection;
pub use command::{command_name, pipeline_name, Cmder, EMPTY_COMMAND};
pub use config::HookConfig;
pub use context::Context;
pub use error::{HookError, Result};
pub use hook::{new_hook, ApmHook, Hook};
pub use hooks::Hooks;
