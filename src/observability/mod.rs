//! Datadog Observability Module
//!
//! Ships the hook's spans and metrics to Datadog:
//! - Distributed tracing via Datadog APM (OpenTelemetry layer over `tracing`)
//! - Metrics via DogStatsD (UDP)
//! - Structured logging through the same subscriber
//!
//! # Usage
//!
//! ```rust,ignore
//! use redis_apm::observability::{DatadogConfig, Metrics, init_tracing, shutdown};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = DatadogConfig::from_env();
//!     init_tracing(&config).expect("Failed to initialize tracing");
//!     let hook = redis_apm::ApmHook::default()
//!         .with_metrics(std::sync::Arc::new(Metrics::new(&config)));
//!
//!     // register `hook` on a HookedConnection ...
//!
//!     shutdown();
//! }
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DD_SERVICE` | `redis-apm` | Service name |
//! | `DD_ENV` | `development` | Environment tag |
//! | `DD_VERSION` | pkg version | Service version |
//! | `DD_DOGSTATSD_URL` | `127.0.0.1:8125` | DogStatsD address |
//! | `DD_TRACE_AGENT_URL` | `http://127.0.0.1:8126` | APM agent URL |
//! | `DD_TRACE_SAMPLE_RATE` | `1.0` | Trace sampling rate |
//! | `DD_METRIC_PREFIX` | `redis_apm` | Metric name prefix |
//! | `DD_TAGS` | `` | Global tags (k1:v1,k2:v2) |

pub mod config;
pub mod metrics;
pub mod tracing_setup;

pub use config::DatadogConfig;
pub use metrics::Metrics;
pub use tracing_setup::{init as init_tracing, shutdown};
