//! APM exporter setup
//!
//! Installs one subscriber that both logs and exports: hook spans opened by
//! `TracingTracer` flow through the OpenTelemetry layer to the Datadog agent,
//! tagged with the client's service and the store it talks to.

use opentelemetry::KeyValue;
use opentelemetry_datadog::DatadogPropagator;
use opentelemetry_sdk::trace::{Config, Sampler};
use opentelemetry_sdk::Resource;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use super::config::DatadogConfig;

/// Directive used when `RUST_LOG` is unset; the hook logs below this level
const DEFAULT_FILTER: &str = "info";

fn resource(config: &DatadogConfig) -> Resource {
    Resource::new(vec![
        KeyValue::new("service.name", config.service_name.clone()),
        KeyValue::new("service.version", config.version.clone()),
        KeyValue::new("deployment.environment", config.env.clone()),
        KeyValue::new("db.system", config.store.clone()),
        KeyValue::new("peer.service", config.store.clone()),
    ])
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the exporting subscriber. Must be called from within a Tokio
/// runtime; fails if a global subscriber is already set.
pub fn init(config: &DatadogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    opentelemetry::global::set_text_map_propagator(DatadogPropagator::default());

    let tracer = opentelemetry_datadog::new_pipeline()
        .with_service_name(&config.service_name)
        .with_agent_endpoint(&config.trace_addr)
        .with_trace_config(
            Config::default()
                .with_sampler(Sampler::TraceIdRatioBased(config.trace_sample_rate))
                .with_resource(resource(config)),
        )
        .install_batch(opentelemetry_sdk::runtime::Tokio)?;

    // fmt before otel so span fields are logged before export
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .try_init()?;

    tracing::info!(
        service = %config.service_name,
        store = %config.store,
        env = %config.env,
        sample_rate = %config.trace_sample_rate,
        agent = %config.trace_addr,
        "exporting redis spans to Datadog APM"
    );

    Ok(())
}

/// Flush buffered spans to the agent; call before exit
pub fn shutdown() {
    tracing::info!("flushing Datadog spans");
    opentelemetry::global::shutdown_tracer_provider();
}
