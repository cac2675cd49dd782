use std::sync::Arc;

use redis_apm::observability::{self, DatadogConfig, Metrics};
use redis_apm::{ApmHook, Context, HookConfig, HookedConnection, TracingTracer};
use tracing::{info, info_span};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // the Datadog exporter batches on the Tokio runtime
    #[cfg(feature = "datadog")]
    let runtime = tokio::runtime::Runtime::new()?;
    #[cfg(feature = "datadog")]
    let _guard = runtime.enter();

    let dd_config = DatadogConfig::from_env();
    observability::init_tracing(&dd_config)?;

    let result = run(&dd_config);
    observability::shutdown();
    result
}

fn run(dd_config: &DatadogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string());
    let client = redis::Client::open(url.as_str())?;

    let hook = ApmHook::with_config(TracingTracer::new(), &HookConfig::from_env())
        .with_metrics(Arc::new(Metrics::new(dd_config)));
    info!(url = %url, span_type = %hook.span_type(), "connecting");

    let mut conn = HookedConnection::new(client.get_connection()?);
    conn.add_hook(Arc::new(hook));

    let request = info_span!("demo.request");
    let _entered = request.enter();
    let ctx = Context::background();

    let _: () = conn.query(&ctx, redis::cmd("SET").arg("redis-apm:demo").arg(1))?;
    let value: i64 = conn.query(&ctx, redis::cmd("GET").arg("redis-apm:demo"))?;
    info!(value, "read back");

    let mut pipe = redis::pipe();
    pipe.cmd("INCR")
        .arg("redis-apm:demo")
        .cmd("EXPIRE")
        .arg("redis-apm:demo")
        .arg(60)
        .ignore()
        .cmd("GET")
        .arg("redis-apm:demo");
    let (incremented, current): (i64, i64) = conn.query_pipeline(&ctx, &pipe)?;
    info!(incremented, current, "pipeline done");

    Ok(())
}
