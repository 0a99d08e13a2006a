//! Span export for local profiling of pipeline runs.

use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler, TracerProvider};
use opentelemetry_stdout::SpanExporter;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

const SERVICE_NAME: &str = "reelsmith";

fn filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Install a subscriber that logs to stderr and exports spans to stdout.
///
/// `RUST_LOG` overrides `default_directive` for both outputs. Call
/// [`shutdown_telemetry`] before exit so buffered spans are flushed.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_telemetry(default_directive: &str) -> Result<(), Box<dyn std::error::Error>> {
    let provider = TracerProvider::builder()
        .with_simple_exporter(SpanExporter::default())
        .with_id_generator(RandomIdGenerator::default())
        .with_sampler(Sampler::AlwaysOn)
        .with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            SERVICE_NAME,
        )]))
        .build();
    let tracer = provider.tracer(SERVICE_NAME);
    opentelemetry::global::set_tracer_provider(provider);

    let spans = tracing_opentelemetry::layer()
        .with_tracer(tracer)
        .with_filter(filter(default_directive));
    let logs = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(filter(default_directive));

    tracing_subscriber::registry()
        .with(spans)
        .with(logs)
        .try_init()?;
    Ok(())
}

/// Flush and drop the global tracer provider.
pub fn shutdown_telemetry() {
    opentelemetry::global::shutdown_tracer_provider();
}
