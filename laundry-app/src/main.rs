//! # laundry-server
//!
//! Reads configuration, opens the store, builds the point-of-sale service
//! with its gateway and credential adapters, and serves HTTP until a shutdown
//! signal arrives.

mod config;

use std::sync::Arc;

use gateway_sim::SimulatedGateway;
use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use laundry_hex::{JwtCredentials, PosService, RevocationList, inbound::HttpServer};
use laundry_repo::build_repo;

/// Exports spans over OTLP/gRPC. Only called when a collector endpoint is configured.
fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("laundry-pos"), provider))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize OpenTelemetry tracing when a collector is configured
    let (telemetry, otel_provider) = if std::env::var_os("OTEL_EXPORTER_OTLP_ENDPOINT").is_some() {
        let (otel_tracer, provider) = init_tracer()?;
        (
            Some(tracing_opentelemetry::layer().with_tracer(otel_tracer)),
            Some(provider),
        )
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,laundry_app=debug,laundry_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    // Load configuration
    let config = config::Config::from_env()?;

    tracing::info!("Starting laundry server on port {}", config.port);

    let repo = build_repo(&config.database_url).await?;

    let gateway = SimulatedGateway::new(config.gateway_redirect_base.as_str());
    let credentials = JwtCredentials::new(
        &config.jwt_secret,
        config.token_ttl,
        Arc::new(RevocationList::new()),
    );

    let service = PosService::new(repo, Arc::new(gateway), Arc::new(credentials))
        .with_deadline(config.request_timeout);

    let server = HttpServer::new(service);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Flush pending spans.
    if let Some(provider) = otel_provider {
        let _ = provider.shutdown();
    }
    Ok(())
}
