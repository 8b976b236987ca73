use location_service::config::LocationConfig;
use location_service::services::init_metrics;
use location_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Read before config so configuration warnings reach the subscriber.
    let otlp_endpoint = std::env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty());
    init_tracing("location-service", "info", otlp_endpoint.as_deref())?;

    init_metrics()?;

    let config = LocationConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to start location service: {}", e);
        anyhow::anyhow!("Startup error: {}", e)
    })?;

    app.run_until_stopped().await?;

    Ok(())
}
