use clinical_service::config::ClinicalConfig;
use clinical_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    init_tracing("clinical-service", "info");

    // Fail fast: a bad configuration or an unreachable store terminates the
    // process instead of starting degraded.
    let config = ClinicalConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = ?config.store.backend,
        "Starting clinical service"
    );

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to start clinical service: {}", e);
        e
    })?;

    app.run_until_stopped().await?;
    Ok(())
}
