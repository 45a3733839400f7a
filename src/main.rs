use salary_predictor::{
    api::{build_router, AppState},
    config::Config,
    ml::{ModelRegistry, TrainingService},
    state::create_artifact_store,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize tracing
    let default_filter = format!(
        "salary_predictor={},tower_http=info",
        config.observability.log_level
    );
    let json_logs = config.observability.json_logs;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting salary predictor v{}", env!("CARGO_PKG_VERSION"));
    config.training.validate()?;

    let store = create_artifact_store(&config.model);
    let registry = Arc::new(ModelRegistry::new(store.clone()));
    let trainer = Arc::new(TrainingService::new(store, config.training.clone()));

    let model = registry.load(false);
    tracing::info!(source = ?model.source(), "Model registry initialized");

    let state = AppState::new(registry, trainer, config.model.version.clone());
    let app = build_router(state);

    let http_addr = format!("{}:{}", config.server.host, config.server.port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("HTTP API server listening on http://{}", http_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let http_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(http_listener, app).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    tokio::select! {
        _ = http_handle => {
            tracing::warn!("HTTP server stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    tracing::info!("Shutting down gracefully...");
    Ok(())
}
