use anyhow::Context;
use confhook::config::Config;
use confhook::domain::call_control::CallControl;
use confhook::infrastructure::telnyx::TelnyxClient;
use confhook::interface::api::{build_router, init_metrics, metrics_router, AppState};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting confhook conference server");

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;
    info!(
        "Configuration loaded: provider {}, conference number {}",
        config.provider.api_base_url, config.provider.phone_number
    );

    let call_control: Arc<dyn CallControl> = Arc::new(
        TelnyxClient::new(
            config.provider.api_base_url.clone(),
            config.provider.api_key.clone(),
            Duration::from_secs(config.provider.request_timeout_secs),
        )
        .context("failed to build call-control client")?,
    );

    let state = AppState::from_config(&config, call_control)
        .context("invalid webhook public key")?;

    info!("Initializing Prometheus metrics exporter");
    let prometheus_handle = init_metrics().context("failed to install metrics recorder")?;

    let app = build_router(state).merge(metrics_router(prometheus_handle));

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;
    info!("Listening for webhooks on {}", config.bind_address());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    info!("Shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
