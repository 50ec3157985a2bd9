use alert_relay_api::{app, config, gateway::GatewayHandle, middleware, routes::snippets};
use anyhow::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load()?;

    middleware::logging::init_logging(&config.logging)?;
    middleware::init_metrics()?;

    info!("Starting Alert Relay v{}", env!("CARGO_PKG_VERSION"));

    snippets::ensure_snippets_dir(&config.snippets.dir).await?;
    info!(dir = %config.snippets.dir.display(), "Serving snippets");

    let gateway = GatewayHandle::spawn(config.gateway.command_buffer);
    let app = app::create_app(config.clone(), gateway);

    let addr = config.socket_addr();
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
