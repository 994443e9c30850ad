use anyhow::Context;
use std::sync::Arc;

use core_blog::{DEFAULT_LOG_SETTINGS, config_path, get_db_pool, load_config, setup_logging};
use data_model_blog::store::PgStore;

use api_blog::{AppState, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    setup_logging(DEFAULT_LOG_SETTINGS);

    let path = config_path();
    let config = load_config(&path).with_context(|| format!("Error reading config file {}", path.display()))?;

    let pool = get_db_pool(&config.database)
        .await
        .context("Couldn't connect to the database")?;

    let state = AppState::with_store(Arc::new(PgStore::new(pool)), config.session.clone());
    let app = routes::router(state, config.app.request_timeout());

    let addr = config.app.socket_addr().context("Invalid HOST or PORT")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to address: {}", addr))?;

    tracing::info!("Starting server on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
