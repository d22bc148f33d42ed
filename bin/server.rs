// Wolfpack API - Web Server

use anyhow::{Context, Result};
use tracing::info;
use wolfpack_api::logging::init_logging;
use wolfpack_api::{build_router, AppState, ServerConfig, StoreBackend, WolfService};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env()?;
    init_logging(&config.log_filter)?;

    let store = config.open_store().context("Failed to open wolf store")?;
    match &config.store {
        StoreBackend::Sqlite(path) => info!(path = %path.display(), "database opened"),
        StoreBackend::Memory => info!("using in-memory store"),
    }

    let addr = config.socket_addr()?;
    let state = AppState::new(WolfService::new(store));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(addr = %addr, "wolfpack API listening on /api/WolfItems");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed
        std::future::pending::<()>().await;
    }
}
