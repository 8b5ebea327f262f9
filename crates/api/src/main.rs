use std::sync::Arc;

use anyhow::Context;

use catalog_api::config::ServerConfig;
use catalog_infra::SqliteProductStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    catalog_observability::init();

    let config = ServerConfig::from_env().context("invalid configuration")?;

    let store = SqliteProductStore::connect(&config.store)
        .await
        .with_context(|| format!("failed to open product store at {}", config.store.database_url))?;

    let app = catalog_api::app::build_app(Arc::new(store.clone()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    store.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        return;
    }
    tracing::info!("shutdown requested");
}
