//! packrat gateway entry point.
//!
//! Boots the worker (install, then activate) and serves the gateway plus
//! the form-store API over HTTP. Logging goes to stderr.

use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod app;
mod error;
mod gateway;
mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    let config = packrat_core::AppConfig::load()?;

    // RUST_LOG wins; otherwise the request_log flag picks the default level
    let default_filter = if config.worker.request_log { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(listen = %config.listen_addr, origin = %config.origin, "starting packrat gateway");

    let db = packrat_core::CacheDb::open(&config.db_path).await?;
    let origin = packrat_client::canonicalize_origin(&config.origin)?;

    let fetch_config = packrat_client::FetchConfig {
        user_agent: config.user_agent.clone(),
        max_bytes: config.max_bytes,
        timeout: config.timeout(),
        ..Default::default()
    };
    let upstream = Arc::new(packrat_client::FetchClient::new(fetch_config)?);

    let dispatcher =
        packrat_worker::Dispatcher::new(config.worker.clone(), db.clone(), origin.clone(), upstream).await?;
    let worker = Arc::new(packrat_worker::Worker::new(dispatcher));

    if let Err(e) = worker.install().await {
        tracing::warn!(error = %e, "precache failed; continuing to activation");
    }
    worker.activate().await;

    let router = app::router(app::AppState { db, worker, origin });

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router).await?;

    Ok(())
}
