//! ragbooks server binary: configuration, tracing, and the axum listener.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use ragbooks::config::ServiceConfig;
use ragbooks::server;
use ragbooks::service::RagBooksService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // A missing credential is fatal before the listener ever opens.
    let config = ServiceConfig::from_env()?;
    let service = Arc::new(RagBooksService::from_config(&config)?);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "serving ragbooks API");
    axum::serve(listener, server::router(service).into_make_service()).await?;

    Ok(())
}
