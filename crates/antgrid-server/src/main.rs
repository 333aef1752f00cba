//! The `antgrid-server` binary.

use std::net::SocketAddr;

use antgrid_server::config::{Config, ConfigError};
use antgrid_server::{AppState, router, shutdown_signal};

use clap::Parser;

use tokio::net::TcpListener;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum ServerError {
    #[error("invalid log filter `{filter}`: {source}")]
    LogFilter {
        filter: String,
        source: tracing_subscriber::filter::ParseError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(std::io::Error),
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let config = Config::parse();

    if let Err(e) = run(config).await {
        error!("{e}");
        eprintln!("antgrid-server: {e}");
        return std::process::ExitCode::FAILURE;
    }

    std::process::ExitCode::SUCCESS
}

async fn run(config: Config) -> Result<(), ServerError> {
    let filter =
        EnvFilter::try_new(&config.log_level).map_err(|source| ServerError::LogFilter {
            filter: config.log_level.clone(),
            source,
        })?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store = config.store().await?;
    let controller = config.controller().await?;

    let app = router(AppState::new(store, controller));

    let address = config.socket_address();
    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| ServerError::Bind { address, source })?;

    info!("Listening on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    info!("Server stopped");

    Ok(())
}
