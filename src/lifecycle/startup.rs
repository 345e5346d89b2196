//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the server from an already validated configuration
//! - Report the effective settings
//! - Install the metrics exporter when enabled
//! - Bind the listener and serve until a termination signal
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last, so traffic only arrives when ready

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::{ConfigError, ProxyConfig};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Run the proxy until SIGINT or SIGTERM.
pub async fn run(config: ProxyConfig) -> Result<(), StartupError> {
    let server = HttpServer::new(config)?;
    log_effective_config(&server);

    let observability = &server.config().observability;
    if observability.metrics_enabled {
        match observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let address = server.config().listener.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    server.run(listener, receiver).await.map_err(StartupError::Serve)?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn log_effective_config(server: &HttpServer) {
    let config = server.config();
    let state = server.state();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %config.listener.bind_address,
        upstream = %state.mapper.base(),
        mount_prefix = %state.mapper.prefix(),
        credential_mode = state.credentials.mode(),
        timeout_secs = state.client.timeout().as_secs(),
        insecure = config.upstream.accept_invalid_certs,
        "restconf-proxy configured"
    );

    for setting in state.credentials.ignored_settings(&config.auth) {
        tracing::warn!(
            setting,
            credential_mode = state.credentials.mode(),
            "Credential setting ignored by the selected mode"
        );
    }
}
