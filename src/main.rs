//! RESTCONF reverse proxy.
//!
//! ```text
//!     Client ──▶ /restconf/<rest>?<query>
//!                    │
//!                    ▼
//!           ┌──────────────────┐
//!           │ mount prefix     │── no match ──▶ 404
//!           │ URL mapping      │
//!           │ header policy    │
//!           │ credentials      │
//!           └────────┬─────────┘
//!                    ▼
//!         <upstream base>/<rest>?<query> ──▶ RESTCONF server
//!                    │
//!     Client ◀── status, headers, streamed body (or 502)
//! ```

use std::process::ExitCode;

use clap::Parser;

use restconf_proxy::config::Cli;
use restconf_proxy::observability::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("restconf-proxy: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.observability);

    match restconf_proxy::lifecycle::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}
