//! Command-line flags and environment overrides.
//!
//! Every flag has an environment-variable fallback. Values given here win
//! over the optional TOML file, which wins over built-in defaults.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{read_config, ConfigError};
use crate::config::schema::{AuthMode, LogFormat, ProxyConfig, Secret};
use crate::config::validation::validate_config;

#[derive(Debug, Parser)]
#[command(name = "restconf-proxy")]
#[command(version, about = "Reverse proxy for RESTCONF devices and controllers", long_about = None)]
pub struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "RESTCONF_PROXY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listen address for the proxy (e.g. ":9000" or "127.0.0.1:9000").
    #[arg(short, long, env = "RESTCONF_PROXY_LISTEN")]
    pub listen: Option<String>,

    /// Upstream RESTCONF base URL (e.g. http://host:port/restconf).
    #[arg(short, long, env = "RESTCONF_UPSTREAM")]
    pub upstream: Option<String>,

    /// Upstream basic auth username.
    #[arg(long, env = "RESTCONF_UPSTREAM_USER")]
    pub upuser: Option<String>,

    /// Upstream basic auth password.
    #[arg(long, env = "RESTCONF_UPSTREAM_PASSWORD", hide_env_values = true)]
    pub uppass: Option<String>,

    /// Bearer token injected on every upstream request.
    #[arg(long, env = "RESTCONF_BEARER_TOKEN", hide_env_values = true)]
    pub bearer_token: Option<String>,

    /// Forward the caller's Authorization header to the upstream.
    #[arg(long, env = "RESTCONF_FORWARD_AUTH")]
    pub forward_auth: bool,

    /// Force a credential mode instead of precedence-based selection.
    #[arg(long, value_enum, env = "RESTCONF_AUTH_MODE")]
    pub auth_mode: Option<AuthMode>,

    /// Upstream request timeout in seconds.
    #[arg(long = "timeout", env = "RESTCONF_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Path prefix under which the upstream is exposed.
    #[arg(long, env = "RESTCONF_MOUNT_PREFIX")]
    pub mount_prefix: Option<String>,

    /// Accept invalid upstream TLS certificates.
    #[arg(long, env = "RESTCONF_UPSTREAM_INSECURE")]
    pub insecure: bool,

    /// Log level (overridden by RUST_LOG).
    #[arg(long, env = "RESTCONF_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log line format.
    #[arg(long, value_enum, env = "RESTCONF_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Serve Prometheus metrics on this address.
    #[arg(long, env = "RESTCONF_METRICS_ADDRESS")]
    pub metrics_address: Option<String>,
}

impl Cli {
    /// Build the validated configuration: file (if any), then flag overrides.
    pub fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ProxyConfig::default(),
        };
        self.apply_overrides(&mut config);
        validate_config(&config)?;
        Ok(config)
    }

    /// Copy every flag that was given onto `config`.
    pub fn apply_overrides(self, config: &mut ProxyConfig) {
        if let Some(listen) = self.listen {
            config.listener.bind_address = normalize_listen(&listen);
        }
        if let Some(prefix) = self.mount_prefix {
            config.listener.mount_prefix = prefix;
        }
        if let Some(upstream) = self.upstream {
            config.upstream.base_url = upstream;
        }
        if self.insecure {
            config.upstream.accept_invalid_certs = true;
        }
        if let Some(user) = self.upuser {
            config.auth.username = Some(user);
        }
        if let Some(pass) = self.uppass {
            config.auth.password = Some(Secret::new(pass));
        }
        if let Some(token) = self.bearer_token {
            config.auth.bearer_token = Some(Secret::new(token));
        }
        if self.forward_auth {
            config.auth.forward_incoming = true;
        }
        if let Some(mode) = self.auth_mode {
            config.auth.mode = mode;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeouts.request_secs = secs;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
        if let Some(addr) = self.metrics_address {
            config.observability.metrics_enabled = true;
            config.observability.metrics_address = addr;
        }
    }
}

/// Accept the Go-style ":9000" shorthand for "all interfaces".
fn normalize_listen(listen: &str) -> String {
    if listen.starts_with(':') {
        format!("0.0.0.0{}", listen)
    } else {
        listen.to_string()
    }
}
