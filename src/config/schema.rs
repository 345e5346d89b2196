//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Default `Accept` value injected when the caller sends none.
pub const DEFAULT_ACCEPT: &str = "application/yang-data+json, application/json";

/// Root configuration for the RESTCONF proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, mount prefix).
    pub listener: ListenerConfig,

    /// The single upstream RESTCONF server.
    pub upstream: UpstreamConfig,

    /// Credential handling towards the upstream.
    pub auth: AuthConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:9000").
    pub bind_address: String,

    /// Path prefix under which the upstream API is exposed.
    pub mount_prefix: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:9000".to_string(),
            mount_prefix: "/restconf".to_string(),
        }
    }
}

/// Upstream RESTCONF server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL, e.g. `http://host:8080/restconf`. Required.
    pub base_url: String,

    /// Accept self-signed or otherwise invalid upstream certificates.
    pub accept_invalid_certs: bool,

    /// `Accept` value injected when the outbound request carries none.
    pub default_accept: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            accept_invalid_certs: false,
            default_accept: DEFAULT_ACCEPT.to_string(),
        }
    }
}

/// How the proxy decides which credential reaches the upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Pick by precedence: forward, bearer, basic, none.
    #[default]
    Auto,
    /// Strip any inbound credential and send none.
    None,
    /// Inject HTTP Basic credentials.
    Basic,
    /// Inject a bearer token.
    Bearer,
    /// Forward the caller's `Authorization` header untouched.
    Forward,
}

/// Credential configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// Explicit credential mode; `auto` applies precedence.
    pub mode: AuthMode,

    /// Upstream basic-auth username.
    pub username: Option<String>,

    /// Upstream basic-auth password.
    pub password: Option<Secret>,

    /// Upstream bearer token.
    pub bearer_token: Option<Secret>,

    /// Forward the inbound `Authorization` header instead of injecting one.
    pub forward_incoming: bool,
}

/// A credential string that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the raw secret. Only credential injection should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(REDACTED)")
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// End-to-end upstream deadline (connect, headers and body) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Human readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9464".to_string(),
        }
    }
}
