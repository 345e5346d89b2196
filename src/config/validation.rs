//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the upstream base URL, mount prefix and bind address
//! - Check that the selected credential mode has its material
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;

use crate::config::schema::ProxyConfig;
use crate::routing::{MountPrefix, UpstreamBase};
use crate::security::CredentialPolicy;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("upstream base URL is required")]
    MissingUpstream,

    #[error("invalid upstream base URL `{url}`: {reason}")]
    InvalidUpstream { url: String, reason: String },

    #[error("invalid mount prefix `{0}`: must start with '/' and name at least one segment")]
    InvalidMountPrefix(String),

    #[error("mount prefix `{0}` collides with the health endpoint")]
    ReservedMountPrefix(String),

    #[error("invalid bind address `{0}`")]
    InvalidBindAddress(String),

    #[error("invalid metrics address `{0}`")]
    InvalidMetricsAddress(String),

    #[error("bearer auth mode requires a non-empty bearer token")]
    MissingBearerToken,

    #[error("basic auth mode requires a username")]
    MissingUsername,

    #[error("an upstream password was configured without a username")]
    PasswordWithoutUsername,

    #[error("credential cannot be sent as a header value: {0}")]
    InvalidCredential(String),

    #[error("{0} timeout must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("invalid default Accept value `{0}`")]
    InvalidDefaultAccept(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if let Err(e) = MountPrefix::new(&config.listener.mount_prefix) {
        errors.push(e);
    }

    if let Err(e) = UpstreamBase::parse(&config.upstream.base_url) {
        errors.push(e);
    }

    if HeaderValue::from_str(&config.upstream.default_accept).is_err() {
        errors.push(ValidationError::InvalidDefaultAccept(
            config.upstream.default_accept.clone(),
        ));
    }

    if let Err(e) = CredentialPolicy::from_config(&config.auth) {
        errors.push(e);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
