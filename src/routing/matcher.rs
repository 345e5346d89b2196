//! Mount prefix matching.
//!
//! # Responsibilities
//! - Decide whether a request path lies under the mount prefix
//! - Split off the suffix that is forwarded upstream
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Matching is segment aware: `/restconf` matches `/restconf` and
//!   `/restconf/...` but never `/restconfx`
//! - Trailing slashes on the configured prefix are ignored

use axum::body::Body;
use axum::http::Request;

use crate::config::ValidationError;

/// Path reserved for the liveness endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// The path segment(s) under which the upstream API is exposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPrefix {
    prefix: String,
}

impl MountPrefix {
    /// Validate and normalize a configured prefix.
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let prefix = raw.trim().trim_end_matches('/');
        let invalid = || ValidationError::InvalidMountPrefix(raw.to_string());

        if !prefix.starts_with('/') || prefix.contains(['?', '#']) {
            return Err(invalid());
        }
        if prefix == HEALTH_PATH || prefix.starts_with("/health/") {
            return Err(ValidationError::ReservedMountPrefix(raw.to_string()));
        }

        Ok(Self {
            prefix: prefix.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    /// The part of `path` after the prefix, or `None` if `path` is not mounted.
    ///
    /// The returned suffix is either empty or starts with `/`.
    pub fn suffix<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() || rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }
}

impl Matcher for MountPrefix {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.suffix(req.uri().path()).is_some()
    }
}

impl std::fmt::Display for MountPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.prefix)
    }
}
