//! Inbound URI to upstream URL mapping.
//!
//! # Responsibilities
//! - Validate the upstream base URL once at startup
//! - Strip the mount prefix from the inbound path
//! - Join base path and suffix with exactly one slash
//! - Carry the raw path and query across untouched (no re-encoding)
//! - Refuse `.` and `..` segments so a request cannot leave the base path

use axum::http::Uri;
use url::Url;

use crate::config::ValidationError;
use crate::routing::matcher::MountPrefix;

/// Failure to derive an upstream URL for an inbound request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error("path `{0}` is not under the mount prefix")]
    OutsidePrefix(String),

    #[error("path `{0}` contains a dot segment")]
    DotSegment(String),

    #[error("cannot build upstream URL `{target}`: {reason}")]
    InvalidTarget { target: String, reason: String },
}

/// Validated upstream base: origin plus base path without trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamBase {
    origin: String,
    path: String,
}

impl UpstreamBase {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ValidationError::MissingUpstream);
        }

        let invalid = |reason: &str| ValidationError::InvalidUpstream {
            url: raw.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host"));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("query and fragment are not allowed"));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(invalid(
                "embedded credentials are not allowed, use the auth settings",
            ));
        }

        Ok(Self {
            origin: url.origin().ascii_serialization(),
            path: url.path().trim_end_matches('/').to_string(),
        })
    }

    /// `scheme://host[:port]`.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Base path without trailing slash; empty when the base is the host root.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl std::fmt::Display for UpstreamBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.origin, self.path)
    }
}

/// Join a base path and a prefix-stripped suffix with exactly one slash.
///
/// An empty suffix yields the base path itself (`/` for an empty base).
pub fn join_paths(base: &str, suffix: &str) -> String {
    let base = base.trim_end_matches('/');
    if suffix.is_empty() {
        return if base.is_empty() {
            "/".to_string()
        } else {
            base.to_string()
        };
    }
    format!("{}/{}", base, suffix.trim_start_matches('/'))
}

/// `.` or `..`, literally or with either dot written as `%2e`.
fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}

/// Maps inbound request URIs under the mount prefix to upstream URLs.
#[derive(Debug, Clone)]
pub struct RequestMapper {
    base: UpstreamBase,
    prefix: MountPrefix,
}

impl RequestMapper {
    pub fn new(base: UpstreamBase, prefix: MountPrefix) -> Self {
        Self { base, prefix }
    }

    pub fn base(&self) -> &UpstreamBase {
        &self.base
    }

    pub fn prefix(&self) -> &MountPrefix {
        &self.prefix
    }

    /// Build the upstream URI for `uri`.
    ///
    /// The suffix and query are copied byte for byte; the result is never
    /// normalized.
    pub fn map(&self, uri: &Uri) -> Result<Uri, MappingError> {
        let suffix = self
            .prefix
            .suffix(uri.path())
            .ok_or_else(|| MappingError::OutsidePrefix(uri.path().to_string()))?;

        if suffix.split('/').any(is_dot_segment) {
            return Err(MappingError::DotSegment(uri.path().to_string()));
        }

        let mut target = format!(
            "{}{}",
            self.base.origin(),
            join_paths(self.base.path(), suffix)
        );
        if let Some(query) = uri.query() {
            target.push('?');
            target.push_str(query);
        }

        Uri::try_from(target.as_str()).map_err(|e| MappingError::InvalidTarget {
            reason: e.to_string(),
            target,
        })
    }
}
