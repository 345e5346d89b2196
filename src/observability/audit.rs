//! Per-request audit record.
//!
//! Exactly one audit line is written per proxied request, whether the
//! response was relayed fully, cut short, or produced locally.

use std::time::Instant;

use axum::http::{Method, StatusCode};

use crate::observability::metrics;

pub const AUDIT_TARGET: &str = "restconf_proxy::audit";

/// How a proxied request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Body relayed to the end.
    Complete,
    /// Upstream body failed mid-stream; the caller saw a truncated response.
    UpstreamStreamError,
    /// Caller went away before the body was fully relayed.
    ClientDisconnected,
    /// Upstream could not be reached; a 502 was returned.
    UpstreamUnavailable,
    /// Upstream URL could not be formed; a 500 was returned.
    MappingError,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Complete => "complete",
            Outcome::UpstreamStreamError => "upstream_stream_error",
            Outcome::ClientDisconnected => "client_disconnected",
            Outcome::UpstreamUnavailable => "upstream_unavailable",
            Outcome::MappingError => "mapping_error",
        }
    }
}

/// Started when a request arrives, consumed when its audit line is written.
#[derive(Debug)]
pub struct AuditRecord {
    request_id: String,
    method: Method,
    path: String,
    started: Instant,
}

impl AuditRecord {
    pub fn start(request_id: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            method,
            path: path.into(),
            started: Instant::now(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Write the audit line and record request metrics.
    pub fn finish(self, status: StatusCode, bytes: u64, outcome: Outcome) {
        let elapsed = self.started.elapsed();
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;

        match outcome {
            Outcome::Complete => tracing::info!(
                target: AUDIT_TARGET,
                request_id = %self.request_id,
                method = %self.method,
                path = %self.path,
                status = status.as_u16(),
                bytes,
                elapsed_ms,
                outcome = outcome.as_str(),
                "<-- {} {} {} {}B in {:?}",
                self.method, self.path, status.as_u16(), bytes, elapsed
            ),
            _ => tracing::warn!(
                target: AUDIT_TARGET,
                request_id = %self.request_id,
                method = %self.method,
                path = %self.path,
                status = status.as_u16(),
                bytes,
                elapsed_ms,
                outcome = outcome.as_str(),
                "<-- {} {} {} {}B in {:?} ({})",
                self.method, self.path, status.as_u16(), bytes, elapsed, outcome.as_str()
            ),
        }

        metrics::record_request(self.method.as_str(), status.as_u16(), bytes, elapsed);
    }
}
