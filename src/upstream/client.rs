//! HTTP client for the upstream RESTCONF server.
//!
//! # Responsibilities
//! - Issue the mapped request with a single end-to-end deadline
//! - Classify transport failures (timeout, connect, other)
//! - Hand back status, headers and an unread body stream
//!
//! # Design Decisions
//! - One pooled hyper client shared by all requests; per-call state stays per call
//! - The mapped URI is sent as-is, never re-parsed or normalized
//! - Redirects are relayed, never followed
//! - No automatic retry; a failure is reported once

use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, Response, Uri};
use hyper::body::Incoming;
use hyper_tls::HttpsConnector;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::time::Instant;

use crate::config::{ConfigError, TimeoutConfig, UpstreamConfig};

/// A fully mapped request, ready to send upstream.
#[derive(Debug)]
pub struct UpstreamRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    /// The caller's body, streamed through unaltered.
    pub body: Body,
}

/// Response headers received in time; the body is still unread.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub response: Response<Incoming>,
    /// End of the end-to-end budget; the body must be relayed before it.
    pub deadline: Instant,
}

/// Transport-level failure reaching the upstream.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("request timed out after {timeout:?}: {detail}")]
    Timeout { timeout: Duration, detail: String },

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Transport(String),
}

impl UpstreamError {
    fn classify(err: hyper_util::client::legacy::Error) -> Self {
        let detail = error_chain(&err);
        if err.is_connect() {
            UpstreamError::Connect(detail)
        } else {
            UpstreamError::Transport(detail)
        }
    }

    /// Label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Timeout { .. } => "timeout",
            UpstreamError::Connect(_) => "connect",
            UpstreamError::Transport(_) => "transport",
        }
    }
}

/// Render an error with its full `source()` chain.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_str = cause.to_string();
        if !rendered.contains(&cause_str) {
            rendered.push_str(": ");
            rendered.push_str(&cause_str);
        }
        source = cause.source();
    }
    rendered
}

/// Pooled client for the single upstream.
#[derive(Clone)]
pub struct UpstreamClient {
    inner: Client<HttpsConnector<HttpConnector>, Body>,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(timeouts: &TimeoutConfig, upstream: &UpstreamConfig) -> Result<Self, ConfigError> {
        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));

        let tls = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(upstream.accept_invalid_certs)
            .build()
            .map_err(|e| ConfigError::Client(error_chain(&e)))?;
        let https = HttpsConnector::from((http, tokio_native_tls::TlsConnector::from(tls)));

        if upstream.accept_invalid_certs {
            tracing::warn!("Upstream TLS certificate verification is disabled");
        }

        Ok(Self {
            inner: Client::builder(TokioExecutor::new()).build(https),
            timeout: Duration::from_secs(timeouts.request_secs),
        })
    }

    /// The end-to-end deadline applied to every call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send the request. The returned body has not been read yet; the
    /// deadline keeps running while it is streamed.
    pub async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        let mut req = Request::new(request.body);
        *req.method_mut() = request.method;
        *req.uri_mut() = request.uri;
        *req.headers_mut() = request.headers;

        let deadline = Instant::now() + self.timeout;
        match tokio::time::timeout_at(deadline, self.inner.request(req)).await {
            Ok(Ok(response)) => Ok(UpstreamResponse { response, deadline }),
            Ok(Err(e)) => Err(UpstreamError::classify(e)),
            Err(_) => Err(UpstreamError::Timeout {
                timeout: self.timeout,
                detail: "no response headers received".to_string(),
            }),
        }
    }
}
