//! HTTP server setup and the proxy handler.
//!
//! # Responsibilities
//! - Create the Axum Router (health endpoint + mount-prefix dispatch)
//! - Wire up middleware (request ID, tracing)
//! - Map inbound requests to upstream requests
//! - Apply header and credential policy
//! - Forward to the upstream and relay the response
//! - Serve until the shutdown signal fires

use std::sync::Arc;

use axum::{
    body::{Body, HttpBody},
    extract::State,
    http::{request::Parts, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{validate_config, ConfigError, ProxyConfig, ValidationError};
use crate::health;
use crate::http::error::ProxyError;
use crate::http::request::{request_id, MakeRequestUuid};
use crate::http::response::relay;
use crate::observability::{metrics, AuditRecord};
use crate::routing::{Matcher, MountPrefix, RequestMapper, UpstreamBase, HEALTH_PATH};
use crate::security::{outbound_request_headers, CredentialPolicy, RedactedHeaders};
use crate::upstream::{UpstreamClient, UpstreamError, UpstreamRequest, UpstreamResponse};

/// Application state injected into handlers. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub mapper: Arc<RequestMapper>,
    pub credentials: Arc<CredentialPolicy>,
    pub client: UpstreamClient,
    pub default_accept: HeaderValue,
}

impl AppState {
    /// Build the per-process state from a validated configuration.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, ConfigError> {
        let invalid = |e| ConfigError::Validation(vec![e]);

        let base = UpstreamBase::parse(&config.upstream.base_url).map_err(invalid)?;
        let prefix = MountPrefix::new(&config.listener.mount_prefix).map_err(invalid)?;
        let credentials = CredentialPolicy::from_config(&config.auth).map_err(invalid)?;
        let default_accept =
            HeaderValue::from_str(&config.upstream.default_accept).map_err(|_| {
                invalid(ValidationError::InvalidDefaultAccept(
                    config.upstream.default_accept.clone(),
                ))
            })?;
        let client = UpstreamClient::new(&config.timeouts, &config.upstream)?;

        Ok(Self {
            mapper: Arc::new(RequestMapper::new(base, prefix)),
            credentials: Arc::new(credentials),
            client,
            default_accept,
        })
    }
}

/// HTTP server for the RESTCONF proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ConfigError> {
        validate_config(&config)?;
        let state = AppState::from_config(&config)?;
        let router = Self::build_router(state.clone());
        Ok(Self {
            router,
            config,
            state,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route(HEALTH_PATH, get(health::liveness))
            .fallback(dispatch)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires. In-flight requests are drained.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.state.mapper.base(),
            mount_prefix = %self.state.mapper.prefix(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router, for serving it elsewhere or driving it in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Everything that is not `/health`: proxy if under the mount prefix, else 404.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    if !state.mapper.prefix().matches(&request) {
        tracing::debug!(path = %request.uri().path(), "No route matched");
        return (StatusCode::NOT_FOUND, "not found").into_response();
    }
    proxy_handler(&state, request).await
}

/// Main proxy handler: map, filter, inject, forward, relay.
pub async fn proxy_handler(state: &AppState, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let audit = AuditRecord::start(
        request_id(&parts.headers),
        parts.method.clone(),
        parts.uri.path(),
    );

    match forward(state, parts, body, audit.request_id()).await {
        Ok(upstream) => relay(upstream, audit),
        Err(err) => {
            let status = err.status();
            let message = err.to_string();
            tracing::error!(
                request_id = %audit.request_id(),
                status = status.as_u16(),
                error = %message,
                "Proxy request failed"
            );
            audit.finish(status, message.len() as u64, err.outcome());
            (status, message).into_response()
        }
    }
}

async fn forward(
    state: &AppState,
    parts: Parts,
    body: Body,
    request_id: &str,
) -> Result<UpstreamResponse, ProxyError> {
    let uri = state.mapper.map(&parts.uri)?;

    let mut headers = outbound_request_headers(&parts.headers, &state.default_accept);
    state.credentials.apply(&mut headers);

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        uri = %uri,
        headers = %RedactedHeaders(&headers),
        body_length = ?body.size_hint().exact(),
        "--> upstream request"
    );

    state
        .client
        .send(UpstreamRequest {
            method: parts.method,
            uri,
            headers,
            body,
        })
        .await
        .map_err(|e: UpstreamError| {
            metrics::record_upstream_failure(e.kind());
            ProxyError::from(e)
        })
}
