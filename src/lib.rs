//! RESTCONF reverse proxy library.
//!
//! Forwards every request under a mount prefix to a single RESTCONF
//! upstream, rewriting the path, filtering headers, applying the
//! configured credential policy, and streaming the response back.

// Core subsystems
pub mod config;
pub mod http;
pub mod routing;
pub mod upstream;

// Cross-cutting concerns
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
