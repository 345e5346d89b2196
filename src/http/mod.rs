//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, dispatch)
//!     → routing (mount prefix → upstream URL)
//!     → security (header policy, credentials)
//!     → upstream (send)
//!     → response.rs (relay status, headers, streamed body)
//!     → Send to client
//! ```
//!
//! Failures before the first upstream byte become `error.rs` responses.

pub mod error;
pub mod request;
pub mod response;
pub mod server;

pub use error::ProxyError;
pub use request::{request_id, MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
