//! Upstream subsystem.
//!
//! # Data Flow
//! ```text
//! UpstreamRequest (uri, filtered headers, streamed body)
//!     → client.rs (pooled hyper client, end-to-end deadline)
//!     → Ok: UpstreamResponse (status + headers + open body stream + deadline)
//!     → Err: UpstreamError (502 to the caller, never retried)
//! ```

pub mod client;

pub use client::{error_chain, UpstreamClient, UpstreamError, UpstreamRequest, UpstreamResponse};
