//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound headers
//!     → headers.rs (drop Host + hop-by-hop, default Accept)
//!     → credentials.rs (forward / bearer / basic / strip Authorization)
//!     → upstream request
//!
//! Upstream response headers
//!     → headers.rs (drop hop-by-hop)
//!     → caller
//!
//! Diagnostics
//!     → redact.rs (secret header values replaced before logging)
//! ```
//!
//! # Design Decisions
//! - Default-deny: inbound credentials are stripped unless forwarding is configured
//! - Injected credential values are flagged sensitive
//! - All policy functions are pure over `HeaderMap`

pub mod credentials;
pub mod headers;
pub mod redact;

pub use credentials::CredentialPolicy;
pub use headers::{
    outbound_request_headers, relay_response_headers, strip_hop_by_hop, HOP_BY_HOP_HEADERS,
};
pub use redact::RedactedHeaders;
