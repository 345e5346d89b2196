//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Proxy handler / relay produce:
//!     → audit.rs (one record per proxied request)
//!     → metrics.rs (counters, histograms)
//!     → logging.rs (subscriber: pretty or JSON lines)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event
//! - Request ID flows from the request-id layer into the audit record
//! - Secret header values never reach a log line (see `security::redact`)

pub mod audit;
pub mod logging;
pub mod metrics;

pub use audit::{AuditRecord, Outcome, AUDIT_TARGET};
pub use logging::init_logging;
