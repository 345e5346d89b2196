//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, raw query)
//!     → matcher.rs (is the path under the mount prefix?)
//!     → mapper.rs (strip prefix, join with upstream base path)
//!     → Return: upstream URL, or NoMatch (404) / MappingError (500)
//! ```
//!
//! # Design Decisions
//! - Prefix and upstream base compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - A single upstream; there is no route table

pub mod mapper;
pub mod matcher;

pub use mapper::{join_paths, MappingError, RequestMapper, UpstreamBase};
pub use matcher::{Matcher, MountPrefix, HEALTH_PATH};
