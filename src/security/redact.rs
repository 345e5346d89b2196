//! Redaction of secret header values in diagnostic output.

use std::fmt;

use axum::http::{HeaderMap, HeaderName};

/// Headers whose values are never written to logs.
pub const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "proxy-authorization",
    "cookie",
    "set-cookie",
];

pub const REDACTED: &str = "REDACTED";

pub fn is_sensitive(name: &HeaderName) -> bool {
    SENSITIVE_HEADERS.contains(&name.as_str())
}

/// Displays a header map as `name: value` pairs with secrets replaced.
pub struct RedactedHeaders<'a>(pub &'a HeaderMap);

impl fmt::Display for RedactedHeaders<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if is_sensitive(name) || value.is_sensitive() {
                write!(f, "{}: {}", name, REDACTED)?;
            } else {
                write!(f, "{}: {}", name, value.to_str().unwrap_or("<non-ascii>"))?;
            }
        }
        Ok(())
    }
}
