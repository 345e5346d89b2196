//! Header policy for both proxy directions.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers from the outbound request and the relayed response
//! - Never copy `Host` to the upstream request
//! - Inject a default `Accept` when the caller sent none
//!
//! # Design Decisions
//! - `HeaderMap` is the ordered multimap: repeated names keep every value in order
//! - Names compare case-insensitively (`HeaderName` is always lowercase)
//! - Only the fixed hop-by-hop set is removed; everything else passes unmodified

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

/// Headers meaningful only between directly connected peers.
///
/// `trailers` is the spelling from RFC 2616 §13.5.1, `trailer` the real header.
pub const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS.contains(&name.as_str())
}

/// Remove every value of every hop-by-hop header in place.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(*name);
    }
}

/// Headers for the upstream request, derived from the caller's headers.
///
/// Credentials are not decided here; see [`crate::security::CredentialPolicy`].
pub fn outbound_request_headers(inbound: &HeaderMap, default_accept: &HeaderValue) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len() + 1);
    for (name, value) in inbound {
        if *name == header::HOST || is_hop_by_hop(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    if !headers.contains_key(header::ACCEPT) {
        headers.insert(header::ACCEPT, default_accept.clone());
    }
    headers
}

/// Headers relayed to the caller, derived from the upstream response.
pub fn relay_response_headers(mut upstream: HeaderMap) -> HeaderMap {
    strip_hop_by_hop(&mut upstream);
    upstream
}
