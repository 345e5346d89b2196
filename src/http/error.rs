//! Per-request proxy errors and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::observability::Outcome;
use crate::routing::MappingError;
use crate::upstream::UpstreamError;

/// Errors the proxy handler can produce before any upstream byte is relayed.
///
/// A dot segment in the path is the caller's fault (400); any other mapping
/// failure is ours (500); transport failures are the upstream's (502).
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("failed to create upstream request: {0}")]
    Mapping(#[from] MappingError),

    #[error("upstream error: {0}")]
    UpstreamUnavailable(#[from] UpstreamError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Mapping(MappingError::DotSegment(_)) => StatusCode::BAD_REQUEST,
            ProxyError::Mapping(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            ProxyError::Mapping(_) => Outcome::MappingError,
            ProxyError::UpstreamUnavailable(_) => Outcome::UpstreamUnavailable,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let mapping = ProxyError::from(MappingError::OutsidePrefix("/x".into()));
        assert_eq!(mapping.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(mapping.outcome(), Outcome::MappingError);

        let dot = ProxyError::from(MappingError::DotSegment("/restconf/..".into()));
        assert_eq!(dot.status(), StatusCode::BAD_REQUEST);
        assert_eq!(dot.outcome(), Outcome::MappingError);

        let upstream = ProxyError::from(UpstreamError::Connect(
            "tcp connect error: Connection refused".into(),
        ));
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            upstream.to_string(),
            "upstream error: connection failed: tcp connect error: Connection refused"
        );
        assert_eq!(upstream.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
