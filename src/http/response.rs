//! Upstream response relay.
//!
//! # Responsibilities
//! - Copy the upstream status verbatim
//! - Strip hop-by-hop headers before they reach the caller
//! - Stream the body through, counting bytes
//! - Enforce the remaining end-to-end deadline while streaming
//! - Write the audit record when the body ends, fails, or is dropped
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - A dropped body (caller gone) releases the upstream stream immediately
//! - Bodies the caller never receives (HEAD, 204, 304) count as complete at zero bytes

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::{Body, HttpBody};
use axum::http::{Method, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use futures_util::stream::{BoxStream, Stream, StreamExt};
use tokio::time::{Instant, Sleep};

use crate::observability::{AuditRecord, Outcome};
use crate::security::relay_response_headers;
use crate::upstream::{error_chain, UpstreamResponse};

/// Turn an upstream response into the caller's response.
pub fn relay(upstream: UpstreamResponse, audit: AuditRecord) -> Response {
    let (parts, incoming) = upstream.response.into_parts();
    let expected = if has_no_body(audit.method(), parts.status) {
        Some(0)
    } else {
        incoming.size_hint().exact()
    };

    let body = RelayBody::new(
        Body::new(incoming).into_data_stream(),
        parts.status,
        expected,
        upstream.deadline,
        audit,
    );

    let mut response = Response::new(Body::from_stream(body));
    *response.status_mut() = parts.status;
    *response.headers_mut() = relay_response_headers(parts.headers);
    response
}

fn has_no_body(method: &Method, status: StatusCode) -> bool {
    *method == Method::HEAD
        || status.is_informational()
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED
}

/// Pass-through body stream that counts bytes and audits exactly once.
pub struct RelayBody {
    inner: BoxStream<'static, Result<Bytes, axum::Error>>,
    status: StatusCode,
    expected: Option<u64>,
    deadline: Pin<Box<Sleep>>,
    expired: bool,
    bytes: u64,
    audit: Option<AuditRecord>,
}

impl RelayBody {
    pub fn new<S>(
        inner: S,
        status: StatusCode,
        expected: Option<u64>,
        deadline: Instant,
        audit: AuditRecord,
    ) -> Self
    where
        S: Stream<Item = Result<Bytes, axum::Error>> + Send + 'static,
    {
        Self {
            inner: inner.boxed(),
            status,
            expected,
            deadline: Box::pin(tokio::time::sleep_until(deadline)),
            expired: false,
            bytes: 0,
            audit: Some(audit),
        }
    }

    /// Bytes handed to the caller so far.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    fn finish(&mut self, outcome: Outcome) {
        if let Some(audit) = self.audit.take() {
            audit.finish(self.status, self.bytes, outcome);
        }
    }

    fn reached_expected_length(&self) -> bool {
        self.expected == Some(self.bytes)
    }

    fn fail(&mut self, error: axum::Error) -> Poll<Option<Result<Bytes, axum::Error>>> {
        tracing::warn!(
            request_id = self
                .audit
                .as_ref()
                .map(AuditRecord::request_id)
                .unwrap_or("unknown"),
            bytes = self.bytes,
            error = %error_chain(&error),
            "Upstream body stream failed"
        );
        self.finish(Outcome::UpstreamStreamError);
        Poll::Ready(Some(Err(error)))
    }
}

impl Stream for RelayBody {
    type Item = Result<Bytes, axum::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.expired {
            return Poll::Ready(None);
        }

        match self.inner.poll_next_unpin(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                self.bytes += chunk.len() as u64;
                if self.reached_expected_length() {
                    self.finish(Outcome::Complete);
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => self.fail(e),
            Poll::Ready(None) => {
                self.finish(Outcome::Complete);
                Poll::Ready(None)
            }
            Poll::Pending => match self.deadline.as_mut().poll(cx) {
                Poll::Ready(()) => {
                    self.expired = true;
                    self.fail(axum::Error::new(io::Error::new(
                        io::ErrorKind::TimedOut,
                        "upstream body not finished before the request deadline",
                    )))
                }
                Poll::Pending => Poll::Pending,
            },
        }
    }
}

impl Drop for RelayBody {
    fn drop(&mut self) {
        // hyper stops polling once a length-delimited body is fully written.
        if self.reached_expected_length() {
            self.finish(Outcome::Complete);
        } else {
            self.finish(Outcome::ClientDisconnected);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use std::time::Duration;

    type Chunk = Result<Bytes, axum::Error>;

    fn record() -> AuditRecord {
        AuditRecord::start("test", Method::GET, "/restconf/data")
    }

    fn later() -> Instant {
        Instant::now() + Duration::from_secs(30)
    }

    fn chunks(parts: &[&'static str]) -> impl Stream<Item = Chunk> + Send + 'static {
        let items: Vec<Chunk> = parts
            .iter()
            .map(|p| Ok(Bytes::from_static(p.as_bytes())))
            .collect();
        stream::iter(items)
    }

    #[tokio::test]
    async fn test_body_passes_through_in_order() {
        let chunks = chunks(&["{\"a\"", ":1}"]);
        let mut body = RelayBody::new(chunks, StatusCode::OK, None, later(), record());

        let mut collected = Vec::new();
        while let Some(chunk) = body.next().await {
            collected.extend_from_slice(&chunk.unwrap());
        }

        assert_eq!(collected, b"{\"a\":1}");
        assert_eq!(body.bytes(), 7);
        assert!(body.audit.is_none(), "audit written at end of stream");
    }

    #[tokio::test]
    async fn test_audit_written_when_expected_length_reached() {
        let chunks = chunks(&["abc", "de"]);
        let mut body = RelayBody::new(chunks, StatusCode::OK, Some(5), later(), record());
        body.next().await;
        assert!(body.audit.is_some());
        body.next().await;
        assert!(body.audit.is_none());
    }

    #[tokio::test]
    async fn test_drop_before_end_counts_partial_bytes() {
        let chunks = chunks(&["abc", "def"]);
        let mut body = RelayBody::new(chunks, StatusCode::OK, None, later(), record());
        body.next().await;
        assert_eq!(body.bytes(), 3);
        assert!(body.audit.is_some());
        drop(body);
    }

    #[tokio::test]
    async fn test_stalled_body_fails_at_deadline() {
        let stalled = stream::pending::<Chunk>();
        let deadline = Instant::now() + Duration::from_millis(20);
        let mut body = RelayBody::new(stalled, StatusCode::OK, None, deadline, record());

        assert!(body.next().await.unwrap().is_err());
        assert!(body.audit.is_none());
        assert!(body.next().await.is_none());
    }

    #[test]
    fn test_bodyless_responses() {
        assert!(has_no_body(&Method::HEAD, StatusCode::OK));
        assert!(has_no_body(&Method::GET, StatusCode::NO_CONTENT));
        assert!(has_no_body(&Method::GET, StatusCode::NOT_MODIFIED));
        assert!(!has_no_body(&Method::GET, StatusCode::OK));
        assert!(!has_no_body(&Method::POST, StatusCode::CREATED));
    }
}
