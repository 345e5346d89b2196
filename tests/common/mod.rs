//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    Router,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use restconf_proxy::{HttpServer, ProxyConfig, Shutdown};

pub const INTERFACES_JSON: &str =
    r#"{"ietf-interfaces:interfaces":{"interface":[{"name":"eth0"}]}}"#;

/// One request as seen by a mock upstream.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Requests received by a recording backend, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Recorded>>>);

impl Recorder {
    pub fn requests(&self) -> Vec<Recorded> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn last(&self) -> Recorded {
        self.requests().pop().expect("backend received no request")
    }
}

async fn record(
    State(recorder): State<Recorder>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let status = if uri.path().ends_with("/missing") {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    recorder.0.lock().unwrap().push(Recorded {
        method,
        uri,
        headers,
        body,
    });
    (
        status,
        [
            ("content-type", "application/yang-data+json"),
            ("x-upstream", "mock"),
        ],
        INTERFACES_JSON,
    )
}

/// Start a RESTCONF-like backend that records every request it receives.
pub async fn start_recording_backend() -> (SocketAddr, Recorder) {
    let recorder = Recorder::default();
    let app = Router::new().fallback(record).with_state(recorder.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, recorder)
}

async fn read_request_head(socket: &mut tokio::net::TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

/// Start a backend that writes `head` then `body` verbatim and hangs up.
async fn start_raw_backend(head: String, body: Vec<u8>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let head = head.clone();
            let body = body.clone();
            tokio::spawn(async move {
                read_request_head(&mut socket).await;
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(&body).await;
                let _ = socket.flush().await;
                tokio::time::sleep(Duration::from_millis(10)).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Backend answering every request with a chunked body plus hop-by-hop headers.
pub async fn start_chunked_backend(chunks: &[&str]) -> SocketAddr {
    let head = "HTTP/1.1 200 OK\r\n\
                Content-Type: application/yang-data+json\r\n\
                Transfer-Encoding: chunked\r\n\
                Keep-Alive: timeout=5\r\n\
                Connection: close\r\n\r\n"
        .to_string();

    let mut body = String::new();
    for chunk in chunks {
        body.push_str(&format!("{:x}\r\n{}\r\n", chunk.len(), chunk));
    }
    body.push_str("0\r\n\r\n");

    start_raw_backend(head, body.into_bytes()).await
}

/// Backend that promises `declared` bytes but sends `sent` and hangs up.
pub async fn start_truncating_backend(declared: usize, sent: &str) -> SocketAddr {
    let head = format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: application/yang-data+json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n",
        declared
    );
    start_raw_backend(head, sent.as_bytes().to_vec()).await
}

/// Backend that accepts and reads but never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                read_request_head(&mut socket).await;
                tokio::time::sleep(Duration::from_secs(30)).await;
            });
        }
    });

    addr
}

/// An address nothing listens on.
pub fn refused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Proxy configuration pointing at `<upstream>/restconf`.
pub fn proxy_config(upstream: SocketAddr) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.upstream.base_url = format!("http://{}/restconf", upstream);
    config
}

/// A running proxy. Dropping the handle stops it.
pub struct ProxyHandle {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub task: tokio::task::JoinHandle<std::io::Result<()>>,
}

impl ProxyHandle {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start the proxy on an ephemeral port.
pub async fn spawn_proxy(config: ProxyConfig) -> ProxyHandle {
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let task = tokio::spawn(server.run(listener, receiver));

    ProxyHandle {
        addr,
        shutdown,
        task,
    }
}

/// HTTP client that ignores proxy environment variables.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
