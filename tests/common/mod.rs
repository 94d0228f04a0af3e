//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use api_gateway::config::RouteRule;
use api_gateway::{GatewayConfig, GatewayServer, Shutdown};
use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

/// Start an upstream that echoes what it received as JSON.
pub async fn start_echo_backend(name: &'static str) -> SocketAddr {
    let app = Router::new().fallback(move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| async move {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Json(json!({
            "backend": name,
            "method": method.as_str(),
            "path": uri.path(),
            "query": uri.query(),
            "host": header("host"),
            "authorization": header("authorization"),
            "x_request_id": header("x-request-id"),
            "x_forwarded_for": header("x-forwarded-for"),
            "x_forwarded_host": header("x-forwarded-host"),
            "body": String::from_utf8_lossy(&body),
        }))
    });
    serve(app).await
}

/// Start an upstream that answers every request after `delay`.
pub async fn start_slow_backend(delay: Duration) -> SocketAddr {
    let app = Router::new().fallback(move || async move {
        tokio::time::sleep(delay).await;
        (StatusCode::OK, "late")
    });
    serve(app).await
}

/// Start an upstream that answers with a fixed status and `detail` body.
pub async fn start_failing_backend(status: StatusCode, detail: &'static str) -> SocketAddr {
    let app = Router::new().fallback(move || async move { (status, Json(json!({ "detail": detail }))) });
    serve(app).await
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Read until the end of the request head.
async fn read_head(socket: &mut TcpStream) -> bool {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return false,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    true
}

/// Start a raw TCP upstream that answers every request with `reply` and closes.
pub async fn start_raw_backend(reply: &'static [u8]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                if read_head(&mut socket).await {
                    let _ = socket.write_all(reply).await;
                    let _ = socket.shutdown().await;
                }
            });
        }
    });
    addr
}

/// Start an upstream that announces `length` bytes, then sends one every `interval`.
pub async fn start_trickling_backend(length: usize, interval: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                if !read_head(&mut socket).await {
                    return;
                }
                let head = format!("HTTP/1.1 200 OK\r\ncontent-length: {length}\r\n\r\n");
                if socket.write_all(head.as_bytes()).await.is_err() {
                    return;
                }
                for _ in 0..length {
                    tokio::time::sleep(interval).await;
                    if socket.write_all(b"x").await.is_err() {
                        return;
                    }
                }
            });
        }
    });
    addr
}

/// Start an upstream that never answers.
///
/// The first receiver fires when a request head arrives, the second when
/// the gateway closes that connection.
pub async fn start_hanging_backend() -> (SocketAddr, oneshot::Receiver<()>, oneshot::Receiver<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (arrived_tx, arrived_rx) = oneshot::channel();
    let (closed_tx, closed_rx) = oneshot::channel();
    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        if !read_head(&mut socket).await {
            return;
        }
        let _ = arrived_tx.send(());
        let mut buf = [0u8; 256];
        loop {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
        }
        let _ = closed_tx.send(());
    });
    (addr, arrived_rx, closed_rx)
}

/// An address nothing listens on.
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Base config with short timeouts and the given routes and bundle.
pub fn config(routes: Vec<RouteRule>, static_root: &Path) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listen_host = "127.0.0.1".into();
    config.request_timeout_ms = 2_000;
    config.connect_timeout_ms = 500;
    config.static_root = static_root.to_path_buf();
    config.upstream_map = routes;
    config
}

/// A running gateway.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub client: reqwest::Client,
}

impl TestGateway {
    pub async fn start(config: GatewayConfig) -> Self {
        let server = GatewayServer::new(config).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown = Shutdown::new();
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });

        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        Self { addr, shutdown, client }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get_json(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).send().await.expect("gateway unreachable");
        let status = StatusCode::from_u16(res.status().as_u16()).unwrap();
        (status, res.json().await.unwrap())
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// A bundle directory with an index document and one script.
pub fn bundle() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<!doctype html><div id=root></div>").unwrap();
    std::fs::create_dir_all(dir.path().join("static/js")).unwrap();
    std::fs::write(dir.path().join("static/js/main.js"), "render()").unwrap();
    dir
}
