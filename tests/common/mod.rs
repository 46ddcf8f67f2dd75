//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use explorer_server::config::ExplorerConfig;
use explorer_server::lifecycle::Shutdown;
use explorer_server::net::ConnectionManager;
use explorer_server::security::AccessControlList;
use explorer_server::{ExplorerServer, SnapshotBackend};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

pub struct TestServer {
    pub addr: SocketAddr,
    pub manager: Arc<ConnectionManager>,
    pub shutdown: Arc<Shutdown>,
    pub task: JoinHandle<()>,
}

impl TestServer {
    #[allow(dead_code)]
    pub fn url(&self, target: &str) -> String {
        format!("http://{}{}", self.addr, target)
    }

    #[allow(dead_code)]
    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = tokio::time::timeout(Duration::from_secs(5), self.task).await;
    }
}

/// Snapshot with a status document holding one amount envelope.
pub fn sample_snapshot() -> SnapshotBackend {
    let root = json!({
        "status": {
            "height": 42,
            "fee": {"type": "amount", "value": "1500"}
        },
        "blocks": {
            "1": {"height": 1},
            "2": {"height": 2}
        }
    });
    match root {
        Value::Object(map) => SnapshotBackend::new(map),
        _ => unreachable!(),
    }
}

/// Start a server on an ephemeral loopback port and wait until it listens.
pub async fn spawn_server(mut config: ExplorerConfig) -> TestServer {
    config.listener.bind_address = "127.0.0.1:0".into();
    spawn_server_on(config).await
}

/// Start a server on `config`'s bind address as given.
pub async fn spawn_server_on(config: ExplorerConfig) -> TestServer {
    let server = ExplorerServer::new(
        &config,
        Arc::new(sample_snapshot()),
        Arc::new(AccessControlList::disabled()),
    )
    .unwrap();
    let manager = Arc::clone(server.manager());
    let mut bound = server.bound_addr();

    let shutdown = Arc::new(Shutdown::new());
    let run_shutdown = Arc::clone(&shutdown);
    let task = tokio::spawn(async move { server.run(&run_shutdown).await });

    let addr = tokio::time::timeout(Duration::from_secs(5), bound.wait_for(|a| a.is_some()))
        .await
        .expect("server did not bind in time")
        .unwrap()
        .unwrap();

    TestServer {
        addr,
        manager,
        shutdown,
        task,
    }
}

#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// Write a bare GET for `target` on an open stream.
#[allow(dead_code)]
pub async fn send_get(stream: &mut TcpStream, target: &str) {
    let request = format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", target);
    stream.write_all(request.as_bytes()).await.unwrap();
}

/// Read one response (head and `Content-Length` body) off a stream.
#[allow(dead_code)]
pub async fn read_response(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        if let Some(head_end) = find(&buf, b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
            let len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= head_end + 4 + len {
                return String::from_utf8_lossy(&buf[..head_end + 4 + len]).into_owned();
            }
        }
        let n = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut chunk))
            .await
            .expect("timed out reading response")
            .unwrap();
        assert!(n > 0, "connection closed before a full response");
        buf.extend_from_slice(&chunk[..n]);
    }
}

/// True once the peer has closed the stream (EOF or reset).
#[allow(dead_code)]
pub async fn is_closed(stream: &mut TcpStream) -> bool {
    let mut chunk = [0u8; 256];
    match tokio::time::timeout(Duration::from_secs(5), stream.read(&mut chunk)).await {
        Ok(Ok(0)) | Ok(Err(_)) => true,
        Ok(Ok(_)) | Err(_) => false,
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Collect everything the peer sends until it closes the stream.
#[allow(dead_code)]
pub async fn read_until_closed(stream: &mut TcpStream) -> Vec<u8> {
    let mut seen = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match tokio::time::timeout(Duration::from_secs(5), stream.read(&mut chunk)).await {
            Ok(Ok(0)) | Ok(Err(_)) => return seen,
            Ok(Ok(n)) => seen.extend_from_slice(&chunk[..n]),
            Err(_) => panic!("peer kept the connection open"),
        }
    }
}
