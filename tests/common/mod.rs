//! Shared utilities for selection integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Handle to a mock service node answering health checks.
pub struct MockNode {
    pub addr: SocketAddr,
    status: Arc<AtomicU16>,
    block_difference: Arc<AtomicU64>,
    hits: Arc<AtomicU32>,
}

impl MockNode {
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of health checks answered so far.
    #[allow(dead_code)]
    pub fn hit_count(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }

    #[allow(dead_code)]
    pub fn set_status(&self, status: u16) {
        self.status.store(status, Ordering::SeqCst);
    }

    #[allow(dead_code)]
    pub fn set_block_difference(&self, block_difference: u64) {
        self.block_difference
            .store(block_difference, Ordering::SeqCst);
    }
}

/// Start a mock node with the given health check status and body fields.
pub async fn start_mock_node(status: u16, version: &str, block_difference: u64) -> MockNode {
    start_node(status, version, block_difference, 0, None).await
}

/// Same as `start_mock_node` but delays every response.
#[allow(dead_code)]
pub async fn start_slow_node(
    status: u16,
    version: &str,
    block_difference: u64,
    delay_ms: u64,
) -> MockNode {
    start_node(status, version, block_difference, delay_ms, None).await
}

/// Start a mock node that replies with a fixed raw body instead of a
/// well-formed health check document.
#[allow(dead_code)]
pub async fn start_raw_node(status: u16, raw_body: &'static str) -> MockNode {
    start_node(status, "0.0.0", 0, 0, Some(raw_body)).await
}

/// Start a node that accepts connections but never responds, so probes
/// against it can only end in a timeout.
#[allow(dead_code)]
pub async fn start_black_hole_node() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = [0u8; 1024];
                        loop {
                            match socket.read(&mut buf).await {
                                Ok(0) | Err(_) => break,
                                Ok(_) => {}
                            }
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// An endpoint nothing is listening on; connections get refused.
#[allow(dead_code)]
pub async fn unreachable_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

async fn start_node(
    status: u16,
    version: &str,
    block_difference: u64,
    delay_ms: u64,
    raw_body: Option<&'static str>,
) -> MockNode {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let status = Arc::new(AtomicU16::new(status));
    let block_difference = Arc::new(AtomicU64::new(block_difference));
    let hits = Arc::new(AtomicU32::new(0));
    let version = version.to_string();

    let node = MockNode {
        addr,
        status: status.clone(),
        block_difference: block_difference.clone(),
        hits: hits.clone(),
    };

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let status = status.clone();
                    let block_difference = block_difference.clone();
                    let hits = hits.clone();
                    let version = version.clone();
                    tokio::spawn(async move {
                        let mut buf = [0u8; 1024];
                        let _ = socket.read(&mut buf).await;

                        if delay_ms > 0 {
                            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        }

                        hits.fetch_add(1, Ordering::SeqCst);

                        let status = status.load(Ordering::SeqCst);
                        let body = match raw_body {
                            Some(raw) => raw.to_string(),
                            None => format!(
                                r#"{{"service":"discovery-provider","version":"{}","block_difference":{}}}"#,
                                version,
                                block_difference.load(Ordering::SeqCst),
                            ),
                        };
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    node
}
