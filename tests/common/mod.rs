//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use edge_rewrite::config::EdgeConfig;
use edge_rewrite::{EdgeServer, Shutdown};

/// Request line target and Host header seen by the mock origin.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub target: String,
    pub host: Option<String>,
    pub request_id: Option<String>,
}

/// Start a mock object-storage origin on an ephemeral port.
///
/// Every request is answered with 200 and its request target as the body,
/// and reported on the returned channel.
pub async fn start_mock_origin() -> (SocketAddr, mpsc::UnboundedReceiver<SeenRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    let n = match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => n,
                    };
                    buf.extend_from_slice(&chunk[..n]);
                    if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }

                let head = String::from_utf8_lossy(&buf).to_string();
                let mut lines = head.split("\r\n");
                let target = lines
                    .next()
                    .and_then(|line| line.split(' ').nth(1))
                    .unwrap_or_default()
                    .to_string();
                let header = |name: &str| {
                    head.split("\r\n").skip(1).find_map(|line| {
                        let (k, v) = line.split_once(':')?;
                        k.eq_ignore_ascii_case(name).then(|| v.trim().to_string())
                    })
                };
                let _ = tx.send(SeenRequest {
                    target: target.clone(),
                    host: header("host"),
                    request_id: header("x-request-id"),
                });

                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    target.len(),
                    target
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, rx)
}

/// Edge config pointed at `origin`, all listeners on ephemeral ports.
pub fn edge_config(origin: SocketAddr) -> EdgeConfig {
    let mut config = EdgeConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.admin.bind_address = "127.0.0.1:0".into();
    config.origin.base_url = format!("http://{origin}");
    config
}

/// A running edge server and the handles needed to drive it.
#[allow(dead_code)]
pub struct RunningEdge {
    pub addr: SocketAddr,
    pub admin_addr: SocketAddr,
    pub config_tx: mpsc::UnboundedSender<EdgeConfig>,
    pub shutdown: Shutdown,
}

pub async fn start_edge(config: EdgeConfig) -> RunningEdge {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let admin_listener = TcpListener::bind(&config.admin.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let admin_addr = admin_listener.local_addr().unwrap();

    let (config_tx, config_rx) = mpsc::unbounded_channel();
    let shutdown = Shutdown::new();
    let server = EdgeServer::new(config).unwrap();
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server
            .run(listener, Some(admin_listener), config_rx, server_shutdown)
            .await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    RunningEdge {
        addr,
        admin_addr,
        config_tx,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
