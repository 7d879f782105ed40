//! In-memory transport and IPC client for daemon tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;

use mw_core::config::WardenConfig;
use mw_core::ipc::{IpcRequest, IpcResponse};
use mw_core::traits::{Connector, RemoteSession};
use mw_core::{CommandOutput, ConnectTarget, ConnectionError};
use mw_daemon::DaemonState;
use mw_remote::NodeManager;

/// Base port for test servers - each test gets a unique offset
static PORT_COUNTER: AtomicU16 = AtomicU16::new(0);

/// Get a unique port for this test
pub fn get_test_port() -> u16 {
    let offset = PORT_COUNTER.fetch_add(1, Ordering::SeqCst);
    39400 + offset
}

/// Replies by substring; unmatched commands succeed with no output
#[derive(Clone, Default)]
pub struct FakeServer {
    replies: Arc<Mutex<Vec<(String, String, u32)>>>,
    executed: Arc<Mutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
}

impl FakeServer {
    pub fn reply(&self, pattern: &str, stdout: &str, status: u32) {
        self.replies
            .lock()
            .unwrap()
            .push((pattern.to_string(), stdout.to_string(), status));
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

pub struct FakeConnector {
    server: FakeServer,
}

pub struct FakeSession {
    server: FakeServer,
}

#[async_trait]
impl Connector for FakeConnector {
    type Session = FakeSession;

    async fn connect(
        &self,
        target: &ConnectTarget,
        _password: &str,
    ) -> Result<FakeSession, ConnectionError> {
        if target.host == "unreachable.example" {
            return Err(ConnectionError::Dial("no route to host".to_string()));
        }
        Ok(FakeSession {
            server: self.server.clone(),
        })
    }
}

#[async_trait]
impl RemoteSession for FakeSession {
    async fn exec(&self, command: &str) -> Result<CommandOutput, ConnectionError> {
        self.server.executed.lock().unwrap().push(command.to_string());
        let replies = self.server.replies.lock().unwrap();
        let reply = replies
            .iter()
            .rev()
            .find(|(pattern, _, _)| command.contains(pattern.as_str()));
        Ok(match reply {
            Some((_, stdout, status)) => CommandOutput {
                stdout: stdout.clone(),
                stderr: String::new(),
                exit_status: Some(*status),
                exit_signal: None,
            },
            None => CommandOutput {
                exit_status: Some(0),
                ..Default::default()
            },
        })
    }

    async fn close(&self) -> Result<(), ConnectionError> {
        self.server.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Create test state around a fresh fake server
pub fn create_test_state() -> (Arc<DaemonState<FakeConnector>>, FakeServer) {
    let server = FakeServer::default();
    let connector = FakeConnector {
        server: server.clone(),
    };
    let manager = NodeManager::new(connector, WardenConfig::default());
    (Arc::new(DaemonState::new(manager)), server)
}

/// IPC test client wrapper
pub struct TestClient {
    reader: BufReader<tokio::net::tcp::OwnedReadHalf>,
    writer: BufWriter<tokio::net::tcp::OwnedWriteHalf>,
}

impl TestClient {
    pub async fn connect(address: &str) -> Self {
        // Retry connection a few times in case server isn't ready
        let mut last_err = None;
        for _ in 0..10 {
            match TcpStream::connect(address).await {
                Ok(stream) => {
                    let (reader, writer) = stream.into_split();
                    return Self {
                        reader: BufReader::new(reader),
                        writer: BufWriter::new(writer),
                    };
                }
                Err(e) => {
                    last_err = Some(e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
        panic!(
            "Failed to connect to IPC server at {}: {:?}",
            address, last_err
        );
    }

    pub async fn send_raw(&mut self, line: &str) -> IpcResponse {
        self.writer
            .write_all(format!("{}\n", line).as_bytes())
            .await
            .expect("Failed to write request");
        self.writer.flush().await.expect("Failed to flush");

        let mut response_line = String::new();
        self.reader
            .read_line(&mut response_line)
            .await
            .expect("Failed to read response");

        if response_line.is_empty() {
            panic!("Server sent empty response (connection closed?)");
        }

        serde_json::from_str(&response_line).expect("Failed to parse response")
    }

    pub async fn send_request(&mut self, request: IpcRequest) -> IpcResponse {
        let request_json = serde_json::to_string(&request).expect("Failed to serialize request");
        self.send_raw(&request_json).await
    }
}
