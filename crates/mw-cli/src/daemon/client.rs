//! IPC client for a running warden daemon

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use mw_core::ipc::{default_ipc_address, IpcRequest, IpcResponse};

/// Client for the daemon started by `massa-warden serve`
pub struct DaemonClient {
    address: String,
    stream: Option<BufReader<TcpStream>>,
}

impl DaemonClient {
    /// Create a new client with the default address
    pub fn new() -> Self {
        Self::with_address(default_ipc_address())
    }

    /// Create a new client with a custom address
    pub fn with_address(address: String) -> Self {
        Self {
            address,
            stream: None,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Connect to the daemon if not already connected
    pub async fn connect(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        tracing::debug!("Connecting to daemon at {}", self.address);

        let stream = TcpStream::connect(&self.address).await.with_context(|| {
            format!(
                "Failed to connect to daemon at {}. Is it running?",
                self.address
            )
        })?;

        self.stream = Some(BufReader::new(stream));
        Ok(())
    }

    /// Check whether the daemon answers
    pub async fn ping(&mut self) -> Result<bool> {
        self.connect().await?;

        match self.request(IpcRequest::Ping).await {
            Ok(IpcResponse::Pong) => Ok(true),
            _ => Ok(false),
        }
    }

    /// Ask the daemon to close its SSH session and exit
    pub async fn shutdown(&mut self) -> Result<()> {
        self.connect().await?;

        match self.request(IpcRequest::Shutdown).await? {
            IpcResponse::Ok => Ok(()),
            IpcResponse::Error { message } => anyhow::bail!("{}", message),
            other => anyhow::bail!("Unexpected response: {:?}", other),
        }
    }

    /// Send one request and read its response line
    pub async fn request(&mut self, request: IpcRequest) -> Result<IpcResponse> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("Not connected"))?;

        let mut request_json = serde_json::to_string(&request)?;
        request_json.push('\n');
        stream.get_mut().write_all(request_json.as_bytes()).await?;

        let mut response_line = String::new();
        let read = stream.read_line(&mut response_line).await?;
        if read == 0 {
            self.stream = None;
            anyhow::bail!("Daemon closed the connection");
        }

        let response: IpcResponse = serde_json::from_str(&response_line)
            .with_context(|| format!("Malformed daemon response: {}", response_line.trim()))?;
        Ok(response)
    }
}

impl Default for DaemonClient {
    fn default() -> Self {
        Self::new()
    }
}
