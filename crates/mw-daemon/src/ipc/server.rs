//! IPC server implementation
//!
//! Listens on localhost TCP for requests from the front end.
//! Uses TCP on 127.0.0.1 for cross-platform compatibility.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

use mw_core::ipc::{IpcRequest, IpcResponse};
use mw_core::traits::Connector;
use mw_core::TranscriptError;

use crate::state::DaemonState;

/// IPC server for front-end communication
///
/// Listens on localhost (127.0.0.1) only - not accessible from network.
pub struct IpcServer<C: Connector> {
    /// Address to bind (127.0.0.1:port)
    pub address: String,
    /// Daemon state
    state: Arc<DaemonState<C>>,
    /// Cancellation token for shutdown
    shutdown_token: Option<CancellationToken>,
}

impl<C: Connector + 'static> IpcServer<C> {
    /// Create a new IPC server
    pub fn new(address: String, state: Arc<DaemonState<C>>) -> Self {
        Self {
            address,
            state,
            shutdown_token: None,
        }
    }

    /// Set the shutdown token (call before run)
    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown_token = Some(token);
        self
    }

    /// Serve until the shutdown token is cancelled
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.address)
            .await
            .with_context(|| format!("Failed to bind IPC server to {}", self.address))?;

        tracing::info!("IPC server listening on {}", self.address);

        let shutdown = self.shutdown_token.clone().unwrap_or_default();
        loop {
            let accepted = tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, peer_addr)) => {
                    // Only accept connections from localhost
                    if !peer_addr.ip().is_loopback() {
                        tracing::warn!("Rejected non-localhost connection from {}", peer_addr);
                        continue;
                    }

                    let state = Arc::clone(&self.state);
                    let shutdown_token = self.shutdown_token.clone();

                    tokio::spawn(async move {
                        if let Err(e) = handle_client(stream, state, shutdown_token).await {
                            tracing::warn!("IPC client error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    tracing::error!("Failed to accept IPC connection: {}", e);
                }
            }
        }

        tracing::info!(
            "IPC server on {} stopping after {}s",
            self.address,
            self.state.uptime_secs()
        );
        Ok(())
    }
}

async fn handle_client<C: Connector>(
    stream: TcpStream,
    state: Arc<DaemonState<C>>,
    shutdown_token: Option<CancellationToken>,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break; // EOF
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<IpcRequest>(trimmed) {
            Ok(request) => handle_request(request, &state, shutdown_token.as_ref()).await,
            Err(e) => IpcResponse::Error {
                message: format!("Invalid request: {}", e),
            },
        };

        let mut response_json = serde_json::to_string(&response)?;
        response_json.push('\n');
        writer.write_all(response_json.as_bytes()).await?;
    }

    Ok(())
}

/// Map a transcript-carrying result onto the wire
fn transcript_response(result: Result<String, TranscriptError>) -> IpcResponse {
    match result {
        Ok(output) => IpcResponse::output(output),
        Err(e) => IpcResponse::failed(e.transcript, e.source),
    }
}

async fn handle_request<C: Connector>(
    request: IpcRequest,
    state: &DaemonState<C>,
    shutdown_token: Option<&CancellationToken>,
) -> IpcResponse {
    match request {
        IpcRequest::Ping => IpcResponse::Pong,

        IpcRequest::Connect {
            host,
            port,
            user,
            password,
        } => {
            let mut manager = state.manager().lock().await;
            match manager.connect(&host, port, &user, &password).await {
                Ok(message) => IpcResponse::output(message),
                Err(e) => IpcResponse::failed(e.to_string(), e),
            }
        }

        IpcRequest::Disconnect => {
            let mut manager = state.manager().lock().await;
            match manager.disconnect().await {
                Ok(message) => IpcResponse::output(message),
                Err(e) => IpcResponse::failed(e.to_string(), e),
            }
        }

        IpcRequest::RunCommand { command } => {
            let manager = state.manager().lock().await;
            match manager.run_command(&command).await {
                Ok(output) => IpcResponse::output(output),
                Err(e) => IpcResponse::failed(e.output().to_string(), e),
            }
        }

        IpcRequest::SetupAndRun {
            node_password,
            public_ip,
            force_reinstall,
        } => {
            let mut manager = state.manager().lock().await;
            transcript_response(
                manager
                    .setup_and_run(&node_password, &public_ip, force_reinstall)
                    .await,
            )
        }

        IpcRequest::CheckInstalled => {
            let manager = state.manager().lock().await;
            match manager.check_installed().await {
                Ok(status) => IpcResponse::Installation { status },
                Err(e) => IpcResponse::Error {
                    message: e.to_string(),
                },
            }
        }

        IpcRequest::CheckStatus => {
            let manager = state.manager().lock().await;
            match manager.check_status().await {
                Ok(status) => IpcResponse::NodeStatus { status },
                Err(e) => IpcResponse::Error {
                    message: e.to_string(),
                },
            }
        }

        IpcRequest::StartNode { node_password } => {
            let mut manager = state.manager().lock().await;
            transcript_response(manager.start_node(&node_password).await)
        }

        IpcRequest::GetLogs => {
            let manager = state.manager().lock().await;
            match manager.get_logs().await {
                Ok(output) => IpcResponse::output(output),
                Err(e) => IpcResponse::failed(e.output().to_string(), e),
            }
        }

        IpcRequest::GetServerStats => {
            let manager = state.manager().lock().await;
            transcript_response(manager.get_server_stats().await)
        }

        IpcRequest::GetWalletInfo => {
            let manager = state.manager().lock().await;
            transcript_response(manager.get_wallet_info().await)
        }

        IpcRequest::GenerateWalletKey => {
            let manager = state.manager().lock().await;
            transcript_response(manager.generate_wallet_key().await)
        }

        IpcRequest::ImportWalletKey { secret_key } => {
            let manager = state.manager().lock().await;
            transcript_response(manager.import_wallet_key(&secret_key).await)
        }

        IpcRequest::GetAddressPublicKey { address } => {
            let manager = state.manager().lock().await;
            transcript_response(manager.get_address_public_key(&address).await)
        }

        IpcRequest::BuyRolls {
            address,
            roll_count,
            fee,
        } => {
            let manager = state.manager().lock().await;
            transcript_response(manager.buy_rolls(&address, roll_count, fee).await)
        }

        IpcRequest::SellRolls {
            address,
            roll_count,
            fee,
        } => {
            let manager = state.manager().lock().await;
            transcript_response(manager.sell_rolls(&address, roll_count, fee).await)
        }

        IpcRequest::StartStaking { address } => {
            let manager = state.manager().lock().await;
            transcript_response(manager.start_staking(&address).await)
        }

        IpcRequest::WindowClosing => {
            tracing::info!("Front-end window closing, releasing SSH connection");
            state.shutdown().await;
            IpcResponse::Ok
        }

        IpcRequest::Shutdown => {
            tracing::info!("Shutdown requested via IPC");
            if let Some(token) = shutdown_token {
                token.cancel();
                IpcResponse::Ok
            } else {
                IpcResponse::Error {
                    message: "Shutdown not supported (no shutdown token configured)".to_string(),
                }
            }
        }
    }
}
