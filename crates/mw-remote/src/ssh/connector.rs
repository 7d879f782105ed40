//! Outbound SSH connector
//!
//! Dials the node server with password authentication and runs each remote
//! command on its own short-lived exec channel.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client::{self, Config, Handle};
use russh::{ChannelMsg, Disconnect, Sig};
use russh_keys::key::PublicKey;

use mw_core::config::WardenConfig;
use mw_core::traits::{Connector, RemoteSession};
use mw_core::{CommandOutput, ConnectTarget, ConnectionError};

/// Extended data stream id for stderr
const SSH_EXTENDED_DATA_STDERR: u32 = 1;

/// Dials password-authenticated SSH sessions
#[derive(Debug, Clone)]
pub struct SshConnector {
    /// Bound on TCP connect, handshake and authentication
    connect_timeout: Duration,
}

impl SshConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    /// Create a connector using the configured dial timeout
    pub fn from_config(config: &WardenConfig) -> Self {
        Self::new(config.connect_timeout)
    }

    async fn dial(
        &self,
        target: &ConnectTarget,
        password: &str,
    ) -> Result<Handle<ClientHandler>, ConnectionError> {
        let ssh_config = Arc::new(Config::default());
        let handler = ClientHandler::new(target.address());

        tracing::debug!("Connecting to {}", target.address());
        let mut handle = client::connect(ssh_config, (target.host.as_str(), target.port), handler)
            .await
            .map_err(|e| ConnectionError::Dial(e.to_string()))?;

        tracing::debug!("Authenticating as user '{}'", target.user);
        let authenticated = handle
            .authenticate_password(target.user.as_str(), password)
            .await
            .map_err(|e| ConnectionError::Dial(format!("authentication error: {}", e)))?;

        if !authenticated {
            return Err(ConnectionError::AuthenticationFailed {
                user: target.user.clone(),
            });
        }

        Ok(handle)
    }
}

#[async_trait]
impl Connector for SshConnector {
    type Session = SshSession;

    async fn connect(
        &self,
        target: &ConnectTarget,
        password: &str,
    ) -> Result<SshSession, ConnectionError> {
        let address = target.address();
        let handle = tokio::time::timeout(self.connect_timeout, self.dial(target, password))
            .await
            .map_err(|_| ConnectionError::Timeout {
                address: address.clone(),
            })??;

        tracing::debug!("Authentication successful for {}", target);
        Ok(SshSession { handle, address })
    }
}

/// An authenticated SSH connection
pub struct SshSession {
    handle: Handle<ClientHandler>,
    address: String,
}

impl SshSession {
    /// `host:port` this session is connected to
    pub fn address(&self) -> &str {
        &self.address
    }
}

#[async_trait]
impl RemoteSession for SshSession {
    async fn exec(&self, command: &str) -> Result<CommandOutput, ConnectionError> {
        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| ConnectionError::Channel(e.to_string()))?;

        channel
            .exec(true, command)
            .await
            .map_err(|e| ConnectionError::Channel(e.to_string()))?;

        let mut collected = ExecOutput::default();

        // The exit status may arrive after EOF, so drain until close
        while let Some(msg) = channel.wait().await {
            if !collected.absorb(msg) {
                break;
            }
        }

        Ok(collected.finish())
    }

    async fn close(&self) -> Result<(), ConnectionError> {
        tracing::debug!("Disconnecting from {}", self.address);
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(|e| ConnectionError::Close(e.to_string()))
    }
}

/// Accumulates the messages of one exec channel
#[derive(Debug, Default)]
struct ExecOutput {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    exit_status: Option<u32>,
    exit_signal: Option<String>,
}

impl ExecOutput {
    /// Record one channel message; false once the channel is closed
    fn absorb(&mut self, msg: ChannelMsg) -> bool {
        match msg {
            ChannelMsg::Data { data } => self.stdout.extend_from_slice(&data),
            ChannelMsg::ExtendedData { data, ext } if ext == SSH_EXTENDED_DATA_STDERR => {
                self.stderr.extend_from_slice(&data)
            }
            ChannelMsg::ExitStatus { exit_status } => self.exit_status = Some(exit_status),
            ChannelMsg::ExitSignal { signal_name, .. } => {
                self.exit_signal = Some(signal_label(&signal_name))
            }
            ChannelMsg::Close => return false,
            _ => {}
        }
        true
    }

    fn finish(self) -> CommandOutput {
        CommandOutput {
            stdout: String::from_utf8_lossy(&self.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&self.stderr).into_owned(),
            exit_status: self.exit_status,
            exit_signal: self.exit_signal,
        }
    }
}

fn signal_label(signal: &Sig) -> String {
    match signal {
        Sig::Custom(name) => name.clone(),
        other => format!("{:?}", other),
    }
}

/// SSH client handler
///
/// Server keys are accepted without verification; the fingerprint is logged
/// so it can be checked by hand.
pub struct ClientHandler {
    address: String,
}

impl ClientHandler {
    pub fn new(address: String) -> Self {
        Self { address }
    }
}

#[async_trait]
impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        let fingerprint = server_public_key.fingerprint();
        tracing::debug!("Server host key for {}: {}", self.address, fingerprint);
        tracing::warn!(
            "Accepting host key for {} without verification; this is insecure outside development",
            self.address
        );
        Ok(true)
    }
}
