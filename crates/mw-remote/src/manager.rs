//! Connection manager and remote command executor
//!
//! [`NodeManager`] owns at most one SSH session plus the node password the
//! client bridge needs. Every higher-level operation (installer, prober,
//! starter, bridge) is an `impl` block on this type built on
//! [`NodeManager::run_command`].

use zeroize::Zeroizing;

use mw_core::config::WardenConfig;
use mw_core::screen::ScreenCommandBuilder;
use mw_core::traits::{Connector, MarkerTranscriptParser, RemoteSession, TranscriptParser};
use mw_core::{CommandError, ConnectTarget, WardenError};

struct ActiveSession<S> {
    target: ConnectTarget,
    session: S,
}

/// Manages the single SSH session to a Massa node server
pub struct NodeManager<C: Connector> {
    connector: C,
    config: WardenConfig,
    active: Option<ActiveSession<C::Session>>,
    node_password: Option<Zeroizing<String>>,
    pub(crate) screen: ScreenCommandBuilder,
    pub(crate) transcript_parser: Box<dyn TranscriptParser>,
}

impl<C: Connector> NodeManager<C> {
    pub fn new(connector: C, config: WardenConfig) -> Self {
        Self {
            connector,
            config,
            active: None,
            node_password: None,
            screen: ScreenCommandBuilder::new(),
            transcript_parser: Box::new(MarkerTranscriptParser::default()),
        }
    }

    /// Replace the massa-client transcript parser
    pub fn with_transcript_parser(mut self, parser: impl TranscriptParser + 'static) -> Self {
        self.transcript_parser = Box::new(parser);
        self
    }

    pub fn config(&self) -> &WardenConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.active.is_some()
    }

    /// Where the current session is connected, if any
    pub fn target(&self) -> Option<&ConnectTarget> {
        self.active.as_ref().map(|active| &active.target)
    }

    pub fn has_node_password(&self) -> bool {
        self.node_password.is_some()
    }

    /// Cache the node password for later massa-client commands.
    ///
    /// Cleared again by `connect`, `disconnect` and `shutdown`.
    /// An empty password forgets any cached one.
    pub fn remember_node_password(&mut self, password: &str) {
        self.node_password = if password.is_empty() {
            None
        } else {
            Some(Zeroizing::new(password.to_string()))
        };
    }

    pub(crate) fn node_password(&self) -> Option<&str> {
        self.node_password.as_deref().map(String::as_str)
    }

    /// Open a new session, closing any existing one first
    pub async fn connect(
        &mut self,
        host: &str,
        port: u16,
        user: &str,
        password: &str,
    ) -> Result<String, WardenError> {
        let target = ConnectTarget::new(host, port, user);
        tracing::info!("Attempting to connect to {}", target);

        if let Some(previous) = self.active.take() {
            tracing::info!("Closing existing connection to {}", previous.target);
            if let Err(e) = previous.session.close().await {
                tracing::warn!("Error closing previous connection: {}", e);
            }
        }
        self.node_password = None;

        let session = self.connector.connect(&target, password).await.map_err(|e| {
            tracing::error!("Failed to connect to {}: {}", target, e);
            e
        })?;

        let message = format!("Successfully connected to {}!", target.address());
        tracing::info!("{}", message);
        self.active = Some(ActiveSession { target, session });
        Ok(message)
    }

    /// Close the session; a close failure is reported after state is cleared
    pub async fn disconnect(&mut self) -> Result<String, WardenError> {
        self.node_password = None;
        let Some(active) = self.active.take() else {
            return Ok("No active SSH connection to disconnect.".to_string());
        };

        tracing::info!("Disconnecting from {}", active.target);
        active.session.close().await?;
        Ok("Successfully disconnected.".to_string())
    }

    /// Teardown for process exit or window close; errors are only logged
    pub async fn shutdown(&mut self) {
        self.node_password = None;
        if let Some(active) = self.active.take() {
            tracing::info!("Closing SSH connection to {} on shutdown", active.target);
            if let Err(e) = active.session.close().await {
                tracing::warn!("Error closing SSH connection on shutdown: {}", e);
            }
        }
    }

    /// Run a shell command and return its combined, trimmed output
    pub async fn run_command(&self, command: &str) -> Result<String, CommandError> {
        tracing::debug!("Running command: {}", command);
        self.exec(command).await
    }

    /// Like `run_command` but logs `label` instead of the command text,
    /// for commands that embed secrets
    pub(crate) async fn run_redacted(
        &self,
        command: &str,
        label: &str,
    ) -> Result<String, CommandError> {
        tracing::debug!("Running command: <{}>", label);
        self.exec(command).await
    }

    async fn exec(&self, command: &str) -> Result<String, CommandError> {
        let active = self.active.as_ref().ok_or(CommandError::NotConnected)?;
        let output = active.session.exec(command).await?;
        let combined = output.combined();

        if let Some(signal) = output.exit_signal {
            tracing::debug!("Command killed by signal {}", signal);
            return Err(CommandError::Signalled {
                signal,
                output: combined,
            });
        }
        match output.exit_status {
            Some(status) if status != 0 => {
                tracing::debug!("Command exited with status {}", status);
                Err(CommandError::NonZeroExit {
                    status,
                    output: combined,
                })
            }
            _ => Ok(combined),
        }
    }

    /// Whether a screen session with this name is listed; errors count as no
    pub(crate) async fn screen_listed(&self, name: &str) -> bool {
        match self.run_command(&self.screen.is_listed(name)).await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("Screen '{}' not listed: {}", name, e);
                false
            }
        }
    }
}
