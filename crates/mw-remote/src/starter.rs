//! Node starter for an existing installation

use std::time::Duration;

use mw_core::probe::{self, ProbeCommands};
use mw_core::screen::shell_quote;
use mw_core::traits::Connector;
use mw_core::{TranscriptError, WardenError};

use crate::backoff::{poll_until, ExponentialBackoff};
use crate::manager::NodeManager;
use crate::oplog::OperationLog;

impl<C: Connector> NodeManager<C> {
    /// Start the node screen (and the client screen if available) without
    /// reinstalling anything
    pub async fn start_node(&mut self, node_password: &str) -> Result<String, TranscriptError> {
        tracing::info!("Start node requested");
        let mut log = OperationLog::new();
        if !self.is_connected() {
            log.line("Error: No active SSH connection.");
            return Err(log.fail(WardenError::NotConnected));
        }
        if node_password.is_empty() {
            log.line("Error: Node password is required to start Massa node.");
            return Err(log.fail(WardenError::InvalidArgument(
                "node password is required".to_string(),
            )));
        }

        self.remember_node_password(node_password);

        let install = self.config().install.clone();
        let probes = ProbeCommands::new(&install);

        let installed = matches!(
            self.run_command(&probes.node_executable())
                .await
                .as_deref()
                .map(probe::decode_executable),
            Ok(Some(true))
        );
        if !installed {
            log.line(format!("Error: {}", WardenError::NotInstalled));
            return Err(log.fail(WardenError::NotInstalled));
        }

        log.line("Starting Massa node...");

        if self.screen_listed(&install.node_screen).await {
            log.line("Massa node screen is already running. No need to start.");
            return Ok(log.into_string());
        }

        let node_exe = install.node_executable();
        if let Err(e) = self
            .run_command(&format!("chmod +x {}", shell_quote(&node_exe)))
            .await
        {
            log.line(format!("Failed to make node executable: {}", e));
            return Err(log.fail(e));
        }

        let node_log = shell_quote(&install.node_log_path());
        if let Err(e) = self
            .run_command(&format!("rm -f {} && touch {}", node_log, node_log))
            .await
        {
            log.warn(format!("Warning: Failed to clear old log file: {}", e));
        }

        let node_command = format!(
            "./massa-node -p {} |& tee {}",
            shell_quote(node_password),
            node_log
        );
        let start = self
            .screen
            .start_detached(&install.node_screen, &install.node_dir(), &node_command);
        if let Err(e) = self.run_redacted(&start, "start node screen").await {
            log.line(format!("Failed to start Massa node: {}", e));
            return Err(log.fail(e));
        }

        log.line("Massa node screen started. Waiting to verify...");

        let node_deadline = self.config().startup.node_deadline;
        if self.wait_for_screen(&install.node_screen, node_deadline).await {
            log.line("Confirmed: Massa node screen is running.");
        } else {
            log.warn("Warning: Could not verify node screen is running after start attempt.");
        }

        let client_found = matches!(
            self.run_command(&probes.client_executable())
                .await
                .as_deref()
                .map(probe::decode_client_executable),
            Ok(Some(true))
        );
        if client_found {
            log.line("Massa client found. Attempting to start client screen...");
            self.start_client_screen(&mut log, node_password).await;
        } else {
            log.line("Massa client executable not found. Only node was started.");
        }

        log.line("");
        log.line("Massa node startup complete.");
        log.line("To check screens: screen -ls");
        log.line(format!("To attach to node: screen -r {}", install.node_screen));
        log.line(format!("To attach to client: screen -r {}", install.client_screen));
        log.line(format!("Node logs are at: {}", install.node_log_path()));

        Ok(log.into_string())
    }

    /// Best effort; every failure here is a warning
    async fn start_client_screen(&self, log: &mut OperationLog, node_password: &str) {
        let install = &self.config().install;

        if self.screen_listed(&install.client_screen).await {
            log.line("Massa client screen is already running.");
            return;
        }

        let client_exe = install.client_executable();
        if let Err(e) = self
            .run_command(&format!("chmod +x {}", shell_quote(&client_exe)))
            .await
        {
            log.warn(format!("Warning: Failed to make client executable: {}", e));
        }

        let client_command = format!("./massa-client -p {}", shell_quote(node_password));
        let start = self
            .screen
            .start_detached(&install.client_screen, &install.client_dir(), &client_command);
        if let Err(e) = self.run_redacted(&start, "start client screen").await {
            log.warn(format!("Warning: Failed to start Massa client: {}", e));
            return;
        }

        log.line("Massa client screen started.");
        let client_deadline = self.config().startup.client_deadline;
        if !self.wait_for_screen(&install.client_screen, client_deadline).await {
            log.warn("Warning: Could not verify client screen is running after start attempt.");
        }
    }

    async fn wait_for_screen(&self, name: &str, deadline: Duration) -> bool {
        let mut backoff = ExponentialBackoff::from_config(&self.config().startup.backoff);
        poll_until(&mut backoff, deadline, move || self.screen_listed(name)).await
    }
}
