//! Installation and node status probes

use mw_core::probe::{self, ProbeCommands};
use mw_core::traits::Connector;
use mw_core::{InstallStatus, NodeStatus, WardenError};

use crate::manager::NodeManager;

impl<C: Connector> NodeManager<C> {
    /// Whether the node directory exists on the server
    pub async fn check_installed(&self) -> Result<InstallStatus, WardenError> {
        let command = ProbeCommands::new(&self.config().install).node_dir();
        let result = self.run_command(&command).await;
        let output = match &result {
            Ok(output) => output.as_str(),
            Err(e) => e.output(),
        };

        if let Some(status) = probe::decode_install_status(output) {
            tracing::debug!("Installation status: {}", status);
            return Ok(status);
        }
        match result {
            Err(e) => Err(e.into()),
            Ok(output) => Err(WardenError::UnexpectedOutput(output)),
        }
    }

    /// Probe installation, the node screen and the node log
    pub async fn check_status(&self) -> Result<NodeStatus, WardenError> {
        let probes = ProbeCommands::new(&self.config().install);

        match self.run_command(&probes.node_executable()).await {
            Ok(output) => match probe::decode_executable(&output) {
                Some(false) => return Ok(NodeStatus::NotInstalled),
                Some(true) => {}
                None => tracing::warn!(
                    "Unexpected installation probe output, assuming installed: {}",
                    output
                ),
            },
            Err(e) => {
                if probe::decode_executable(e.output()) == Some(false) {
                    return Ok(NodeStatus::NotInstalled);
                }
                return Err(e.into());
            }
        }

        let running = self.screen_listed(&self.config().install.node_screen).await;

        let log = match self.run_command(&probes.node_log()).await {
            Ok(output) => Some(probe::decode_log(&output)),
            Err(e) => {
                tracing::warn!("Node log probe failed: {}", e);
                None
            }
        };

        let status = probe::resolve_status(running, log.as_ref());
        tracing::debug!("Node status: {} (running: {}, log: {:?})", status, running, log);
        Ok(status)
    }
}
