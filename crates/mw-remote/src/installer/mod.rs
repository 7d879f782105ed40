//! Installer: uploads and runs the setup script

pub mod script;

use mw_core::traits::Connector;
use mw_core::screen::shell_quote;
use mw_core::{TranscriptError, WardenError};

use crate::manager::NodeManager;
use crate::oplog::OperationLog;

use script::{exec_command, render_setup_script, routable_ip, upload_command};

const NODE_SUCCESS_MARKER: &str = "SUCCESS: Massa Node screen session";
const CLIENT_SUCCESS_MARKER: &str = "SUCCESS: Massa Client screen session";
const SCRIPT_ERROR_MARKER: &str = "ERROR:";

impl<C: Connector> NodeManager<C> {
    /// Install the node if needed, then (re)start node and client screens.
    ///
    /// The returned log covers every step plus the script's own output; on
    /// failure the same log travels inside the error.
    pub async fn setup_and_run(
        &mut self,
        node_password: &str,
        public_ip: &str,
        force_reinstall: bool,
    ) -> Result<String, TranscriptError> {
        tracing::info!(
            "Setup requested. Node password: [REDACTED], public IP: {}, force reinstall: {}",
            public_ip,
            force_reinstall
        );
        let mut log = OperationLog::new();
        if !self.is_connected() {
            log.line("Error: No active SSH connection.");
            return Err(log.fail(WardenError::NotConnected));
        }
        if node_password.is_empty() {
            log.line("Error: Node password is required to set up Massa node.");
            return Err(log.fail(WardenError::InvalidArgument(
                "node password is required".to_string(),
            )));
        }

        self.remember_node_password(node_password);

        let config_ip = routable_ip(public_ip);
        if config_ip != public_ip {
            log.warn(format!(
                "Warning: '{}' provided as Public IP. Using '{}' for config.toml. For a real routable node, provide a public IP.",
                public_ip, config_ip
            ));
        }

        let script = match render_setup_script(self.config(), config_ip) {
            Ok(script) => script,
            Err(e) => {
                log.line(format!("Error rendering setup script: {}", e));
                return Err(log.fail(e));
            }
        };
        let script_path = self.config().install.setup_script_path.clone();

        log.line(format!(
            "Encoding script content and preparing to write to {}...",
            script_path
        ));
        match self
            .run_redacted(&upload_command(&script, &script_path), "upload setup script")
            .await
        {
            Ok(output) => {
                if !output.is_empty() {
                    log.line(format!("Output from script write: {}", output));
                }
            }
            Err(e) => {
                log.line(format!(
                    "Error writing script to server (using base64): {}. Output: {}",
                    e,
                    e.output()
                ));
                tracing::error!("Failed to write setup script: {}", e);
                return Err(log.fail(e));
            }
        }
        log.line(format!(
            "Successfully wrote script to {} using base64 method.",
            script_path
        ));

        log.line("Making script executable...");
        if let Err(e) = self
            .run_command(&format!("chmod +x {}", shell_quote(&script_path)))
            .await
        {
            log.line(format!(
                "Error making script executable: {}. Output: {}",
                e,
                e.output()
            ));
            tracing::error!("Failed to chmod setup script: {}", e);
            return Err(log.fail(e));
        }

        log.line(format!(
            "Executing script: {} with password [REDACTED], IP {}, Force Reinstall {}...",
            script_path, public_ip, force_reinstall
        ));
        let result = self
            .run_redacted(
                &exec_command(&script_path, node_password, public_ip, force_reinstall),
                "run setup script",
            )
            .await;
        let script_output = match &result {
            Ok(output) => output.as_str(),
            Err(e) => e.output(),
        };

        log.line("");
        log.line("--- Script Execution Output ---");
        log.line(script_output);
        log.line("--- End of Script Execution Output ---");

        if script_output.contains(NODE_SUCCESS_MARKER)
            && script_output.contains(CLIENT_SUCCESS_MARKER)
        {
            log.line("");
            log.line("INFO: Script reported successful start of Node and Client screen sessions.");
        } else if script_output.contains(SCRIPT_ERROR_MARKER) {
            log.line("");
            log.line("WARN: Script output contains 'ERROR:'. Please review the script log carefully.");
        }

        if let Err(e) = result {
            tracing::error!("Setup script execution failed: {}", e);
            return Err(log.fail(e));
        }

        tracing::info!("Massa components setup script executed");
        Ok(log.into_string())
    }
}
