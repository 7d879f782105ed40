//! massa-client command bridge
//!
//! `massa-client` only offers an interactive prompt, so each command is fed
//! through a heredoc by a throwaway script and its transcript is filtered by
//! the manager's [`TranscriptParser`](mw_core::traits::TranscriptParser).

use mw_core::screen::shell_quote;
use mw_core::traits::Connector;
use mw_core::{ClientCommand, TranscriptError, WardenError};

use crate::manager::NodeManager;

/// Delimiter of the heredoc feeding commands to massa-client
const CLIENT_INPUT_EOF: &str = "EOF";
/// Delimiter of the heredoc writing the script itself
const SCRIPT_EOF: &str = "EOFSCRIPT";

impl<C: Connector> NodeManager<C> {
    /// Run one typed massa-client command
    pub async fn run_client(&self, command: &ClientCommand) -> Result<String, TranscriptError> {
        command
            .validate()
            .map_err(|e| TranscriptError::new(format!("Error: {}", e), e))?;
        tracing::info!("Running massa-client command '{}'", command.name());
        self.run_client_command(&command.to_string()).await
    }

    pub async fn get_wallet_info(&self) -> Result<String, TranscriptError> {
        self.run_client(&ClientCommand::WalletInfo).await
    }

    pub async fn generate_wallet_key(&self) -> Result<String, TranscriptError> {
        self.run_client(&ClientCommand::WalletGenerateSecretKey).await
    }

    pub async fn import_wallet_key(&self, secret_key: &str) -> Result<String, TranscriptError> {
        self.run_client(&ClientCommand::WalletAddSecretKeys {
            secret_key: secret_key.to_string(),
        })
        .await
    }

    pub async fn get_address_public_key(&self, address: &str) -> Result<String, TranscriptError> {
        self.run_client(&ClientCommand::WalletGetPublicKey {
            address: address.to_string(),
        })
        .await
    }

    pub async fn buy_rolls(
        &self,
        address: &str,
        roll_count: u64,
        fee: f64,
    ) -> Result<String, TranscriptError> {
        self.run_client(&ClientCommand::BuyRolls {
            address: address.to_string(),
            roll_count,
            fee,
        })
        .await
    }

    pub async fn sell_rolls(
        &self,
        address: &str,
        roll_count: u64,
        fee: f64,
    ) -> Result<String, TranscriptError> {
        self.run_client(&ClientCommand::SellRolls {
            address: address.to_string(),
            roll_count,
            fee,
        })
        .await
    }

    pub async fn start_staking(&self, address: &str) -> Result<String, TranscriptError> {
        self.run_client(&ClientCommand::NodeStartStaking {
            address: address.to_string(),
        })
        .await
    }

    /// Run a raw massa-client command line and return its filtered result
    pub async fn run_client_command(&self, command: &str) -> Result<String, TranscriptError> {
        if !self.is_connected() {
            return Err(TranscriptError::new(
                "Error: No active SSH connection.",
                WardenError::NotConnected,
            ));
        }
        let command = command.trim();
        if command.is_empty()
            || command.contains(['\n', '\r'])
            || command == CLIENT_INPUT_EOF
            || command == SCRIPT_EOF
        {
            let err = WardenError::InvalidArgument(
                "massa-client command must be a single non-empty line".to_string(),
            );
            return Err(TranscriptError::new(format!("Error: {}", err), err));
        }
        let Some(password) = self.node_password() else {
            let err = WardenError::NodePasswordMissing;
            return Err(TranscriptError::new(format!("Error: {}", err), err));
        };
        // Both the script and the client input are heredocs
        if password.contains(['\n', '\r']) {
            let err = WardenError::InvalidArgument(
                "node password must not contain line breaks".to_string(),
            );
            return Err(TranscriptError::new(format!("Error: {}", err), err));
        }

        let install = &self.config().install;
        let find = format!(
            "find {} -name massa-client -type d 2>/dev/null | head -n 1",
            shell_quote(&install.massa_dir())
        );
        let client_dir = match self.run_command(&find).await {
            Ok(dir) if !dir.is_empty() => dir,
            _ => {
                return Err(TranscriptError::new(
                    "Error: Could not find massa-client directory.",
                    WardenError::ClientDirNotFound,
                ))
            }
        };
        tracing::debug!("Found massa-client directory: {}", client_dir);

        let script_path = &install.client_script_path;
        let result_path = &install.client_result_path;
        let script = client_script(&client_dir, password, command, result_path);
        let create = format!(
            "cat > {} << '{SCRIPT_EOF}'\n{}\n{SCRIPT_EOF}",
            shell_quote(script_path),
            script
        );

        if let Err(e) = self.run_redacted(&create, "write massa-client script").await {
            return Err(TranscriptError::new(
                format!("Error creating temporary script: {}", e),
                e,
            ));
        }

        let result = match self
            .run_command(&format!("chmod +x {}", shell_quote(script_path)))
            .await
        {
            Ok(_) => self.run_command(&shell_quote(script_path)).await,
            Err(e) => {
                self.remove_client_files().await;
                return Err(TranscriptError::new(
                    format!("Error making script executable: {}", e),
                    e,
                ));
            }
        };

        self.remove_client_files().await;

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                let transcript = format!(
                    "Error executing massa-client command: {}\nOutput: {}",
                    e,
                    e.output()
                );
                return Err(TranscriptError::new(transcript, e));
            }
        };

        let name = command.split_whitespace().next().unwrap_or(command);
        Ok(self.transcript_parser.extract(&output, name))
    }

    async fn remove_client_files(&self) {
        let install = &self.config().install;
        let cleanup = format!(
            "rm -f {} {}",
            shell_quote(&install.client_script_path),
            shell_quote(&install.client_result_path)
        );
        if let Err(e) = self.run_command(&cleanup).await {
            tracing::debug!("Ignoring massa-client cleanup failure: {}", e);
        }
    }
}

/// Script feeding `command` then `exit` to massa-client, writing the
/// transcript to `result_path` and printing it
fn client_script(client_dir: &str, password: &str, command: &str, result_path: &str) -> String {
    format!(
        "#!/bin/bash\n\
         cd {dir} || exit 1\n\
         ./massa-client -p {password} > {result} 2>&1 << '{CLIENT_INPUT_EOF}'\n\
         {command}\n\
         exit\n\
         {CLIENT_INPUT_EOF}\n\
         cat {result}",
        dir = shell_quote(client_dir),
        password = shell_quote(password),
        result = shell_quote(result_path),
        command = command,
    )
}
