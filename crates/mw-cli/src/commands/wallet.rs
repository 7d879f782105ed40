//! Wallet and staking commands, bridged through massa-client

use anyhow::Result;

use mw_core::traits::Connector;
use mw_core::ClientCommand;
use mw_remote::NodeManager;

use super::report_transcript;

/// Run one massa-client command with the given node password
pub async fn client_command<C: Connector>(
    manager: &mut NodeManager<C>,
    node_password: &str,
    command: &ClientCommand,
) -> Result<()> {
    tracing::info!("Running massa-client command: {}", command.name());
    manager.remember_node_password(node_password);
    report_transcript(manager.run_client(command).await)
}
