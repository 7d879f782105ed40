//! Node lifecycle commands

use anyhow::Result;

use mw_core::traits::Connector;
use mw_core::{InstallStatus, NodeStatus};
use mw_remote::NodeManager;

use super::report_transcript;
use crate::output::{format_install_status, format_node_status, print_error, print_info};

/// Run an arbitrary shell command and print its output
pub async fn exec_command<C: Connector>(manager: &NodeManager<C>, command: &str) -> Result<()> {
    match manager.run_command(command).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            if !e.output().is_empty() {
                println!("{}", e.output());
            }
            print_error(&format!("Command failed: {}", e));
            Err(e.into())
        }
    }
}

/// Install if needed, then start node and client
pub async fn setup_command<C: Connector>(
    manager: &mut NodeManager<C>,
    node_password: &str,
    public_ip: &str,
    force_reinstall: bool,
) -> Result<()> {
    print_info("Running setup; a fresh install downloads the release and may take a few minutes");
    report_transcript(
        manager
            .setup_and_run(node_password, public_ip, force_reinstall)
            .await,
    )
}

/// Report whether the node directory exists
pub async fn installed_command<C: Connector>(manager: &NodeManager<C>) -> Result<InstallStatus> {
    let status = manager.check_installed().await?;
    if let Some(target) = manager.target() {
        println!("{}", format_install_status(target, status));
    }
    Ok(status)
}

/// Probe and print the live node status
pub async fn status_command<C: Connector>(manager: &NodeManager<C>) -> Result<NodeStatus> {
    let status = manager.check_status().await?;
    if let Some(target) = manager.target() {
        println!("{}", format_node_status(target, status));
    }
    if !status.is_installed() {
        print_info("Run 'massa-warden setup' to install the node");
    } else if !status.is_running() {
        print_info("Run 'massa-warden start' to start the node");
    }
    Ok(status)
}

/// Start an installed node
pub async fn start_command<C: Connector>(
    manager: &mut NodeManager<C>,
    node_password: &str,
) -> Result<()> {
    report_transcript(manager.start_node(node_password).await)
}

/// Print a snapshot of the node's screen
pub async fn logs_command<C: Connector>(manager: &NodeManager<C>) -> Result<()> {
    let logs = manager.get_logs().await?;
    println!("{}", logs);
    Ok(())
}

/// Print the server resource summary
pub async fn stats_command<C: Connector>(manager: &NodeManager<C>) -> Result<()> {
    report_transcript(manager.get_server_stats().await)
}
