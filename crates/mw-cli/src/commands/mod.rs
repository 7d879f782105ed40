//! CLI command implementations

mod config;
mod node;
mod wallet;

pub use config::{config_init, config_path, config_show};
pub use node::{
    exec_command, installed_command, logs_command, setup_command, start_command, stats_command,
    status_command,
};
pub use wallet::client_command;

use anyhow::{Context, Result};
use clap::Args;

use mw_core::config::WardenConfig;
use mw_core::traits::Connector;
use mw_core::TranscriptError;
use mw_remote::{NodeManager, SshConnector, SshNodeManager};

use crate::output::{print_error, print_warning};

/// SSH target shared by every remote command
#[derive(Args)]
pub struct ConnectionArgs {
    /// Server hostname or IP address
    #[arg(long, global = true, env = "MASSA_WARDEN_HOST")]
    pub host: Option<String>,

    /// SSH port
    #[arg(long, global = true, default_value_t = 22)]
    pub port: u16,

    /// SSH user
    #[arg(long, global = true, default_value = "root")]
    pub user: String,

    /// SSH password
    #[arg(long, global = true, env = "MASSA_WARDEN_SSH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Password protecting the node wallet
    #[arg(long, global = true, env = "MASSA_WARDEN_NODE_PASSWORD", hide_env_values = true)]
    pub node_password: Option<String>,
}

impl ConnectionArgs {
    /// Node password or a usage error naming both ways to pass it
    pub fn require_node_password(&self) -> Result<&str> {
        self.node_password.as_deref().filter(|p| !p.is_empty()).ok_or_else(|| {
            anyhow::anyhow!(
                "A node password is required (--node-password or MASSA_WARDEN_NODE_PASSWORD)"
            )
        })
    }
}

/// Connect a fresh manager to the target in `args`
pub async fn open_session(args: &ConnectionArgs, config: &WardenConfig) -> Result<SshNodeManager> {
    let manager = NodeManager::new(SshConnector::from_config(config), config.clone());
    connect_manager(manager, args).await
}

/// Connect `manager` with the credentials in `args`
pub async fn connect_manager<C: Connector>(
    mut manager: NodeManager<C>,
    args: &ConnectionArgs,
) -> Result<NodeManager<C>> {
    let host = args
        .host
        .as_deref()
        .context("No server given (--host or MASSA_WARDEN_HOST)")?;
    let password = args
        .password
        .as_deref()
        .context("No SSH password given (--password or MASSA_WARDEN_SSH_PASSWORD)")?;

    let message = manager.connect(host, args.port, &args.user, password).await?;
    tracing::info!("{}", message);
    Ok(manager)
}

/// Disconnect at the end of a one-shot command; failures only warn
pub async fn close_session<C: Connector>(manager: &mut NodeManager<C>) {
    match manager.disconnect().await {
        Ok(message) => tracing::debug!("{}", message),
        Err(e) => print_warning(&format!("Error while disconnecting: {}", e)),
    }
}

/// Print an operation's log, then its failure if any
pub(crate) fn report_transcript(result: Result<String, TranscriptError>) -> Result<()> {
    match result {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            if !e.transcript.is_empty() {
                println!("{}", e.transcript);
            }
            print_error(&e.source.to_string());
            Err(e.into())
        }
    }
}
