//! Core domain types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::WardenError;

/// Where and as whom to open the SSH session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectTarget {
    pub host: String,
    pub port: u16,
    pub user: String,
}

impl ConnectTarget {
    pub fn new(host: impl Into<String>, port: u16, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
        }
    }

    /// `host:port` as used in log lines and user messages
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for ConnectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.user, self.host, self.port)
    }
}

/// Raw result of one remote command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the channel closed without reporting a status
    pub exit_status: Option<u32>,
    /// Signal that terminated the command, e.g. `KILL`
    pub exit_signal: Option<String>,
}

impl CommandOutput {
    /// Whether the command should be treated as having succeeded.
    ///
    /// A command killed by a signal never succeeded, whatever its status.
    pub fn success(&self) -> bool {
        self.exit_signal.is_none() && matches!(self.exit_status, None | Some(0))
    }

    /// Stdout followed by stderr, surrounding whitespace trimmed.
    ///
    /// A newline separator is inserted only when stdout is non-empty and
    /// doesn't already end with one.
    pub fn combined(&self) -> String {
        let mut combined = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !combined.is_empty() && !combined.ends_with('\n') {
                combined.push('\n');
            }
            combined.push_str(&self.stderr);
        }
        combined.trim().to_string()
    }
}

/// Whether the node directory exists on the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallStatus {
    Installed,
    NotInstalled,
}

impl fmt::Display for InstallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallStatus::Installed => write!(f, "INSTALLED"),
            InstallStatus::NotInstalled => write!(f, "NOT_INSTALLED"),
        }
    }
}

/// Live node status, reconstructed from probes on every query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeStatus {
    NotInstalled,
    Running,
    RunningLogCheckError,
    StoppedWithLogs,
    StoppedEmptyLog,
    StoppedNoLogs,
    StoppedLogCheckError,
    StoppedUnknownLogStatus,
}

impl NodeStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, NodeStatus::Running | NodeStatus::RunningLogCheckError)
    }

    pub fn is_installed(&self) -> bool {
        !matches!(self, NodeStatus::NotInstalled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStatus::NotInstalled => "NOT_INSTALLED",
            NodeStatus::Running => "RUNNING",
            NodeStatus::RunningLogCheckError => "RUNNING_LOG_CHECK_ERROR",
            NodeStatus::StoppedWithLogs => "STOPPED_WITH_LOGS",
            NodeStatus::StoppedEmptyLog => "STOPPED_EMPTY_LOG",
            NodeStatus::StoppedNoLogs => "STOPPED_NO_LOGS",
            NodeStatus::StoppedLogCheckError => "STOPPED_LOG_CHECK_ERROR",
            NodeStatus::StoppedUnknownLogStatus => "STOPPED_UNKNOWN_LOG_STATUS",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Administrative commands understood by `massa-client`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ClientCommand {
    WalletInfo,
    WalletGenerateSecretKey,
    WalletAddSecretKeys { secret_key: String },
    WalletGetPublicKey { address: String },
    BuyRolls { address: String, roll_count: u64, fee: f64 },
    SellRolls { address: String, roll_count: u64, fee: f64 },
    NodeStartStaking { address: String },
}

impl ClientCommand {
    /// The command word as typed at the client prompt
    pub fn name(&self) -> &'static str {
        match self {
            ClientCommand::WalletInfo => "wallet_info",
            ClientCommand::WalletGenerateSecretKey => "wallet_generate_secret_key",
            ClientCommand::WalletAddSecretKeys { .. } => "wallet_add_secret_keys",
            ClientCommand::WalletGetPublicKey { .. } => "wallet_get_public_key",
            ClientCommand::BuyRolls { .. } => "buy_rolls",
            ClientCommand::SellRolls { .. } => "sell_rolls",
            ClientCommand::NodeStartStaking { .. } => "node_start_staking",
        }
    }

    /// Reject arguments that would break the single-line heredoc
    pub fn validate(&self) -> Result<(), WardenError> {
        match self {
            ClientCommand::WalletInfo | ClientCommand::WalletGenerateSecretKey => Ok(()),
            ClientCommand::WalletAddSecretKeys { secret_key } => {
                single_token("secret key", secret_key)
            }
            ClientCommand::WalletGetPublicKey { address }
            | ClientCommand::NodeStartStaking { address } => single_token("address", address),
            ClientCommand::BuyRolls {
                address,
                roll_count,
                fee,
            }
            | ClientCommand::SellRolls {
                address,
                roll_count,
                fee,
            } => {
                single_token("address", address)?;
                if *roll_count == 0 {
                    return Err(WardenError::InvalidArgument(
                        "roll count must be at least 1".to_string(),
                    ));
                }
                if !fee.is_finite() || *fee < 0.0 {
                    return Err(WardenError::InvalidArgument(format!(
                        "fee must be a non-negative number, got {}",
                        fee
                    )));
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for ClientCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientCommand::WalletInfo | ClientCommand::WalletGenerateSecretKey => {
                f.write_str(self.name())
            }
            ClientCommand::WalletAddSecretKeys { secret_key } => {
                write!(f, "{} {}", self.name(), secret_key)
            }
            ClientCommand::WalletGetPublicKey { address }
            | ClientCommand::NodeStartStaking { address } => {
                write!(f, "{} {}", self.name(), address)
            }
            ClientCommand::BuyRolls {
                address,
                roll_count,
                fee,
            }
            | ClientCommand::SellRolls {
                address,
                roll_count,
                fee,
            } => write!(f, "{} {} {} {:.6}", self.name(), address, roll_count, fee),
        }
    }
}

fn single_token(what: &str, value: &str) -> Result<(), WardenError> {
    if value.is_empty() {
        return Err(WardenError::InvalidArgument(format!("{} must not be empty", what)));
    }
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(WardenError::InvalidArgument(format!(
            "{} must be a single token",
            what
        )));
    }
    Ok(())
}
