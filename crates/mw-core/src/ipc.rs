//! IPC protocol between a front end and the warden daemon
//!
//! Uses JSON-encoded messages, one per line, over TCP on localhost
//! (127.0.0.1). TCP is used instead of Unix sockets for cross-platform
//! compatibility.

use serde::{Deserialize, Serialize};

use crate::config::WardenConfig;
use crate::types::{InstallStatus, NodeStatus};

/// Default IPC address derived from the default configuration
pub fn default_ipc_address() -> String {
    WardenConfig::default().ipc_address()
}

/// IPC request from the front end to the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpcRequest {
    /// Open the SSH session, replacing any existing one
    Connect {
        host: String,
        port: u16,
        user: String,
        password: String,
    },

    /// Close the SSH session
    Disconnect,

    /// Run an arbitrary shell command
    RunCommand { command: String },

    /// Install (if needed) and start node and client
    SetupAndRun {
        node_password: String,
        public_ip: String,
        force_reinstall: bool,
    },

    /// Check whether the node directory exists
    CheckInstalled,

    /// Probe the live node status
    CheckStatus,

    /// Start an installed node
    StartNode { node_password: String },

    /// Snapshot of the node's screen
    GetLogs,

    /// Wallet and staking passthroughs to massa-client
    GetWalletInfo,
    GenerateWalletKey,
    ImportWalletKey { secret_key: String },
    GetAddressPublicKey { address: String },
    BuyRolls {
        address: String,
        roll_count: u64,
        fee: f64,
    },
    SellRolls {
        address: String,
        roll_count: u64,
        fee: f64,
    },
    StartStaking { address: String },

    /// Server resource summary
    GetServerStats,

    /// Ping (for keepalive)
    Ping,

    /// The front-end window is closing
    WindowClosing,

    /// Shutdown the daemon
    Shutdown,
}

/// IPC response from the daemon to the front end
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpcResponse {
    /// Text result of an operation; `output` is present on failure too
    Output {
        output: String,
        success: bool,
        error: Option<String>,
    },

    /// Result of `CheckInstalled`
    Installation { status: InstallStatus },

    /// Result of `CheckStatus`
    NodeStatus { status: NodeStatus },

    /// Generic success
    Ok,

    /// Error response
    Error { message: String },

    /// Pong response
    Pong,
}

impl IpcResponse {
    /// Successful text result
    pub fn output(output: impl Into<String>) -> Self {
        IpcResponse::Output {
            output: output.into(),
            success: true,
            error: None,
        }
    }

    /// Failed text result that still carries its transcript
    pub fn failed(output: impl Into<String>, error: impl ToString) -> Self {
        IpcResponse::Output {
            output: output.into(),
            success: false,
            error: Some(error.to_string()),
        }
    }
}
