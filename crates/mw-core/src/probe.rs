//! Remote state probes.
//!
//! Each probe is a shell one-liner that prints exactly one literal. The
//! `decode_*` functions map those literals to enums and [`resolve_status`]
//! combines the three status probes; none of them touch the network.

use crate::config::InstallConfig;
use crate::screen::shell_quote;
use crate::types::{InstallStatus, NodeStatus};

pub const INSTALLED: &str = "INSTALLED";
pub const NOT_INSTALLED: &str = "NOT_INSTALLED";
pub const EXE_FOUND: &str = "INSTALLED_EXE_FOUND";
pub const EXE_MISSING: &str = "NOT_INSTALLED_OR_EXE_MISSING";
pub const LOG_NOT_EMPTY: &str = "LOG_EXISTS_AND_NOT_EMPTY";
pub const LOG_EMPTY: &str = "LOG_EXISTS_BUT_EMPTY";
pub const LOG_NOT_FOUND: &str = "LOG_NOT_FOUND";
pub const CLIENT_FOUND: &str = "CLIENT_FOUND";
pub const CLIENT_NOT_FOUND: &str = "CLIENT_NOT_FOUND";

/// Classification of the node log file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogProbe {
    NotEmpty,
    Empty,
    NotFound,
    /// Output matched none of the literals
    Unrecognized(String),
}

/// Probe command strings for one install layout
#[derive(Debug, Clone)]
pub struct ProbeCommands<'a> {
    install: &'a InstallConfig,
}

impl<'a> ProbeCommands<'a> {
    pub fn new(install: &'a InstallConfig) -> Self {
        Self { install }
    }

    /// Node directory only
    pub fn node_dir(&self) -> String {
        let dir = shell_quote(&self.install.node_dir());
        format!(
            "if [ -d {dir} ]; then echo '{INSTALLED}'; else echo '{NOT_INSTALLED}'; fi"
        )
    }

    /// Node directory and executable
    pub fn node_executable(&self) -> String {
        let dir = shell_quote(&self.install.node_dir());
        let exe = shell_quote(&self.install.node_executable());
        format!(
            "if [ -d {dir} ] && [ -f {exe} ]; then echo '{EXE_FOUND}'; else echo '{EXE_MISSING}'; fi"
        )
    }

    /// Three-way log file classification
    pub fn node_log(&self) -> String {
        let log = shell_quote(&self.install.node_log_path());
        format!(
            "if [ -f {log} ] && [ -s {log} ]; then echo '{LOG_NOT_EMPTY}'; elif [ -f {log} ]; then echo '{LOG_EMPTY}'; else echo '{LOG_NOT_FOUND}'; fi"
        )
    }

    /// Client executable presence
    pub fn client_executable(&self) -> String {
        let exe = shell_quote(&self.install.client_executable());
        format!("if [ -f {exe} ]; then echo '{CLIENT_FOUND}'; else echo '{CLIENT_NOT_FOUND}'; fi")
    }
}

/// Decode the node-directory probe
pub fn decode_install_status(output: &str) -> Option<InstallStatus> {
    match output.trim() {
        INSTALLED => Some(InstallStatus::Installed),
        NOT_INSTALLED => Some(InstallStatus::NotInstalled),
        _ => None,
    }
}

/// Decode the directory-and-executable probe; `None` for unknown output
pub fn decode_executable(output: &str) -> Option<bool> {
    match output.trim() {
        EXE_FOUND => Some(true),
        EXE_MISSING => Some(false),
        _ => None,
    }
}

/// Decode the client-executable probe
pub fn decode_client_executable(output: &str) -> Option<bool> {
    match output.trim() {
        CLIENT_FOUND => Some(true),
        CLIENT_NOT_FOUND => Some(false),
        _ => None,
    }
}

/// Decode the log probe
pub fn decode_log(output: &str) -> LogProbe {
    match output.trim() {
        LOG_NOT_EMPTY => LogProbe::NotEmpty,
        LOG_EMPTY => LogProbe::Empty,
        LOG_NOT_FOUND => LogProbe::NotFound,
        other => LogProbe::Unrecognized(other.to_string()),
    }
}

/// Combine the running probe and the log probe of an installed node.
///
/// `log` is `None` when the log probe command itself failed. A listed
/// session wins over any log classification.
pub fn resolve_status(running: bool, log: Option<&LogProbe>) -> NodeStatus {
    match (running, log) {
        (true, None) => NodeStatus::RunningLogCheckError,
        (true, Some(_)) => NodeStatus::Running,
        (false, None) => NodeStatus::StoppedLogCheckError,
        (false, Some(LogProbe::NotEmpty)) => NodeStatus::StoppedWithLogs,
        (false, Some(LogProbe::Empty)) => NodeStatus::StoppedEmptyLog,
        (false, Some(LogProbe::NotFound)) => NodeStatus::StoppedNoLogs,
        (false, Some(LogProbe::Unrecognized(_))) => NodeStatus::StoppedUnknownLogStatus,
    }
}
