//! Warden configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::{duration_millis, duration_secs};
use crate::error::ConfigError;

/// Default IPC port for the front-end daemon
pub const DEFAULT_IPC_PORT: u16 = 22240;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// SSH dial timeout
    #[serde(with = "duration_secs")]
    pub connect_timeout: Duration,

    /// IPC port for the front end (localhost only)
    pub ipc_port: u16,

    /// Remote installation layout
    pub install: InstallConfig,

    /// Start-up verification policy
    pub startup: StartupConfig,
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            ipc_port: DEFAULT_IPC_PORT,
            install: InstallConfig::default(),
            startup: StartupConfig::default(),
        }
    }
}

impl WardenConfig {
    /// Get the IPC address (localhost:port)
    pub fn ipc_address(&self) -> String {
        format!("127.0.0.1:{}", self.ipc_port)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.startup.backoff.validate()
    }
}

/// Where the node lives on the server and how its sessions are named.
///
/// All paths are remote POSIX paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Base directory; the release archive unpacks into `<base_dir>/massa`
    pub base_dir: String,

    /// Release tag to download
    pub massa_version: String,

    /// Download URL, `{version}` is replaced by `massa_version`
    pub release_url: String,

    /// Screen session running the node
    pub node_screen: String,

    /// Screen session running the client
    pub client_screen: String,

    /// Where the generated setup script is written
    pub setup_script_path: String,

    /// Where the client bridge script is written
    pub client_script_path: String,

    /// Temp file capturing the client transcript
    pub client_result_path: String,

    /// Temp file for screen hardcopy snapshots
    pub log_snapshot_path: String,

    /// Number of snapshot lines returned by `get_logs`
    pub log_tail_lines: u32,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            base_dir: "/root/massa_node".to_string(),
            massa_version: "MAIN.2.4".to_string(),
            release_url: "https://github.com/massalabs/massa/releases/download/{version}/massa_{version}_release_linux.tar.gz".to_string(),
            node_screen: "massa_node".to_string(),
            client_screen: "massa_client".to_string(),
            setup_script_path: "/root/setup_massa_services.sh".to_string(),
            client_script_path: "/tmp/run_massa_client.sh".to_string(),
            client_result_path: "/tmp/massa_client_result.txt".to_string(),
            log_snapshot_path: "/tmp/massa_node_logs.txt".to_string(),
            log_tail_lines: 500,
        }
    }
}

impl InstallConfig {
    /// `<base_dir>/massa`
    pub fn massa_dir(&self) -> String {
        format!("{}/massa", self.base_dir.trim_end_matches('/'))
    }

    pub fn node_dir(&self) -> String {
        format!("{}/massa-node", self.massa_dir())
    }

    pub fn client_dir(&self) -> String {
        format!("{}/massa-client", self.massa_dir())
    }

    pub fn node_executable(&self) -> String {
        format!("{}/massa-node", self.node_dir())
    }

    pub fn client_executable(&self) -> String {
        format!("{}/massa-client", self.client_dir())
    }

    pub fn node_log_path(&self) -> String {
        format!("{}/logs.txt", self.node_dir())
    }

    pub fn node_config_path(&self) -> String {
        format!("{}/config/config.toml", self.node_dir())
    }

    /// Release archive URL for the configured version
    pub fn download_url(&self) -> String {
        self.release_url.replace("{version}", &self.massa_version)
    }
}

/// How long to wait for detached sessions to come up
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StartupConfig {
    /// Deadline for the node session and its first log output
    #[serde(with = "duration_millis")]
    pub node_deadline: Duration,

    /// Deadline for the client session
    #[serde(with = "duration_millis")]
    pub client_deadline: Duration,

    /// Delay schedule between probes
    pub backoff: BackoffConfig,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            node_deadline: Duration::from_secs(8),
            client_deadline: Duration::from_secs(3),
            backoff: BackoffConfig::default(),
        }
    }
}

/// Exponential backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Initial delay
    #[serde(with = "duration_millis")]
    pub initial: Duration,

    /// Maximum delay
    #[serde(with = "duration_millis")]
    pub max: Duration,

    /// Multiplier for each retry
    pub multiplier: f64,

    /// Jitter factor (0.0 to 1.0)
    pub jitter: f64,
}

impl BackoffConfig {
    /// Delays must start positive, never shrink and stay within `max`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial.is_zero() {
            return Err(ConfigError::Invalid(
                "startup.backoff.initial must be greater than zero".to_string(),
            ));
        }
        if self.max < self.initial {
            return Err(ConfigError::Invalid(
                "startup.backoff.max must not be below startup.backoff.initial".to_string(),
            ));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "startup.backoff.multiplier must be a finite number >= 1.0, got {}",
                self.multiplier
            )));
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(ConfigError::Invalid(format!(
                "startup.backoff.jitter must be between 0.0 and 1.0, got {}",
                self.jitter
            )));
        }
        Ok(())
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(250),
            max: Duration::from_secs(2),
            multiplier: 2.0,
            jitter: 0.1,
        }
    }
}
