//! Server resource summary

use std::fmt::Write;

use mw_core::traits::Connector;
use mw_core::{TranscriptError, WardenError};

use crate::manager::NodeManager;

const UPTIME: &str = "uptime -p";
const CPU: &str = "top -bn1 | grep -i 'cpu(s)' | awk '{print $2 + $4 \"%\"}'";
const RAM: &str = "free -m | awk 'NR==2{printf \"%dMB/%dMB (%.1f%%)\", $3,$2,$3*100.0/$2}'";
const DISK: &str = "df -h / | awk 'NR==2{printf \"%s/%s (%s)\", $3,$2,$5}'";
const TOP_PROCESSES: &str = "ps -eo pid,pcpu,pmem,comm --sort=-pcpu | head -n 6";
const SCREEN_LIST: &str = "screen -ls";

/// Shown in place of a metric whose probe failed
pub const METRIC_ERROR: &str = "Error";

/// One snapshot of the server's resource usage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerStats {
    pub uptime: String,
    pub cpu: String,
    pub ram: String,
    pub disk: String,
    pub top_processes: Option<String>,
    pub screen_sessions: Option<String>,
}

impl ServerStats {
    /// Human-readable report
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = writeln!(out, "=== Server Information ===\n");
        let _ = writeln!(out, "Server Uptime: {}", self.uptime);
        let _ = writeln!(out, "CPU Usage: {}", self.cpu);
        let _ = writeln!(out, "RAM Usage: {}", self.ram);
        let _ = writeln!(out, "Disk Usage: {}", self.disk);
        let _ = writeln!(out, "\n=== System Process Information ===\n");
        if let Some(top) = &self.top_processes {
            let _ = writeln!(out, "Top Processes (by CPU):\n{}", top);
        }
        match &self.screen_sessions {
            Some(sessions) => {
                let _ = writeln!(out, "Active Screen Sessions:\n{}", sessions);
            }
            None => out.push_str("No active screen sessions found.\n"),
        }
        out
    }
}

impl<C: Connector> NodeManager<C> {
    /// Collect uptime, CPU, RAM, disk, top processes and screen sessions.
    ///
    /// Failed metrics show as `Error`; the first failure is returned as the
    /// error with the rendered report attached.
    pub async fn get_server_stats(&self) -> Result<String, TranscriptError> {
        if !self.is_connected() {
            return Err(TranscriptError::new(
                "Error: No active SSH connection.\n",
                WardenError::NotConnected,
            ));
        }

        let mut first_error = None;
        let stats = ServerStats {
            uptime: self.metric("Uptime", UPTIME, &mut first_error).await,
            cpu: self.metric("CPU Usage", CPU, &mut first_error).await,
            ram: self.metric("RAM Usage", RAM, &mut first_error).await,
            disk: self.metric("Disk Root", DISK, &mut first_error).await,
            top_processes: self.run_command(TOP_PROCESSES).await.ok(),
            screen_sessions: self.screen_sessions().await,
        };

        let report = stats.render();
        tracing::debug!("Server stats fetched");
        match first_error {
            Some(e) => Err(TranscriptError::new(report, e)),
            None => Ok(report),
        }
    }

    async fn metric(
        &self,
        name: &str,
        command: &str,
        first_error: &mut Option<WardenError>,
    ) -> String {
        match self.run_command(command).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Error fetching {}: {}", name, e);
                if first_error.is_none() {
                    *first_error = Some(e.into());
                }
                METRIC_ERROR.to_string()
            }
        }
    }

    /// `screen -ls` exits non-zero even when it lists sessions, so the
    /// listing is judged by its content
    async fn screen_sessions(&self) -> Option<String> {
        let output = match self.run_command(SCREEN_LIST).await {
            Ok(output) => output,
            Err(e) => e.output().to_string(),
        };
        output.contains("Socket").then_some(output)
    }
}
