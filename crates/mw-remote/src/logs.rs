//! Node log snapshot

use mw_core::screen::shell_quote;
use mw_core::traits::Connector;
use mw_core::CommandError;

use crate::manager::NodeManager;

pub const NODE_SCREEN_NOT_FOUND: &str = "Massa node screen session not found.";
pub const SNAPSHOT_FAILED: &str = "Error: Failed to create logs snapshot.";

impl<C: Connector> NodeManager<C> {
    /// Last lines of the node screen's scrollback, via `screen -X hardcopy`
    pub async fn get_logs(&self) -> Result<String, CommandError> {
        tracing::debug!("Fetching Massa node logs");
        let output = self.run_command(&self.log_snapshot_command()).await?;
        tracing::debug!("Fetched {} lines of node logs", output.lines().count());
        Ok(output)
    }

    fn log_snapshot_command(&self) -> String {
        let install = &self.config().install;
        let snapshot = shell_quote(&install.log_snapshot_path);
        format!(
            "if {listed}; then {hardcopy}; sleep 0.5; if [ -f {snapshot} ]; then tail -n {lines} {snapshot}; rm -f {snapshot}; else echo {failed}; fi; else echo {missing}; fi",
            listed = self.screen.is_listed(&install.node_screen),
            hardcopy = self.screen.hardcopy(&install.node_screen, &install.log_snapshot_path),
            lines = install.log_tail_lines,
            failed = shell_quote(SNAPSHOT_FAILED),
            missing = shell_quote(NODE_SCREEN_NOT_FOUND),
        )
    }
}
