//! Output formatting utilities for the CLI
//!
//! Status tables, operation transcripts and colored status messages.

use tabled::{settings::Style, Table, Tabled};

use mw_core::{ConnectTarget, InstallStatus, NodeStatus};

/// One-line explanation of a node status for humans
pub fn describe_status(status: NodeStatus) -> &'static str {
    match status {
        NodeStatus::NotInstalled => "node directory or executable is missing",
        NodeStatus::Running => "node screen session is running",
        NodeStatus::RunningLogCheckError => "running, but the log file could not be checked",
        NodeStatus::StoppedWithLogs => "stopped; the log file has content",
        NodeStatus::StoppedEmptyLog => "stopped; the log file is empty",
        NodeStatus::StoppedNoLogs => "stopped; no log file yet",
        NodeStatus::StoppedLogCheckError => "stopped, and the log file could not be checked",
        NodeStatus::StoppedUnknownLogStatus => "stopped; the log probe returned unexpected output",
    }
}

/// Format the status of a node as a table
pub fn format_node_status(target: &ConnectTarget, status: NodeStatus) -> String {
    #[derive(Tabled)]
    struct StatusRow {
        #[tabled(rename = "SERVER")]
        server: String,
        #[tabled(rename = "STATUS")]
        status: &'static str,
        #[tabled(rename = "DETAILS")]
        details: &'static str,
    }

    let rows = vec![StatusRow {
        server: target.to_string(),
        status: status.as_str(),
        details: describe_status(status),
    }];

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Format the installation check result
pub fn format_install_status(target: &ConnectTarget, status: InstallStatus) -> String {
    match status {
        InstallStatus::Installed => format!("Massa node is installed on {}", target),
        InstallStatus::NotInstalled => format!(
            "Massa node is not installed on {}. Run 'massa-warden setup' to install it",
            target
        ),
    }
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an error message in red with an X prefix
///
/// Goes to stderr.
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning message in yellow, to stderr
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Yellow),
        Print("⚠ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an informational message in cyan
pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}
