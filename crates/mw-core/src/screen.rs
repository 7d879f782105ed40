//! Screen command builder and shell quoting.
//!
//! Builds `screen` CLI command strings without executing them; the caller
//! runs them over SSH.

/// Builds `screen` command strings for named detached sessions
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenCommandBuilder;

impl ScreenCommandBuilder {
    pub fn new() -> Self {
        ScreenCommandBuilder
    }

    /// `screen -list`
    pub fn list(&self) -> String {
        "screen -list".to_string()
    }

    /// `screen -list | grep -q <name>`; exits 0 only when the session is listed
    pub fn is_listed(&self, name: &str) -> String {
        format!("screen -list | grep -q {}", shell_quote(name))
    }

    /// `cd <cwd> && screen -dmS <name> /bin/bash -c <command>`
    pub fn start_detached(&self, name: &str, cwd: &str, command: &str) -> String {
        format!(
            "cd {} && screen -dmS {} /bin/bash -c {}",
            shell_quote(cwd),
            shell_quote(name),
            shell_quote(command)
        )
    }

    /// `screen -S <name> -X quit`
    pub fn quit(&self, name: &str) -> String {
        format!("screen -S {} -X quit", shell_quote(name))
    }

    /// `screen -S <name> -X hardcopy <path>`
    pub fn hardcopy(&self, name: &str, path: &str) -> String {
        format!(
            "screen -S {} -X hardcopy {}",
            shell_quote(name),
            shell_quote(path)
        )
    }
}

/// Quote a value for a POSIX shell.
///
/// Plain tokens are returned bare; anything else is wrapped in single quotes
/// with embedded quotes written as `'\''`.
pub fn shell_quote(value: &str) -> String {
    if value.is_empty() {
        return "''".to_string();
    }
    if value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '='))
    {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', "'\\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_quote_plain() {
        assert_eq!(shell_quote("massa_node"), "massa_node");
        assert_eq!(shell_quote("/root/massa_node/logs.txt"), "/root/massa_node/logs.txt");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn test_shell_quote_special() {
        assert_eq!(shell_quote("p@ss word"), "'p@ss word'");
        assert_eq!(shell_quote("it's"), "'it'\\''s'");
        assert_eq!(shell_quote("$(reboot)"), "'$(reboot)'");
    }

    #[test]
    fn test_start_detached() {
        let cmd = ScreenCommandBuilder::new().start_detached(
            "massa_node",
            "/root/massa_node/massa/massa-node",
            "./massa-node -p 'pw' |& tee logs.txt",
        );
        assert_eq!(
            cmd,
            "cd /root/massa_node/massa/massa-node && screen -dmS massa_node /bin/bash -c './massa-node -p '\\''pw'\\'' |& tee logs.txt'"
        );
    }

    #[test]
    fn test_listing_and_control() {
        let screen = ScreenCommandBuilder::new();
        assert_eq!(screen.list(), "screen -list");
        assert_eq!(screen.is_listed("massa_node"), "screen -list | grep -q massa_node");
        assert_eq!(screen.quit("massa_client"), "screen -S massa_client -X quit");
        assert_eq!(
            screen.hardcopy("massa_node", "/tmp/snap.txt"),
            "screen -S massa_node -X hardcopy /tmp/snap.txt"
        );
    }
}
