//! Scripted in-memory transport for engine tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use mw_core::config::WardenConfig;
use mw_core::traits::{Connector, RemoteSession};
use mw_core::{CommandOutput, ConnectTarget, ConnectionError};
use mw_remote::NodeManager;

enum Matcher {
    Contains(String),
    Exact(String),
}

enum Reply {
    Output(CommandOutput),
    TransportError,
}

/// How the fake server answers commands matching a pattern
pub struct Rule {
    matcher: Matcher,
    reply: Reply,
    once: bool,
}

impl Rule {
    /// Matches any command containing `pattern`; replies empty, exit 0
    pub fn contains(pattern: &str) -> Self {
        Self {
            matcher: Matcher::Contains(pattern.to_string()),
            reply: Reply::Output(CommandOutput {
                exit_status: Some(0),
                ..Default::default()
            }),
            once: false,
        }
    }

    pub fn exact(command: &str) -> Self {
        Self {
            matcher: Matcher::Exact(command.to_string()),
            ..Self::contains("")
        }
    }

    pub fn stdout(mut self, stdout: &str) -> Self {
        if let Reply::Output(output) = &mut self.reply {
            output.stdout = stdout.to_string();
        }
        self
    }

    pub fn stderr(mut self, stderr: &str) -> Self {
        if let Reply::Output(output) = &mut self.reply {
            output.stderr = stderr.to_string();
        }
        self
    }

    pub fn exit(mut self, status: u32) -> Self {
        if let Reply::Output(output) = &mut self.reply {
            output.exit_status = Some(status);
        }
        self
    }

    /// Command is terminated by `signal` instead of exiting
    pub fn killed_by(mut self, signal: &str) -> Self {
        if let Reply::Output(output) = &mut self.reply {
            output.exit_status = None;
            output.exit_signal = Some(signal.to_string());
        }
        self
    }

    /// Channel closes without reporting an exit status
    pub fn no_status(mut self) -> Self {
        if let Reply::Output(output) = &mut self.reply {
            output.exit_status = None;
        }
        self
    }

    pub fn transport_error(mut self) -> Self {
        self.reply = Reply::TransportError;
        self
    }

    /// Consumed after the first match
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    fn matches(&self, command: &str) -> bool {
        match &self.matcher {
            Matcher::Contains(pattern) => command.contains(pattern.as_str()),
            Matcher::Exact(expected) => command == expected,
        }
    }
}

#[derive(Default)]
struct ServerState {
    rules: Vec<Rule>,
    executed: Vec<String>,
    connects: Vec<(ConnectTarget, String)>,
    closes: usize,
    refuse_connections: bool,
    fail_close: bool,
}

/// Shared handle to the fake server's rules and recordings
#[derive(Clone, Default)]
pub struct FakeServer {
    state: Arc<Mutex<ServerState>>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later rules take precedence over earlier ones
    pub fn add(&self, rule: Rule) -> &Self {
        self.state.lock().unwrap().rules.push(rule);
        self
    }

    pub fn refuse_connections(&self) {
        self.state.lock().unwrap().refuse_connections = true;
    }

    pub fn fail_close(&self) {
        self.state.lock().unwrap().fail_close = true;
    }

    pub fn executed(&self) -> Vec<String> {
        self.state.lock().unwrap().executed.clone()
    }

    pub fn executed_matching(&self, pattern: &str) -> Vec<String> {
        self.executed()
            .into_iter()
            .filter(|c| c.contains(pattern))
            .collect()
    }

    pub fn connects(&self) -> Vec<(ConnectTarget, String)> {
        self.state.lock().unwrap().connects.clone()
    }

    pub fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }

    fn exec(&self, command: &str) -> Result<CommandOutput, ConnectionError> {
        let mut state = self.state.lock().unwrap();
        state.executed.push(command.to_string());

        let Some(index) = state.rules.iter().rposition(|rule| rule.matches(command)) else {
            return Ok(CommandOutput {
                exit_status: Some(0),
                ..Default::default()
            });
        };
        let reply = match &state.rules[index].reply {
            Reply::Output(output) => Ok(output.clone()),
            Reply::TransportError => Err(ConnectionError::Channel("channel closed".to_string())),
        };
        if state.rules[index].once {
            state.rules.remove(index);
        }
        reply
    }
}

pub struct FakeConnector {
    server: FakeServer,
}

pub struct FakeSession {
    server: FakeServer,
}

#[async_trait]
impl Connector for FakeConnector {
    type Session = FakeSession;

    async fn connect(
        &self,
        target: &ConnectTarget,
        password: &str,
    ) -> Result<FakeSession, ConnectionError> {
        let mut state = self.server.state.lock().unwrap();
        if state.refuse_connections {
            return Err(ConnectionError::Dial("connection refused".to_string()));
        }
        state.connects.push((target.clone(), password.to_string()));
        Ok(FakeSession {
            server: self.server.clone(),
        })
    }
}

#[async_trait]
impl RemoteSession for FakeSession {
    async fn exec(&self, command: &str) -> Result<CommandOutput, ConnectionError> {
        self.server.exec(command)
    }

    async fn close(&self) -> Result<(), ConnectionError> {
        let mut state = self.server.state.lock().unwrap();
        state.closes += 1;
        if state.fail_close {
            return Err(ConnectionError::Close("broken pipe".to_string()));
        }
        Ok(())
    }
}

/// Manager wired to a fresh fake server
pub fn manager() -> (NodeManager<FakeConnector>, FakeServer) {
    manager_with_config(WardenConfig::default())
}

pub fn manager_with_config(config: WardenConfig) -> (NodeManager<FakeConnector>, FakeServer) {
    let server = FakeServer::new();
    let connector = FakeConnector {
        server: server.clone(),
    };
    (NodeManager::new(connector, config), server)
}

/// Manager already connected to `node.example:22` as root
pub async fn connected_manager() -> (NodeManager<FakeConnector>, FakeServer) {
    let (mut manager, server) = manager();
    manager
        .connect("node.example", 22, "root", "ssh-secret")
        .await
        .unwrap();
    (manager, server)
}
