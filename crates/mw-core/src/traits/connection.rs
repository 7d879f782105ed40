//! Connection traits

use async_trait::async_trait;

use crate::error::ConnectionError;
use crate::types::{CommandOutput, ConnectTarget};

/// An authenticated connection able to run one command per call
#[async_trait]
pub trait RemoteSession: Send + Sync {
    /// Run `command` in a fresh exec context and collect both streams.
    ///
    /// A non-zero exit status is reported through
    /// [`CommandOutput::exit_status`], not as an error.
    async fn exec(&self, command: &str) -> Result<CommandOutput, ConnectionError>;

    /// Close the connection
    async fn close(&self) -> Result<(), ConnectionError>;
}

/// Dials new sessions
#[async_trait]
pub trait Connector: Send + Sync {
    /// The session type produced by this connector
    type Session: RemoteSession;

    /// Open and authenticate a session with a password
    async fn connect(
        &self,
        target: &ConnectTarget,
        password: &str,
    ) -> Result<Self::Session, ConnectionError>;
}
