//! mw-remote: Massa node management engine
//!
//! Owns the SSH session to a node server and implements every remote
//! operation on top of a single command primitive: installing and starting
//! the node, probing its status, fetching logs and server stats, and
//! bridging wallet and staking commands to `massa-client`.

pub mod backoff;
mod bridge;
pub mod installer;
pub mod logs;
mod manager;
pub mod oplog;
mod prober;
pub mod ssh;
mod starter;
pub mod stats;

pub use backoff::ExponentialBackoff;
pub use manager::NodeManager;
pub use ssh::{SshConnector, SshSession};
pub use stats::ServerStats;

/// Engine wired to the real SSH transport
pub type SshNodeManager = NodeManager<SshConnector>;
