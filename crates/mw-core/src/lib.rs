//! mw-core: Core abstractions and configuration for Massa Warden
//!
//! This crate provides the shared types, probe decoding, transport traits
//! and configuration used by the engine, the daemon and the CLI.

pub mod config;
pub mod error;
pub mod ipc;
pub mod probe;
pub mod screen;
pub mod traits;
pub mod types;

pub use error::{CommandError, ConnectionError, TranscriptError, WardenError};
pub use types::{ClientCommand, CommandOutput, ConnectTarget, InstallStatus, NodeStatus};
