//! Core error types for Massa Warden

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for node management operations
#[derive(Error, Debug)]
pub enum WardenError {
    /// No SSH session is open
    #[error("No active SSH connection")]
    NotConnected,

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Remote command error
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Caller supplied an unusable argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Node directory or executable missing on the server
    #[error("Massa node is not installed or executable missing. Please install it first.")]
    NotInstalled,

    /// No node password has been cached for massa-client
    #[error("Node password is not known. Start or set up the node first.")]
    NodePasswordMissing,

    /// massa-client directory could not be located on the server
    #[error("Could not find massa-client directory")]
    ClientDirNotFound,

    /// A probe printed something it never prints
    #[error("Unexpected output: {0}")]
    UnexpectedOutput(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WardenError {
    /// Combined remote output attached to this error, if any
    pub fn output(&self) -> Option<&str> {
        match self {
            WardenError::Command(
                CommandError::NonZeroExit { output, .. } | CommandError::Signalled { output, .. },
            ) => Some(output),
            _ => None,
        }
    }
}

/// Transport-level errors raised by the SSH layer
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Dial did not complete before the connect timeout
    #[error("Connection to {address} timed out")]
    Timeout { address: String },

    /// TCP connect or SSH handshake failed
    #[error("Failed to dial: {0}")]
    Dial(String),

    /// Server rejected the credentials
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// Opening or driving an exec channel failed
    #[error("Failed to create session: {0}")]
    Channel(String),

    /// Closing the connection failed
    #[error("Error while disconnecting: {0}")]
    Close(String),
}

/// Errors from running a single remote command
#[derive(Error, Debug)]
pub enum CommandError {
    /// Precondition failure, raised without contacting the server
    #[error("No active SSH connection")]
    NotConnected,

    /// The transport failed before the command could finish
    #[error(transparent)]
    Transport(#[from] ConnectionError),

    /// The command ran but exited non-zero; `output` is the combined output
    #[error("Process exited with status {status}")]
    NonZeroExit { status: u32, output: String },

    /// The command was terminated by a signal; `output` is what it printed
    #[error("Process killed by signal {signal}")]
    Signalled { signal: String, output: String },
}

impl CommandError {
    /// Combined output produced before the failure, empty if none
    pub fn output(&self) -> &str {
        match self {
            CommandError::NonZeroExit { output, .. } | CommandError::Signalled { output, .. } => {
                output
            }
            _ => "",
        }
    }
}

/// An operation failure that keeps the transcript gathered so far
#[derive(Error, Debug)]
#[error("{source}")]
pub struct TranscriptError {
    /// Everything logged up to and including the failure
    pub transcript: String,
    /// What went wrong
    #[source]
    pub source: WardenError,
}

impl TranscriptError {
    pub fn new(transcript: impl Into<String>, source: impl Into<WardenError>) -> Self {
        Self {
            transcript: transcript.into(),
            source: source.into(),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
