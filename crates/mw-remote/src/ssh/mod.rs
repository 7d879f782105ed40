//! SSH transport
//!
//! Password-authenticated russh client with one exec channel per command.

mod connector;

pub use connector::{ClientHandler, SshConnector, SshSession};
