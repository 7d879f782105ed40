//! IPC server for front-end communication
//!
//! Provides the localhost TCP server that a desktop front end or the CLI
//! uses to drive the warden daemon.

mod server;

pub use server::IpcServer;
