//! Client side of the local daemon protocol
//!
//! Talks JSON lines over TCP on localhost to a running `massa-warden serve`.

mod client;

pub use client::DaemonClient;
pub use mw_core::ipc::{default_ipc_address, IpcRequest, IpcResponse};
