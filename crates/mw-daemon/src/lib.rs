//! mw-daemon: Local daemon serving node management over IPC
//!
//! Holds the single [`NodeManager`](mw_remote::NodeManager) and answers
//! JSON-line requests from a front end on localhost. Requests are
//! serialised through one lock, so remote commands never interleave.

pub mod ipc;
pub mod state;

pub use state::DaemonState;
