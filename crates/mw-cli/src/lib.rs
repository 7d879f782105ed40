//! massa-warden: command-line front end
//!
//! One-shot commands open an SSH session, run one operation against the
//! Massa node and disconnect; `serve` runs the local IPC daemon instead.

pub mod commands;
pub mod daemon;
pub mod output;
