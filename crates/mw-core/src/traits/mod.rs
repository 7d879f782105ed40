//! Core trait definitions

mod connection;
mod transcript;

pub use connection::{Connector, RemoteSession};
pub use transcript::{MarkerTranscriptParser, TranscriptParser};
