//! Line-oriented transcript of a multi-step operation

use mw_core::{TranscriptError, WardenError};

/// Accumulates the human-readable log returned by long operations
#[derive(Debug, Default)]
pub struct OperationLog {
    text: String,
}

impl OperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line
    pub fn line(&mut self, line: impl AsRef<str>) {
        self.text.push_str(line.as_ref());
        self.text.push('\n');
    }

    /// Append one line and mirror it as a warning
    pub fn warn(&mut self, line: impl AsRef<str>) {
        tracing::warn!("{}", line.as_ref());
        self.line(line);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Stop here, carrying everything logged so far
    pub fn fail(self, source: impl Into<WardenError>) -> TranscriptError {
        TranscriptError::new(self.text, source)
    }
}
