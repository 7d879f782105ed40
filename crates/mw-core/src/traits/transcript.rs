//! Extraction of command results from interactive client transcripts
//!
//! `massa-client` has no machine-readable mode, so a command's result is
//! cut out of the raw terminal transcript. The rules live behind
//! [`TranscriptParser`] so they can change without touching the transport.

/// Turns a raw client transcript into the issued command's result
pub trait TranscriptParser: Send + Sync {
    /// Extract the result of `command_name` from `transcript`
    fn extract(&self, transcript: &str, command_name: &str) -> String;
}

/// Marker-driven line filter.
///
/// A line containing a start marker (the password prompt or the command's
/// own name) turns recording on, a line containing the stop marker turns it
/// off. Marker lines themselves are never kept.
#[derive(Debug, Clone)]
pub struct MarkerTranscriptParser {
    /// Prompt lines that precede the result
    pub prompt_markers: Vec<String>,
    /// Directive that ends the session
    pub stop_marker: String,
}

impl Default for MarkerTranscriptParser {
    fn default() -> Self {
        Self {
            prompt_markers: vec!["Enter password:".to_string()],
            stop_marker: "exit".to_string(),
        }
    }
}

impl TranscriptParser for MarkerTranscriptParser {
    fn extract(&self, transcript: &str, command_name: &str) -> String {
        let mut kept = Vec::new();
        let mut recording = false;

        for line in transcript.lines() {
            let starts = self.prompt_markers.iter().any(|m| line.contains(m.as_str()))
                || (!command_name.is_empty() && line.contains(command_name));
            if starts {
                recording = true;
                continue;
            }

            if line.contains(self.stop_marker.as_str()) {
                recording = false;
                continue;
            }

            if recording {
                kept.push(line);
            }
        }

        kept.join("\n")
    }
}
