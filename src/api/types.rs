// api/types.rs
// Server payload shapes and API error definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transport and decoding errors for the transcription API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Finished transcript, one string per speaker turn.
///
/// The server answers with `{conversation: [...]}` once processing is done,
/// or `{error: "..."}` before that.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptPayload {
    #[serde(default)]
    pub conversation: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Per-speaker summaries as two parallel columns, indexed by position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryPayload {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(rename = "Speaker", default)]
    pub speakers: Vec<String>,
    #[serde(rename = "Summary", default)]
    pub summaries: Vec<String>,
}

/// Session statistics: duration, total word count, and words per speaker.
/// `words_by_speaker` keeps the server's key order (rendering is
/// insertion-order).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsPayload {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub audio_duration: f64,
    #[serde(default)]
    pub total_words: u64,
    #[serde(default)]
    pub words_by_speaker: serde_json::Map<String, serde_json::Value>,
}

impl StatsPayload {
    /// Word counts per speaker in the payload's own key order.
    /// `None` if any count is not a non-negative integer.
    pub fn speaker_counts(&self) -> Option<Vec<(String, u64)>> {
        self.words_by_speaker
            .iter()
            .map(|(speaker, value)| value.as_u64().map(|count| (speaker.clone(), count)))
            .collect()
    }
}
