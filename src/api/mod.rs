use async_trait::async_trait;
use futures_util::Stream;
use std::pin::Pin;

pub mod client;
pub mod types;

pub use client::HttpBackend;
pub use types::{ApiError, StatsPayload, SummaryPayload, TranscriptPayload};

/// Raw byte chunks from the server-push progress channel.
pub type ProgressStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, ApiError>> + Send>>;

/// Everything the controller needs from the transcription server.
///
/// The production implementation is [`HttpBackend`]; tests swap in a mock.
#[async_trait]
pub trait TranscribeApi: Send + Sync {
    /// Uploads one audio file as a multipart form (field name `file`).
    /// The response body is not consumed; the server starts processing
    /// and reports through the progress channel.
    async fn upload_audio(&self, file_name: &str, bytes: Vec<u8>) -> Result<(), ApiError>;

    /// Opens the long-lived status channel for the current upload.
    async fn open_progress(&self) -> Result<ProgressStream, ApiError>;

    async fn fetch_transcript(&self) -> Result<TranscriptPayload, ApiError>;

    async fn fetch_summary(&self) -> Result<SummaryPayload, ApiError>;

    async fn fetch_stats(&self) -> Result<StatsPayload, ApiError>;
}
