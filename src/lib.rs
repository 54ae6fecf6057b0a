//! Client library for an audio transcription and diarization service.
//!
//! The server does the heavy lifting (transcription, summarization,
//! statistics); this crate is the upload/progress/render side: it ships an
//! audio file, follows the server-push status channel, and renders the
//! finished artifacts into tab fragments.

pub mod api;
pub mod config;
pub mod controller;
pub mod progress;
pub mod render;
pub mod ui;

pub use api::{ApiError, HttpBackend, TranscribeApi};
pub use config::ClientConfig;
pub use controller::{AudioSelection, FlowOutcome, SessionController};
pub use ui::{ConsoleUi, Tab, UiSink};
