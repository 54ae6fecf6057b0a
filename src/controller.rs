//! Upload/progress/render orchestration.
//!
//! One flow per trigger: upload the selected file, follow the progress
//! channel until the completion sentinel or a transport error, then fetch
//! and render the transcript. Summary and stats tabs are fetched lazily on
//! demand. Every failure path ends in a rendered message and a restored
//! interactive state; no error crosses the UI boundary.

use crate::api::TranscribeApi;
use crate::progress::{ListenerState, ProgressChannel, ProgressEvent};
use crate::render;
use crate::ui::{Tab, UiSink};
use futures_util::StreamExt;
use uuid::Uuid;

pub const NO_FILE_ALERT: &str = "Please select a file first.";
pub const UPLOAD_ACK: &str = "File uploaded successfully. Processing started...";

const UPLOAD_FAILED: &str =
    "Error: Failed to upload or process the audio file. Please try again or contact support if the issue persists.";
const STREAM_FAILED: &str =
    "Error: Failed to process the audio file. Please try again or contact support if the issue persists.";
const TRANSCRIPT_FAILED: &str = "Error: Failed to fetch transcription. Please try again.";

/// The user's file selection at trigger time. Dropped once the upload
/// request resolves.
pub struct AudioSelection {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    Completed,
    Failed,
    NoFileSelected,
    AlreadyRunning,
}

pub struct SessionController<A: TranscribeApi, U: UiSink> {
    api: A,
    ui: U,
    in_flight: bool,
    tab_seq: u64,
}

impl<A: TranscribeApi, U: UiSink> SessionController<A, U> {
    pub fn new(api: A, ui: U) -> Self {
        Self {
            api,
            ui,
            in_flight: false,
            tab_seq: 0,
        }
    }

    /// Runs one full upload/progress/fetch flow. With no selection, shows a
    /// blocking alert and performs no network action. Only one flow may be
    /// in flight at a time; the trigger control stays disabled for its
    /// duration and is restored exactly once on every exit path.
    pub async fn start(&mut self, selection: Option<AudioSelection>) -> FlowOutcome {
        let Some(selection) = selection else {
            self.ui.alert(NO_FILE_ALERT);
            return FlowOutcome::NoFileSelected;
        };

        if self.in_flight {
            tracing::warn!("Upload already in flight, ignoring trigger");
            return FlowOutcome::AlreadyRunning;
        }

        self.in_flight = true;
        self.ui.set_trigger_enabled(false);
        self.ui.set_busy(true);
        self.ui.clear_status();
        self.ui.append_status(UPLOAD_ACK);

        let session_id = Uuid::new_v4();
        tracing::info!("Session {}: uploading {}", session_id, selection.file_name);

        let outcome = self.run_session(selection).await;

        self.ui.set_busy(false);
        self.ui.set_trigger_enabled(true);
        self.in_flight = false;

        tracing::info!("Session {} finished: {:?}", session_id, outcome);
        outcome
    }

    async fn run_session(&mut self, selection: AudioSelection) -> FlowOutcome {
        if let Err(e) = self
            .api
            .upload_audio(&selection.file_name, selection.bytes)
            .await
        {
            tracing::error!("Upload failed: {}", e);
            self.ui.append_status(UPLOAD_FAILED);
            return FlowOutcome::Failed;
        }

        let mut stream = match self.api.open_progress().await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!("Failed to open progress channel: {}", e);
                self.ui.append_status(UPLOAD_FAILED);
                return FlowOutcome::Failed;
            }
        };

        let mut channel = ProgressChannel::new();
        channel.open();

        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => {
                    for event in channel.feed(&bytes) {
                        match event {
                            ProgressEvent::Status(text) => self.ui.append_status(&text),
                            ProgressEvent::Completed => {}
                        }
                    }
                    if channel.state() == ListenerState::Completed {
                        channel.close();
                        self.fetch_and_render_transcript().await;
                        return FlowOutcome::Completed;
                    }
                }
                Err(e) => {
                    tracing::error!("Progress stream failed: {}", e);
                    channel.fail();
                    channel.close();
                    self.ui.append_status(STREAM_FAILED);
                    return FlowOutcome::Failed;
                }
            }
        }

        // Stream ended without the sentinel: the server dropped the
        // connection mid-processing.
        if channel.fail() {
            tracing::error!("Progress stream closed before completion");
            self.ui.append_status(STREAM_FAILED);
        }
        FlowOutcome::Failed
    }

    async fn fetch_and_render_transcript(&mut self) {
        match self.api.fetch_transcript().await {
            Ok(payload) => match payload.conversation.as_deref() {
                Some(conversation) => {
                    tracing::info!("Transcript fetched: {} turns", conversation.len());
                    let html = render::render_transcript(conversation);
                    self.ui.show_tab(Tab::Transcript, &html);
                }
                None => {
                    if let Some(error) = payload.error.as_deref() {
                        tracing::warn!("Transcript unavailable: {}", error);
                    }
                    self.ui.append_status(TRANSCRIPT_FAILED);
                }
            },
            Err(e) => {
                tracing::error!("Transcript fetch failed: {}", e);
                self.ui.append_status(TRANSCRIPT_FAILED);
            }
        }
    }

    /// Fetches and renders one tab on demand. Tab fetches are independent
    /// of the upload flow and of each other; a failure only touches that
    /// tab's content area. Responses carry a monotonic sequence number so
    /// a late response never overwrites a newer one (last-write-wins).
    pub async fn show_tab(&mut self, tab: Tab) {
        let seq = self.begin_tab_request();

        let html = match tab {
            Tab::Transcript => match self.api.fetch_transcript().await {
                Ok(payload) => match payload.conversation.as_deref() {
                    Some(conversation) => render::render_transcript(conversation),
                    None => fetch_failed_fragment(tab),
                },
                Err(e) => {
                    tracing::error!("Error fetching {}: {}", tab.label(), e);
                    fetch_failed_fragment(tab)
                }
            },
            Tab::Summary => match self.api.fetch_summary().await {
                Ok(payload) => render::render_summary(&payload),
                Err(e) => {
                    tracing::error!("Error fetching {}: {}", tab.label(), e);
                    fetch_failed_fragment(tab)
                }
            },
            Tab::Stats => match self.api.fetch_stats().await {
                Ok(payload) => render::render_stats(&payload),
                Err(e) => {
                    tracing::error!("Error fetching {}: {}", tab.label(), e);
                    fetch_failed_fragment(tab)
                }
            },
        };

        self.apply_tab_response(tab, seq, html);
    }

    fn begin_tab_request(&mut self) -> u64 {
        self.tab_seq += 1;
        self.tab_seq
    }

    fn apply_tab_response(&mut self, tab: Tab, seq: u64, html: String) {
        if seq != self.tab_seq {
            tracing::debug!(
                "Discarding stale {} response (seq {}, newest {})",
                tab.label(),
                seq,
                self.tab_seq
            );
            return;
        }
        self.ui.show_tab(tab, &html);
    }
}

fn fetch_failed_fragment(tab: Tab) -> String {
    format!(
        "<p>Failed to fetch {}. Please try again or contact support if the issue persists.</p>",
        tab.label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, ProgressStream, StatsPayload, SummaryPayload, TranscriptPayload};
    use async_trait::async_trait;
    use futures_util::stream;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Copy)]
    enum MockChunk {
        Data(&'static str),
        Error,
    }

    #[derive(Default)]
    struct MockApi {
        calls: Arc<Mutex<Vec<&'static str>>>,
        fail_upload: bool,
        chunks: Vec<MockChunk>,
        transcript: Option<TranscriptPayload>,
        summary: Option<SummaryPayload>,
        stats: Option<StatsPayload>,
    }

    impl MockApi {
        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TranscribeApi for MockApi {
        async fn upload_audio(&self, _file_name: &str, _bytes: Vec<u8>) -> Result<(), ApiError> {
            self.record("upload");
            if self.fail_upload {
                Err(ApiError::Network("mock upload failure".to_string()))
            } else {
                Ok(())
            }
        }

        async fn open_progress(&self) -> Result<ProgressStream, ApiError> {
            self.record("progress");
            let items: Vec<Result<Vec<u8>, ApiError>> = self
                .chunks
                .iter()
                .map(|chunk| match chunk {
                    MockChunk::Data(text) => Ok(text.as_bytes().to_vec()),
                    MockChunk::Error => Err(ApiError::Network("mock stream failure".to_string())),
                })
                .collect();
            Ok(Box::pin(stream::iter(items)))
        }

        async fn fetch_transcript(&self) -> Result<TranscriptPayload, ApiError> {
            self.record("transcript");
            self.transcript
                .clone()
                .ok_or_else(|| ApiError::Network("mock transcript failure".to_string()))
        }

        async fn fetch_summary(&self) -> Result<SummaryPayload, ApiError> {
            self.record("summary");
            self.summary
                .clone()
                .ok_or_else(|| ApiError::Network("mock summary failure".to_string()))
        }

        async fn fetch_stats(&self) -> Result<StatsPayload, ApiError> {
            self.record("stats");
            self.stats
                .clone()
                .ok_or_else(|| ApiError::Network("mock stats failure".to_string()))
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum UiEvent {
        Alert(String),
        Status(String),
        Cleared,
        Busy(bool),
        Trigger(bool),
        Tab(Tab, String),
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Vec<UiEvent>,
    }

    impl UiSink for RecordingSink {
        fn alert(&mut self, message: &str) {
            self.events.push(UiEvent::Alert(message.to_string()));
        }

        fn append_status(&mut self, line: &str) {
            self.events.push(UiEvent::Status(line.to_string()));
        }

        fn clear_status(&mut self) {
            self.events.push(UiEvent::Cleared);
        }

        fn set_busy(&mut self, busy: bool) {
            self.events.push(UiEvent::Busy(busy));
        }

        fn set_trigger_enabled(&mut self, enabled: bool) {
            self.events.push(UiEvent::Trigger(enabled));
        }

        fn show_tab(&mut self, tab: Tab, html: &str) {
            self.events.push(UiEvent::Tab(tab, html.to_string()));
        }
    }

    fn selection() -> Option<AudioSelection> {
        Some(AudioSelection {
            file_name: "meeting.wav".to_string(),
            bytes: vec![0u8; 16],
        })
    }

    fn transcript_payload() -> TranscriptPayload {
        TranscriptPayload {
            conversation: Some(vec!["A: hi".to_string(), "B: hello".to_string()]),
            error: None,
        }
    }

    fn statuses(events: &[UiEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|event| match event {
                UiEvent::Status(line) => Some(line.clone()),
                _ => None,
            })
            .collect()
    }

    fn count(events: &[UiEvent], wanted: &UiEvent) -> usize {
        events.iter().filter(|event| *event == wanted).count()
    }

    #[tokio::test]
    async fn no_selection_alerts_without_any_network_call() {
        let api = MockApi::default();
        let calls = api.calls.clone();
        let mut controller = SessionController::new(api, RecordingSink::default());

        let outcome = controller.start(None).await;

        assert_eq!(outcome, FlowOutcome::NoFileSelected);
        assert_eq!(
            controller.ui.events,
            vec![UiEvent::Alert(NO_FILE_ALERT.to_string())]
        );
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn happy_path_streams_statuses_and_renders_transcript() {
        let api = MockApi {
            chunks: vec![
                MockChunk::Data("data: status: Loading model...\n"),
                MockChunk::Data("data: status: Transcribing audio...\ndata: status: Processing complete!\n"),
            ],
            transcript: Some(transcript_payload()),
            ..MockApi::default()
        };
        let calls = api.calls.clone();
        let mut controller = SessionController::new(api, RecordingSink::default());

        let outcome = controller.start(selection()).await;

        assert_eq!(outcome, FlowOutcome::Completed);
        assert_eq!(
            calls.lock().unwrap().as_slice(),
            ["upload", "progress", "transcript"]
        );

        let events = &controller.ui.events;
        assert_eq!(
            statuses(events),
            vec![
                UPLOAD_ACK.to_string(),
                "Loading model...".to_string(),
                "Transcribing audio...".to_string(),
                "Processing complete!".to_string(),
            ]
        );

        // Busy from trigger until resolution, restored exactly once.
        assert_eq!(events.first(), Some(&UiEvent::Trigger(false)));
        assert_eq!(events.get(1), Some(&UiEvent::Busy(true)));
        assert_eq!(count(events, &UiEvent::Busy(false)), 1);
        assert_eq!(count(events, &UiEvent::Trigger(true)), 1);
        assert_eq!(events.last(), Some(&UiEvent::Trigger(true)));

        let transcript = events.iter().find_map(|event| match event {
            UiEvent::Tab(Tab::Transcript, html) => Some(html.clone()),
            _ => None,
        });
        let html = transcript.expect("transcript tab rendered");
        let first = html.find("A: hi").expect("first turn rendered");
        let second = html.find("B: hello").expect("second turn rendered");
        assert!(first < second);
    }

    #[tokio::test]
    async fn transport_error_unlocks_ui_without_fetching_transcript() {
        let api = MockApi {
            chunks: vec![
                MockChunk::Data("data: status: Transcribing audio...\n"),
                MockChunk::Error,
            ],
            transcript: Some(transcript_payload()),
            ..MockApi::default()
        };
        let calls = api.calls.clone();
        let mut controller = SessionController::new(api, RecordingSink::default());

        let outcome = controller.start(selection()).await;

        assert_eq!(outcome, FlowOutcome::Failed);
        assert!(!calls.lock().unwrap().contains(&"transcript"));

        let events = &controller.ui.events;
        assert!(statuses(events).contains(&STREAM_FAILED.to_string()));
        assert_eq!(count(events, &UiEvent::Busy(false)), 1);
        assert_eq!(count(events, &UiEvent::Trigger(true)), 1);
    }

    #[tokio::test]
    async fn stream_end_without_sentinel_is_a_failure() {
        // Trailing space on the sentinel: appended as a status line but the
        // flow must not complete.
        let api = MockApi {
            chunks: vec![MockChunk::Data("data: status: Processing complete! \n")],
            transcript: Some(transcript_payload()),
            ..MockApi::default()
        };
        let calls = api.calls.clone();
        let mut controller = SessionController::new(api, RecordingSink::default());

        let outcome = controller.start(selection()).await;

        assert_eq!(outcome, FlowOutcome::Failed);
        assert!(!calls.lock().unwrap().contains(&"transcript"));

        let lines = statuses(&controller.ui.events);
        assert!(lines.contains(&"Processing complete! ".to_string()));
        assert!(lines.contains(&STREAM_FAILED.to_string()));
    }

    #[tokio::test]
    async fn missing_conversation_field_renders_error_and_unlocks() {
        let api = MockApi {
            chunks: vec![MockChunk::Data("data: status: Processing complete!\n")],
            transcript: Some(TranscriptPayload {
                conversation: None,
                error: Some("Transcription not available.".to_string()),
            }),
            ..MockApi::default()
        };
        let mut controller = SessionController::new(api, RecordingSink::default());

        let outcome = controller.start(selection()).await;

        assert_eq!(outcome, FlowOutcome::Completed);
        let events = &controller.ui.events;
        assert!(statuses(events).contains(&TRANSCRIPT_FAILED.to_string()));
        assert!(!events.iter().any(|e| matches!(e, UiEvent::Tab(..))));
        assert_eq!(count(events, &UiEvent::Busy(false)), 1);
        assert_eq!(count(events, &UiEvent::Trigger(true)), 1);
    }

    #[tokio::test]
    async fn upload_failure_restores_ui_and_skips_progress() {
        let api = MockApi {
            fail_upload: true,
            ..MockApi::default()
        };
        let calls = api.calls.clone();
        let mut controller = SessionController::new(api, RecordingSink::default());

        let outcome = controller.start(selection()).await;

        assert_eq!(outcome, FlowOutcome::Failed);
        assert_eq!(calls.lock().unwrap().as_slice(), ["upload"]);

        let events = &controller.ui.events;
        assert!(statuses(events).contains(&UPLOAD_FAILED.to_string()));
        assert_eq!(count(events, &UiEvent::Busy(false)), 1);
        assert_eq!(count(events, &UiEvent::Trigger(true)), 1);
    }

    #[tokio::test]
    async fn trigger_is_ignored_while_a_flow_is_in_flight() {
        let api = MockApi::default();
        let calls = api.calls.clone();
        let mut controller = SessionController::new(api, RecordingSink::default());
        controller.in_flight = true;

        let outcome = controller.start(selection()).await;

        assert_eq!(outcome, FlowOutcome::AlreadyRunning);
        assert!(controller.ui.events.is_empty());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn summary_tab_renders_zipped_table() {
        let api = MockApi {
            summary: Some(SummaryPayload {
                speakers: vec!["A".to_string(), "B".to_string()],
                summaries: vec!["s1".to_string(), "s2".to_string()],
                ..SummaryPayload::default()
            }),
            ..MockApi::default()
        };
        let mut controller = SessionController::new(api, RecordingSink::default());

        controller.show_tab(Tab::Summary).await;

        let events = &controller.ui.events;
        let html = events
            .iter()
            .find_map(|event| match event {
                UiEvent::Tab(Tab::Summary, html) => Some(html.clone()),
                _ => None,
            })
            .expect("summary tab rendered");
        assert!(html.contains("<tr><td>A</td><td>s1</td></tr>"));
        assert!(html.contains("<tr><td>B</td><td>s2</td></tr>"));
    }

    #[tokio::test]
    async fn stats_fetch_failure_only_touches_that_tab() {
        let api = MockApi::default();
        let mut controller = SessionController::new(api, RecordingSink::default());

        controller.show_tab(Tab::Stats).await;

        assert_eq!(
            controller.ui.events,
            vec![UiEvent::Tab(Tab::Stats, fetch_failed_fragment(Tab::Stats))]
        );
    }

    #[tokio::test]
    async fn stale_tab_response_is_discarded() {
        let api = MockApi::default();
        let mut controller = SessionController::new(api, RecordingSink::default());

        let stale = controller.begin_tab_request();
        let newest = controller.begin_tab_request();

        controller.apply_tab_response(Tab::Summary, stale, "<p>old</p>".to_string());
        assert!(controller.ui.events.is_empty());

        controller.apply_tab_response(Tab::Summary, newest, "<p>new</p>".to_string());
        assert_eq!(
            controller.ui.events,
            vec![UiEvent::Tab(Tab::Summary, "<p>new</p>".to_string())]
        );
    }
}
