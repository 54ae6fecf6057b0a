//! Server-push progress channel: byte framing, status-line parsing, and the
//! listener state machine.
//!
//! The wire protocol is line-oriented. Each event line carries a free-text
//! message prefixed with `status: `; the exact literal
//! `status: Processing complete!` is the completion sentinel. The match is
//! deliberately strict: different casing or trailing whitespace never
//! completes the session.

pub const STATUS_PREFIX: &str = "status: ";
pub const COMPLETION_SENTINEL: &str = "status: Processing complete!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Idle,
    Listening,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A human-readable status line to append to the log.
    Status(String),
    /// The completion sentinel arrived; fetch the transcript.
    Completed,
}

/// Decodes the byte stream into [`ProgressEvent`]s and tracks the session
/// state. Terminal states are sticky: once `Completed` or `Failed`, further
/// input is ignored and teardown is a no-op.
pub struct ProgressChannel {
    state: ListenerState,
    buffer: Vec<u8>,
}

impl ProgressChannel {
    pub fn new() -> Self {
        Self {
            state: ListenerState::Idle,
            buffer: Vec::new(),
        }
    }

    pub fn open(&mut self) {
        if self.state == ListenerState::Idle {
            self.state = ListenerState::Listening;
            tracing::debug!("Progress channel opened");
        }
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, ListenerState::Completed | ListenerState::Failed)
    }

    /// Buffers a chunk and returns the events decoded from every complete
    /// line. Messages are only processed while `Listening`; the sentinel
    /// moves the channel to `Completed` and drops any trailing input.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<ProgressEvent> {
        if self.state != ListenerState::Listening {
            return Vec::new();
        }

        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line_bytes: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line_bytes);
            let line = line.trim_end_matches('\n').trim_end_matches('\r');

            let Some(message) = decode_frame(line) else {
                continue;
            };

            if let Some(text) = message.strip_prefix(STATUS_PREFIX) {
                events.push(ProgressEvent::Status(text.to_string()));
            }

            if message == COMPLETION_SENTINEL {
                self.state = ListenerState::Completed;
                self.buffer.clear();
                events.push(ProgressEvent::Completed);
                tracing::info!("Completion sentinel received");
                break;
            }
        }

        events
    }

    /// Marks the session failed after a transport error or premature end of
    /// stream. Returns whether a transition happened; terminal states stay
    /// as they are.
    pub fn fail(&mut self) -> bool {
        if self.state == ListenerState::Listening {
            self.state = ListenerState::Failed;
            self.buffer.clear();
            true
        } else {
            false
        }
    }

    /// Tears the channel down. Closing a channel that already completed or
    /// failed is a no-op; closing mid-listen abandons the session without
    /// invoking the completion path.
    pub fn close(&mut self) -> bool {
        if self.state == ListenerState::Listening {
            self.state = ListenerState::Failed;
            self.buffer.clear();
            tracing::debug!("Progress channel closed before completion");
            true
        } else {
            false
        }
    }
}

impl Default for ProgressChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Strips transport framing from one line: SSE `data:` field prefixes (with
/// one optional leading space), comment lines, and blank keep-alives. Bare
/// lines pass through untouched.
fn decode_frame(line: &str) -> Option<&str> {
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    match line.strip_prefix("data:") {
        Some(rest) => Some(rest.strip_prefix(' ').unwrap_or(rest)),
        None => Some(line),
    }
}
