//! UI sink abstraction. The controller never touches output surfaces
//! directly; it talks to an injected [`UiSink`] so the same flow drives a
//! terminal, a webview, or a recording sink in tests.

use chrono::Local;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Transcript,
    Summary,
    Stats,
}

impl Tab {
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Transcript => "transcript",
            Tab::Summary => "summary",
            Tab::Stats => "stats",
        }
    }
}

pub trait UiSink: Send {
    /// Blocking user-facing error raised before any network action.
    fn alert(&mut self, message: &str);

    fn append_status(&mut self, line: &str);

    fn clear_status(&mut self);

    fn set_busy(&mut self, busy: bool);

    fn set_trigger_enabled(&mut self, enabled: bool);

    /// Replaces the content area of one tab with a rendered fragment.
    fn show_tab(&mut self, tab: Tab, html: &str);
}

/// Terminal sink used by the CLI binary.
pub struct ConsoleUi {
    busy: bool,
}

impl ConsoleUi {
    pub fn new() -> Self {
        Self { busy: false }
    }
}

impl Default for ConsoleUi {
    fn default() -> Self {
        Self::new()
    }
}

impl UiSink for ConsoleUi {
    fn alert(&mut self, message: &str) {
        eprintln!("! {}", message);
    }

    fn append_status(&mut self, line: &str) {
        println!("[{}] {}", Local::now().format("%H:%M:%S"), line);
    }

    fn clear_status(&mut self) {
        println!("----------------------------------------");
    }

    fn set_busy(&mut self, busy: bool) {
        if busy && !self.busy {
            println!("Processing, this may take a while...");
        }
        self.busy = busy;
    }

    fn set_trigger_enabled(&mut self, enabled: bool) {
        // A one-shot CLI has no trigger control to grey out.
        tracing::debug!("Trigger control enabled: {}", enabled);
    }

    fn show_tab(&mut self, tab: Tab, html: &str) {
        println!("\n== {} ==", tab.label());
        println!("{}", html);
    }
}
