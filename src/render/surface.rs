//! Output surfaces the monitor writes to
//!
//! The status line and the village container are separate mounting points.
//! `TerminalScreen` implements both on stdout; `RecordingSurface` keeps
//! everything in memory.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use tracing::debug;

use super::model::DisplayModel;
use crate::config::DisplaySettings;

/// Where the connection status string goes
pub trait StatusSurface {
    fn set_status(&mut self, text: &str);
}

/// Where the village sections go. Every call replaces all prior content.
pub trait DisplaySurface {
    fn replace(&mut self, model: &DisplayModel);

    /// Persistent notice shown instead of village sections
    fn show_notice(&mut self, notice: &str);
}

// ─────────────────────────────────────────────────────────────────
// Terminal
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
enum Body {
    #[default]
    Empty,
    Model(DisplayModel),
    Notice(String),
}

#[derive(Debug)]
struct Screen {
    settings: DisplaySettings,
    status: String,
    body: Body,
}

/// Full-screen stdout view; clones share one screen
#[derive(Debug, Clone)]
pub struct TerminalScreen {
    screen: Rc<RefCell<Screen>>,
}

impl TerminalScreen {
    pub fn new(settings: DisplaySettings) -> Self {
        Self {
            screen: Rc::new(RefCell::new(Screen {
                settings,
                status: String::new(),
                body: Body::Empty,
            })),
        }
    }

    fn redraw(&self) {
        let frame = self.screen.borrow().frame();
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = stdout.write_all(frame.as_bytes()).and_then(|_| stdout.flush()) {
            debug!(error = %e, "Failed to write to terminal");
        }
    }
}

impl Screen {
    fn frame(&self) -> String {
        let mut out = String::new();
        if self.settings.clear_screen {
            out.push_str("\x1b[2J\x1b[H");
        }

        out.push_str(&format!("Status: {}", self.status));
        if self.settings.show_timestamp {
            out.push_str(&format!("  ({})", chrono::Local::now().format("%H:%M:%S")));
        }
        out.push_str("\n\n");

        match &self.body {
            Body::Empty => {}
            Body::Model(model) => out.push_str(&model.to_string()),
            Body::Notice(notice) => {
                out.push_str(&format!("\x1b[1m{}\x1b[0m\n", notice));
            }
        }

        if !self.settings.clear_screen {
            out.push('\n');
        }
        out
    }
}

impl StatusSurface for TerminalScreen {
    fn set_status(&mut self, text: &str) {
        self.screen.borrow_mut().status = text.to_string();
        self.redraw();
    }
}

impl DisplaySurface for TerminalScreen {
    fn replace(&mut self, model: &DisplayModel) {
        self.screen.borrow_mut().body = Body::Model(model.clone());
        self.redraw();
    }

    fn show_notice(&mut self, notice: &str) {
        self.screen.borrow_mut().body = Body::Notice(notice.to_string());
        self.redraw();
    }
}

// ─────────────────────────────────────────────────────────────────
// In-memory
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Recording {
    statuses: Vec<String>,
    frames: Vec<DisplayModel>,
    notices: Vec<String>,
}

/// Surface that records every update; clones share one recording
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    recording: Rc<RefCell<Recording>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every status string set so far, oldest first
    pub fn statuses(&self) -> Vec<String> {
        self.recording.borrow().statuses.clone()
    }

    pub fn status(&self) -> Option<String> {
        self.recording.borrow().statuses.last().cloned()
    }

    pub fn frames(&self) -> Vec<DisplayModel> {
        self.recording.borrow().frames.clone()
    }

    /// What the display currently shows
    pub fn current(&self) -> Option<DisplayModel> {
        self.recording.borrow().frames.last().cloned()
    }

    pub fn notices(&self) -> Vec<String> {
        self.recording.borrow().notices.clone()
    }
}

impl StatusSurface for RecordingSurface {
    fn set_status(&mut self, text: &str) {
        self.recording.borrow_mut().statuses.push(text.to_string());
    }
}

impl DisplaySurface for RecordingSurface {
    fn replace(&mut self, model: &DisplayModel) {
        self.recording.borrow_mut().frames.push(model.clone());
    }

    fn show_notice(&mut self, notice: &str) {
        self.recording.borrow_mut().notices.push(notice.to_string());
    }
}
