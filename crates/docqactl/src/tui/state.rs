//! TUI state - everything on screen comes from here
//!
//! Controllers never touch this struct. Their [`UiEvent`]s are folded in
//! by [`AppState::apply`]; key handling edits the input fields directly.

use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::time::Duration;

use crate::chat::{ChatMessage, SubmitState};
use crate::confirm::PendingConfirm;
use crate::events::{Operation, UiEvent};
use crate::notify::Notification;
use crate::registry::RegistryView;
use crate::status::SystemStatus;

/// History entries kept for ↑/↓
const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Question,
    Documents,
}

/// What the input bar is currently editing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Question,
    /// Space separated file paths to upload
    UploadPaths,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub server_url: String,
    pub status: SystemStatus,
    pub documents: RegistryView,
    pub transcript: Vec<ChatMessage>,
    pub chat_state: SubmitState,

    pub input: String,
    pub cursor_pos: usize,
    pub mode: InputMode,
    pub focus: Focus,
    pub selected_document: usize,

    pub input_history: Vec<String>,
    pub history_index: Option<usize>,

    /// Conversation scroll; `usize::MAX` pins to the bottom
    pub scroll_offset: usize,

    pub busy: HashSet<Operation>,
    pub index_enabled: bool,
    pub notifications: Vec<Notification>,
    pub pending_confirm: Option<PendingConfirm>,
    pub show_help: bool,
    pub spinner_frame: usize,
}

impl AppState {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            index_enabled: true,
            scroll_offset: usize::MAX,
            ..Self::default()
        }
    }

    /// Fold one controller event into the view
    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::Status(status) => self.status = status,
            UiEvent::Documents(view) => {
                self.documents = view;
                let count = self.documents.documents().len();
                if self.selected_document >= count {
                    self.selected_document = count.saturating_sub(1);
                }
            }
            UiEvent::Appended(message) => {
                self.transcript.push(message);
                self.scroll_to_bottom();
            }
            UiEvent::ChatState(state) => self.chat_state = state,
            UiEvent::QuestionCleared => {
                if self.mode == InputMode::Question {
                    self.input.clear();
                    self.cursor_pos = 0;
                }
            }
            UiEvent::SelectionCleared => {
                if self.mode == InputMode::UploadPaths {
                    self.mode = InputMode::Question;
                    self.input.clear();
                    self.cursor_pos = 0;
                }
            }
            UiEvent::Busy { op, active } => {
                if active {
                    self.busy.insert(op);
                } else {
                    self.busy.remove(&op);
                }
            }
            UiEvent::IndexControl { enabled } => self.index_enabled = enabled,
            UiEvent::Notify(notification) => self.notifications.push(notification),
        }
    }

    /// The question-submit control: enabled iff the last known status is
    /// ready and no submission is under way
    pub fn submit_enabled(&self) -> bool {
        self.status.ready() && !self.chat_state.in_progress()
    }

    pub fn submit_label(&self) -> &'static str {
        self.chat_state.label()
    }

    /// Label for the loading indicator, indexing first
    pub fn loading_label(&self) -> Option<&'static str> {
        [Operation::Index, Operation::Upload]
            .into_iter()
            .find(|op| self.busy.contains(op))
            .map(|op| op.label())
    }

    /// Drop notifications older than `ttl`
    pub fn expire_notifications(&mut self, now: DateTime<Local>, ttl: Duration) {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::zero());
        self.notifications.retain(|n| now.signed_duration_since(n.at) < ttl);
    }

    pub fn selected_filename(&self) -> Option<&str> {
        self.documents
            .documents()
            .get(self.selected_document)
            .map(|d| d.filename.as_str())
    }

    pub fn select_next_document(&mut self) {
        let count = self.documents.documents().len();
        if count > 0 && self.selected_document + 1 < count {
            self.selected_document += 1;
        }
    }

    pub fn select_previous_document(&mut self) {
        self.selected_document = self.selected_document.saturating_sub(1);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = usize::MAX;
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Question => Focus::Documents,
            Focus::Documents => Focus::Question,
        };
    }

    /// Switch the input bar to path entry, keeping the draft question aside
    pub fn begin_upload_entry(&mut self) {
        self.mode = InputMode::UploadPaths;
        self.focus = Focus::Question;
        self.input.clear();
        self.cursor_pos = 0;
    }

    pub fn cancel_upload_entry(&mut self) {
        self.mode = InputMode::Question;
        self.input.clear();
        self.cursor_pos = 0;
    }

    /// Remember a submitted question for ↑/↓
    pub fn push_history(&mut self, question: &str) {
        if !question.trim().is_empty() {
            self.input_history.push(question.to_string());
            if self.input_history.len() > HISTORY_LIMIT {
                self.input_history.remove(0);
            }
        }
        self.history_index = None;
    }

    pub fn insert_char(&mut self, c: char) {
        let byte = self.byte_offset(self.cursor_pos);
        self.input.insert(byte, c);
        self.cursor_pos += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor_pos > 0 {
            let byte = self.byte_offset(self.cursor_pos - 1);
            self.input.remove(byte);
            self.cursor_pos -= 1;
        }
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.cursor_pos = 0;
    }

    fn byte_offset(&self, char_pos: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    /// Navigate history up
    pub fn history_up(&mut self) {
        if self.input_history.is_empty() {
            return;
        }

        match self.history_index {
            None => {
                let last = self.input_history.len() - 1;
                self.history_index = Some(last);
                self.input = self.input_history[last].clone();
            }
            Some(idx) if idx > 0 => {
                self.history_index = Some(idx - 1);
                self.input = self.input_history[idx - 1].clone();
            }
            _ => {}
        }
        self.cursor_pos = self.input.chars().count();
    }

    /// Navigate history down
    pub fn history_down(&mut self) {
        match self.history_index {
            Some(idx) if idx + 1 < self.input_history.len() => {
                self.history_index = Some(idx + 1);
                self.input = self.input_history[idx + 1].clone();
            }
            Some(_) => {
                // Past the newest entry: back to an empty prompt
                self.history_index = None;
                self.input.clear();
            }
            None => {}
        }
        self.cursor_pos = self.input.chars().count();
    }
}
