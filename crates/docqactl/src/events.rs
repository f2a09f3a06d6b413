//! View events
//!
//! Controllers describe what changed by emitting [`UiEvent`]s; front ends
//! decide how to display it. The TUI folds events into its `AppState`, the
//! one-shot commands print them.

use tokio::sync::mpsc;

use crate::chat::{ChatMessage, SubmitState};
use crate::notify::Notification;
use crate::registry::RegistryView;
use crate::status::SystemStatus;

/// Long-running operations that drive the global loading indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Upload,
    Index,
}

impl Operation {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Upload => "Uploading",
            Self::Index => "Indexing",
        }
    }
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Readiness cache overwritten
    Status(SystemStatus),
    /// Document list re-fetched
    Documents(RegistryView),
    /// Transcript grew by one message
    Appended(ChatMessage),
    /// Chat submission state machine moved
    ChatState(SubmitState),
    /// Question input must be emptied
    QuestionCleared,
    /// File selection must be emptied
    SelectionCleared,
    /// Loading indicator for an operation
    Busy { op: Operation, active: bool },
    /// Index trigger enabled/disabled
    IndexControl { enabled: bool },
    Notify(Notification),
}

/// Cloneable sending half of the view event stream. Sends never fail: a
/// front end that stopped listening just stops receiving.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl EventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// A sink nobody listens to
    pub fn detached() -> Self {
        Self::channel().0
    }

    pub fn emit(&self, event: UiEvent) {
        let _ = self.tx.send(event);
    }
}

/// Drain everything currently queued on a receiver
pub fn drain(rx: &mut mpsc::UnboundedReceiver<UiEvent>) -> Vec<UiEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
