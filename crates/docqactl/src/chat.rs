//! Chat controller and transcript
//!
//! Each submission walks Idle -> Validating -> Submitting -> Resolved and
//! back to Idle. The question is appended before the request goes out;
//! the answer (or the error text) is appended before the submit control
//! comes back.

use chrono::{DateTime, Local};
use docqa_common::{ClientError, Source, ValidationError};
use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::events::{EventSink, UiEvent};
use crate::guard::FlightGuard;
use crate::notify::Notifier;
use crate::status::SystemStatus;

/// Shown in place of an answer when no response came back at all
pub const GENERIC_FAILURE: &str = "Error while processing the question. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the conversation. Content is stored raw; rendering escapes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Always empty for user turns
    pub sources: Vec<Source>,
    pub sent_at: DateTime<Local>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            sources: Vec::new(),
            sent_at: Local::now(),
        }
    }

    pub fn assistant(content: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            sources,
            sent_at: Local::now(),
        }
    }
}

/// Append-only record of the session's turns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub(crate) fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Resolved,
}

impl SubmitState {
    /// Label of the submit control
    pub fn label(&self) -> &'static str {
        match self {
            Self::Submitting => "Processing...",
            _ => "Send",
        }
    }

    pub fn in_progress(&self) -> bool {
        matches!(self, Self::Validating | Self::Submitting)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent
    Rejected(ValidationError),
    /// The server answered
    Answered,
    /// The server reported an error or never answered; the transcript
    /// carries the explanation
    Failed,
}

pub struct ChatController {
    backend: Arc<dyn Backend>,
    readiness: watch::Receiver<SystemStatus>,
    notifier: Notifier,
    sink: EventSink,
    transcript: Mutex<Transcript>,
    state: Mutex<SubmitState>,
    in_flight: AtomicBool,
}

impl ChatController {
    pub fn new(
        backend: Arc<dyn Backend>,
        readiness: watch::Receiver<SystemStatus>,
        notifier: Notifier,
        sink: EventSink,
    ) -> Self {
        Self {
            backend,
            readiness,
            notifier,
            sink,
            transcript: Mutex::new(Transcript::default()),
            state: Mutex::new(SubmitState::Idle),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn transcript(&self) -> Transcript {
        self.transcript
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn state(&self) -> SubmitState {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Submit a question. At most one request is issued per call, and none
    /// when validation fails.
    pub async fn submit(&self, question: &str) -> SubmitOutcome {
        let Some(_flight) = FlightGuard::try_acquire(&self.in_flight) else {
            self.notifier
                .warning(ValidationError::QuestionInFlight.to_string());
            return SubmitOutcome::Rejected(ValidationError::QuestionInFlight);
        };

        self.set_state(SubmitState::Validating);
        let question = question.trim();
        if question.is_empty() {
            return self.reject(ValidationError::EmptyQuestion);
        }
        if !self.readiness.borrow().ready() {
            return self.reject(ValidationError::NotReady);
        }

        self.append(ChatMessage::user(question));
        self.sink.emit(UiEvent::QuestionCleared);
        self.set_state(SubmitState::Submitting);
        debug!(question = %question, "question submitted");

        let (reply, outcome) = match self.backend.query(question).await {
            Ok(response) => match response.error_message() {
                Some(err) => {
                    warn!(error = %err, "server reported a query error");
                    (
                        ChatMessage::assistant(format!("Error: {}", err), Vec::new()),
                        SubmitOutcome::Failed,
                    )
                }
                None => {
                    info!(sources = response.sources.len(), "answer received");
                    (
                        ChatMessage::assistant(response.answer, response.sources),
                        SubmitOutcome::Answered,
                    )
                }
            },
            Err(err) => {
                warn!(error = %err, "query failed");
                (failure_message(&err), SubmitOutcome::Failed)
            }
        };

        self.append(reply);
        self.set_state(SubmitState::Resolved);
        self.set_state(SubmitState::Idle);
        outcome
    }

    fn reject(&self, reason: ValidationError) -> SubmitOutcome {
        self.notifier.warning(reason.to_string());
        self.set_state(SubmitState::Idle);
        SubmitOutcome::Rejected(reason)
    }

    fn append(&self, message: ChatMessage) {
        self.transcript
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(message.clone());
        self.sink.emit(UiEvent::Appended(message));
    }

    fn set_state(&self, next: SubmitState) {
        *self.state.lock().unwrap_or_else(|p| p.into_inner()) = next;
        self.sink.emit(UiEvent::ChatState(next));
    }
}

/// Protocol failures carry the server's explanation; anything else gets
/// the generic text
fn failure_message(err: &ClientError) -> ChatMessage {
    let content = match err {
        ClientError::Protocol { detail, .. } if !detail.trim().is_empty() => {
            format!("Error: {}", detail)
        }
        _ => GENERIC_FAILURE.to_string(),
    };
    ChatMessage::assistant(content, Vec::new())
}
