//! User confirmation for destructive or expensive operations
//!
//! Delete and index ask before any request is sent. The front end decides
//! how: a modal in the TUI, a y/N prompt on stdin, or `--yes`.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub title: String,
    pub prompt: String,
}

impl ConfirmRequest {
    pub fn index() -> Self {
        Self {
            title: "Index documents".to_string(),
            prompt: "Index all documents? This can take several minutes.".to_string(),
        }
    }

    pub fn delete(filename: &str) -> Self {
        Self {
            title: "Delete document".to_string(),
            prompt: format!("Delete document \"{}\"?", filename),
        }
    }
}

#[async_trait]
pub trait Confirm: Send + Sync {
    /// `true` only on an explicit yes
    async fn confirm(&self, request: &ConfirmRequest) -> bool;
}

/// Fixed answer (`--yes`, tests)
pub struct AutoConfirm(pub bool);

#[async_trait]
impl Confirm for AutoConfirm {
    async fn confirm(&self, _request: &ConfirmRequest) -> bool {
        self.0
    }
}

/// y/N prompt on the controlling terminal
pub struct StdinConfirm;

#[async_trait]
impl Confirm for StdinConfirm {
    async fn confirm(&self, request: &ConfirmRequest) -> bool {
        let prompt = request.prompt.clone();
        tokio::task::spawn_blocking(move || {
            use std::io::Write;
            print!("{} [y/N] ", prompt);
            let _ = std::io::stdout().flush();
            let mut answer = String::new();
            match std::io::stdin().read_line(&mut answer) {
                Ok(_) => is_yes(&answer),
                Err(_) => false,
            }
        })
        .await
        .unwrap_or(false)
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// A question waiting for the front end to answer
#[derive(Debug)]
pub struct PendingConfirm {
    pub request: ConfirmRequest,
    reply: oneshot::Sender<bool>,
}

impl PendingConfirm {
    pub fn answer(self, yes: bool) {
        let _ = self.reply.send(yes);
    }
}

/// Forwards confirmations to an interactive front end's event loop. A
/// front end that went away counts as a refusal.
#[derive(Clone)]
pub struct ChannelConfirm {
    tx: mpsc::UnboundedSender<PendingConfirm>,
}

impl ChannelConfirm {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PendingConfirm>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Confirm for ChannelConfirm {
    async fn confirm(&self, request: &ConfirmRequest) -> bool {
        let (reply, answer) = oneshot::channel();
        let pending = PendingConfirm {
            request: request.clone(),
            reply,
        };
        if self.tx.send(pending).is_err() {
            return false;
        }
        answer.await.unwrap_or(false)
    }
}
