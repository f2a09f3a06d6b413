//! Status monitor - owner of the readiness cell
//!
//! The monitor is the only writer of the cached [`SystemStatus`]; readers
//! hold a `watch::Receiver`. Every poll overwrites the whole value, so a
//! manual refresh racing a timer refresh resolves to whichever answer
//! arrives last.

use chrono::{DateTime, Local};
use docqa_common::StatusResponse;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::events::{EventSink, UiEvent};
use crate::notify::Notifier;

pub const CAPTION_UNKNOWN: &str = "Checking status...";
pub const CAPTION_READY: &str = "System ready";
pub const CAPTION_NOT_READY: &str = "Documents need indexing";
pub const CAPTION_UNREACHABLE: &str = "Connection error";

/// `Unknown` before the first poll; `Unreachable` after a failed poll,
/// whatever the previous value was
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Unknown,
    Ready,
    NotReady,
    Unreachable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemStatus {
    pub readiness: Readiness,
    pub caption: String,
    pub checked_at: Option<DateTime<Local>>,
}

impl SystemStatus {
    pub fn unknown() -> Self {
        Self {
            readiness: Readiness::Unknown,
            caption: CAPTION_UNKNOWN.to_string(),
            checked_at: None,
        }
    }

    pub fn from_response(response: &StatusResponse) -> Self {
        let (readiness, fallback) = if response.documents_indexed {
            (Readiness::Ready, CAPTION_READY)
        } else {
            (Readiness::NotReady, CAPTION_NOT_READY)
        };
        let caption = response
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback)
            .to_string();
        Self {
            readiness,
            caption,
            checked_at: Some(Local::now()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            readiness: Readiness::Unreachable,
            caption: CAPTION_UNREACHABLE.to_string(),
            checked_at: Some(Local::now()),
        }
    }

    /// Questions may be submitted
    pub fn ready(&self) -> bool {
        self.readiness == Readiness::Ready
    }
}

impl Default for SystemStatus {
    fn default() -> Self {
        Self::unknown()
    }
}

pub struct StatusMonitor {
    backend: Arc<dyn Backend>,
    cell: watch::Sender<SystemStatus>,
    notifier: Notifier,
    sink: EventSink,
}

impl StatusMonitor {
    pub fn new(backend: Arc<dyn Backend>, notifier: Notifier, sink: EventSink) -> Self {
        let (cell, _) = watch::channel(SystemStatus::unknown());
        Self {
            backend,
            cell,
            notifier,
            sink,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SystemStatus> {
        self.cell.subscribe()
    }

    pub fn current(&self) -> SystemStatus {
        self.cell.borrow().clone()
    }

    /// Poll the server and overwrite the cached status. Never fails: an
    /// unreachable server is itself a status.
    pub async fn refresh(&self) -> SystemStatus {
        let status = match self.backend.status().await {
            Ok(response) => SystemStatus::from_response(&response),
            Err(err) => {
                warn!(error = %err, "status poll failed");
                SystemStatus::unreachable()
            }
        };

        let previous = self.cell.send_replace(status.clone());
        if previous.readiness != status.readiness {
            info!(from = ?previous.readiness, to = ?status.readiness, "readiness changed");
            if status.readiness == Readiness::Unreachable {
                self.notifier.error(unreachable_message(previous.readiness));
            }
        } else {
            debug!(readiness = ?status.readiness, "status unchanged");
        }

        self.sink.emit(UiEvent::Status(status.clone()));
        status
    }
}

/// A server that never answered was not "lost"
fn unreachable_message(previous: Readiness) -> &'static str {
    match previous {
        Readiness::Unknown => "Cannot reach the server",
        _ => "Lost connection to the server",
    }
}
