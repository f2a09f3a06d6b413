//! Error taxonomy
//!
//! Transport: the request never produced a response.
//! Protocol: a response came back but signalled failure or was unreadable.
//! Validation: a client-side precondition failed before any request.

use std::path::PathBuf;

/// Coarse classification used for notifications and exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Protocol,
    Validation,
}

/// Failure of a single backend call
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("cannot reach server: {0}")]
    Transport(String),

    #[error("server returned HTTP {status}: {detail}")]
    Protocol { status: u16, detail: String },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("cannot read {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid server url: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) | Self::InvalidUrl(_) => ErrorKind::Transport,
            Self::Protocol { .. } | Self::Decode(_) => ErrorKind::Protocol,
            Self::File { .. } => ErrorKind::Validation,
        }
    }

    /// Text suitable for a notification: the server's own detail for
    /// protocol failures, the full error otherwise
    pub fn user_message(&self) -> String {
        match self {
            Self::Protocol { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

/// Precondition failures caught before any request is issued
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a question")]
    EmptyQuestion,

    #[error("System is not ready yet. Index documents first!")]
    NotReady,

    #[error("No files selected")]
    NoFiles,

    #[error("An upload is already running")]
    UploadInFlight,

    #[error("Indexing is already running")]
    IndexInFlight,

    #[error("Still waiting for the previous answer")]
    QuestionInFlight,

    #[error("Cancelled")]
    Declined,
}
