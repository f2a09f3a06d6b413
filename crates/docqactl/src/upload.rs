//! Upload controller
//!
//! Files go up one request at a time. Each file gets its own outcome and
//! its own notification; one failure never stops the rest of the batch.

use docqa_common::{ClientError, ValidationError};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::Backend;
use crate::events::{EventSink, Operation, UiEvent};
use crate::guard::{BusyGuard, FlightGuard};
use crate::notify::Notifier;
use crate::registry::DocumentRegistry;
use crate::status::StatusMonitor;

#[derive(Debug, Clone)]
enum FileSource {
    Path(PathBuf),
    Memory(Vec<u8>),
}

/// A file picked for upload
#[derive(Debug, Clone)]
pub struct FileHandle {
    name: String,
    source: FileSource,
}

impl FileHandle {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            name,
            source: FileSource::Path(path),
        }
    }

    pub fn in_memory(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            source: FileSource::Memory(bytes),
        }
    }

    /// Name sent as the multipart filename
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            FileSource::Path(p) => Some(p),
            FileSource::Memory(_) => None,
        }
    }

    pub async fn read(&self) -> Result<Vec<u8>, ClientError> {
        match &self.source {
            FileSource::Path(path) => tokio::fs::read(path)
                .await
                .map_err(|source| ClientError::File {
                    path: path.clone(),
                    source,
                }),
            FileSource::Memory(bytes) => Ok(bytes.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded { file: String },
    Failed { file: String, reason: String },
}

impl UploadOutcome {
    pub fn file(&self) -> &str {
        match self {
            Self::Uploaded { file } | Self::Failed { file, .. } => file,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Uploaded { .. })
    }
}

/// Per-file results of one batch, in submission order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub outcomes: Vec<UploadOutcome>,
}

impl UploadReport {
    /// Fold step: the report with one more outcome appended
    pub fn record(mut self, outcome: UploadOutcome) -> Self {
        self.outcomes.push(outcome);
        self
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

pub struct UploadController {
    backend: Arc<dyn Backend>,
    registry: Arc<DocumentRegistry>,
    status: Arc<StatusMonitor>,
    notifier: Notifier,
    sink: EventSink,
    in_flight: AtomicBool,
}

impl UploadController {
    pub fn new(
        backend: Arc<dyn Backend>,
        registry: Arc<DocumentRegistry>,
        status: Arc<StatusMonitor>,
        notifier: Notifier,
        sink: EventSink,
    ) -> Self {
        Self {
            backend,
            registry,
            status,
            notifier,
            sink,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Upload a batch sequentially, then refresh the document list and
    /// readiness.
    ///
    /// The loading indicator stays up until both refreshes have finished; the
    /// file selection is cleared whatever the outcomes were.
    pub async fn upload(&self, files: Vec<FileHandle>) -> Result<UploadReport, ValidationError> {
        if files.is_empty() {
            return Err(ValidationError::NoFiles);
        }
        let Some(_flight) = FlightGuard::try_acquire(&self.in_flight) else {
            self.notifier.warning(ValidationError::UploadInFlight.to_string());
            return Err(ValidationError::UploadInFlight);
        };
        let _busy = BusyGuard::new(&self.sink, Operation::Upload);
        info!(files = files.len(), "upload batch started");

        let mut report = UploadReport::default();
        for file in &files {
            let outcome = self.upload_one(file).await;
            report = report.record(outcome);
        }

        self.sink.emit(UiEvent::SelectionCleared);
        self.registry.refresh().await;
        self.status.refresh().await;

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "upload batch finished"
        );
        Ok(report)
    }

    async fn upload_one(&self, file: &FileHandle) -> UploadOutcome {
        match self.backend.upload(file).await {
            Ok(()) => {
                self.notifier.success(format!("Uploaded: {}", file.name()));
                UploadOutcome::Uploaded {
                    file: file.name().to_string(),
                }
            }
            Err(err) => {
                warn!(file = %file.name(), error = %err, "upload failed");
                let reason = err.user_message();
                self.notifier
                    .error(format!("Upload failed: {}: {}", file.name(), reason));
                UploadOutcome::Failed {
                    file: file.name().to_string(),
                    reason,
                }
            }
        }
    }
}

/// Split a typed file selection into paths. Whitespace separates paths;
/// single or double quotes keep a path with spaces together.
pub fn parse_selection(input: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => quote = Some(c),
            (None, c) if c.is_whitespace() => {
                if !current.is_empty() {
                    paths.push(PathBuf::from(std::mem::take(&mut current)));
                }
            }
            (None, c) => current.push(c),
        }
    }
    if !current.is_empty() {
        paths.push(PathBuf::from(current));
    }
    paths
}
