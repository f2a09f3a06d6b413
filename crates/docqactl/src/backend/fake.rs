//! In-memory server used by tests and `--demo`
//!
//! Behaves like the real service: uploads add documents, indexing marks
//! the store ready, deleting the last document drops readiness.

use async_trait::async_trait;
use docqa_common::{ClientError, DocumentRecord, QueryResponse, Source, StatusResponse};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

use super::{Backend, IndexOutcome};
use crate::upload::FileHandle;

/// Number of calls per endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub status: usize,
    pub list: usize,
    pub upload: usize,
    pub delete: usize,
    pub index: usize,
    pub query: usize,
}

#[derive(Default)]
struct FakeState {
    documents: Vec<DocumentRecord>,
    indexed: bool,
    unreachable: bool,
    failing_uploads: HashMap<String, String>,
    failing_deletes: HashMap<String, String>,
    replies: VecDeque<Result<QueryResponse, ClientError>>,
    questions: Vec<String>,
    upload_attempts: Vec<String>,
    index_gate: Option<Arc<Notify>>,
    calls: CallCounts,
}

pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState::default()),
        }
    }

    /// Start with documents already uploaded and indexed
    pub fn indexed_with(documents: Vec<DocumentRecord>) -> Self {
        let backend = Self::new();
        {
            let mut state = backend.state();
            state.indexed = !documents.is_empty();
            state.documents = documents;
        }
        backend
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make every call fail as if the server were down
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state().unreachable = unreachable;
    }

    pub fn set_indexed(&self, indexed: bool) {
        self.state().indexed = indexed;
    }

    /// Reject uploads of `filename` with a 400 and `detail`
    pub fn fail_upload(&self, filename: &str, detail: &str) {
        self.state()
            .failing_uploads
            .insert(filename.to_string(), detail.to_string());
    }

    /// Reject deletion of `filename` with a 500 and `detail`
    pub fn fail_delete(&self, filename: &str, detail: &str) {
        self.state()
            .failing_deletes
            .insert(filename.to_string(), detail.to_string());
    }

    /// Queue the reply for the next question
    pub fn push_reply(&self, reply: Result<QueryResponse, ClientError>) {
        self.state().replies.push_back(reply);
    }

    /// Hold every index call until the returned handle is notified
    pub fn hold_index(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state().index_gate = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> CallCounts {
        self.state().calls.clone()
    }

    pub fn questions(&self) -> Vec<String> {
        self.state().questions.clone()
    }

    /// File names in the order uploads were attempted
    pub fn upload_attempts(&self) -> Vec<String> {
        self.state().upload_attempts.clone()
    }

    pub fn documents(&self) -> Vec<DocumentRecord> {
        self.state().documents.clone()
    }

    fn check_reachable(state: &FakeState) -> Result<(), ClientError> {
        if state.unreachable {
            Err(ClientError::Transport("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn status(&self) -> Result<StatusResponse, ClientError> {
        let mut state = self.state();
        state.calls.status += 1;
        Self::check_reachable(&state)?;
        Ok(StatusResponse::ready(state.indexed))
    }

    async fn list_documents(&self) -> Result<Vec<DocumentRecord>, ClientError> {
        let mut state = self.state();
        state.calls.list += 1;
        Self::check_reachable(&state)?;
        Ok(state.documents.clone())
    }

    async fn upload(&self, file: &FileHandle) -> Result<(), ClientError> {
        {
            let mut state = self.state();
            state.calls.upload += 1;
            state.upload_attempts.push(file.name().to_string());
            Self::check_reachable(&state)?;
        }

        let bytes = file.read().await?;

        let mut state = self.state();
        if let Some(detail) = state.failing_uploads.get(file.name()) {
            return Err(ClientError::Protocol {
                status: 400,
                detail: detail.clone(),
            });
        }

        let size = bytes.len() as u64;
        let record = DocumentRecord {
            filename: file.name().to_string(),
            size_mb: ((size as f64 / (1024.0 * 1024.0)) * 100.0).round() / 100.0,
            size: Some(size),
        };
        match state.documents.iter_mut().find(|d| d.filename == record.filename) {
            Some(existing) => *existing = record,
            None => state.documents.push(record),
        }
        Ok(())
    }

    async fn delete_document(&self, filename: &str) -> Result<(), ClientError> {
        let mut state = self.state();
        state.calls.delete += 1;
        Self::check_reachable(&state)?;

        if let Some(detail) = state.failing_deletes.get(filename) {
            return Err(ClientError::Protocol {
                status: 500,
                detail: detail.clone(),
            });
        }

        let before = state.documents.len();
        state.documents.retain(|d| d.filename != filename);
        if state.documents.len() == before {
            return Err(ClientError::Protocol {
                status: 404,
                detail: "File not found".to_string(),
            });
        }
        if state.documents.is_empty() {
            state.indexed = false;
        }
        Ok(())
    }

    async fn trigger_index(&self) -> Result<IndexOutcome, ClientError> {
        let gate = {
            let mut state = self.state();
            state.calls.index += 1;
            Self::check_reachable(&state)?;
            state.index_gate.clone()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut state = self.state();
        if state.documents.is_empty() {
            return Ok(IndexOutcome {
                succeeded: false,
                message: "No PDF files found. Upload PDFs first!".to_string(),
                files: Vec::new(),
            });
        }
        state.indexed = true;
        let files: Vec<String> = state.documents.iter().map(|d| d.filename.clone()).collect();
        Ok(IndexOutcome {
            succeeded: true,
            message: format!("Indexed {} PDF files", files.len()),
            files,
        })
    }

    async fn query(&self, question: &str) -> Result<QueryResponse, ClientError> {
        let mut state = self.state();
        state.calls.query += 1;
        state.questions.push(question.to_string());
        Self::check_reachable(&state)?;

        if let Some(reply) = state.replies.pop_front() {
            return reply;
        }
        if !state.indexed {
            return Ok(QueryResponse {
                error: Some("System is not ready. Index documents first!".to_string()),
                ..QueryResponse::default()
            });
        }
        let sources = state
            .documents
            .first()
            .map(|d| vec![Source::new(format!("Excerpt about: {}", question)).with_origin(d.filename.clone())])
            .unwrap_or_default();
        Ok(QueryResponse {
            answer: format!("Answer to: {}", question),
            sources,
            error: None,
        })
    }
}
