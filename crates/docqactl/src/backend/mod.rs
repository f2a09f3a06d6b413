//! Backend abstraction
//!
//! Controllers talk to the retrieval/generation server only through
//! [`Backend`]. [`HttpBackend`] speaks the REST API; [`FakeBackend`] is an
//! in-memory server for tests and demos.

mod fake;
mod http;

pub use fake::{CallCounts, FakeBackend};
pub use http::HttpBackend;

use async_trait::async_trait;
use docqa_common::{ClientError, DocumentRecord, QueryResponse, StatusResponse};

use crate::upload::FileHandle;

/// Outcome of an index run; `succeeded` is false on non-2xx or when the
/// server's status discriminator is not "success"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOutcome {
    pub succeeded: bool,
    pub message: String,
    pub files: Vec<String>,
}

#[async_trait]
pub trait Backend: Send + Sync {
    async fn status(&self) -> Result<StatusResponse, ClientError>;

    /// Full document list in server order
    async fn list_documents(&self) -> Result<Vec<DocumentRecord>, ClientError>;

    /// Upload a single file
    async fn upload(&self, file: &FileHandle) -> Result<(), ClientError>;

    async fn delete_document(&self, filename: &str) -> Result<(), ClientError>;

    async fn trigger_index(&self) -> Result<IndexOutcome, ClientError>;

    /// `Ok` carries either an answer or the server's explicit error field
    async fn query(&self, question: &str) -> Result<QueryResponse, ClientError>;
}
