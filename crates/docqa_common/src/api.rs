//! REST API wire types
//!
//! Field names follow the JSON emitted by the retrieval/generation server.
//! Routes:
//! - `GET /api/status` -> [`StatusResponse`]
//! - `GET /api/documents` -> [`DocumentsResponse`]
//! - `POST /api/upload` (multipart `file`) -> 2xx or [`ErrorDetail`]
//! - `DELETE /api/documents/{filename}` -> 2xx or [`ErrorDetail`]
//! - `POST /api/index` -> [`IndexResponse`]
//! - `POST /api/query` ([`QueryRequest`]) -> [`QueryResponse`]

use serde::{Deserialize, Deserializer, Serialize};

/// Shown in place of missing source metadata
pub const METADATA_PLACEHOLDER: &str = "N/A";

/// `status` value of a successful index run
pub const INDEX_SUCCESS: &str = "success";

/// Readiness report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub documents_indexed: bool,

    /// "ready" / "not_ready"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Human readable readiness caption
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_store_exists: Option<bool>,
}

impl StatusResponse {
    pub fn ready(documents_indexed: bool) -> Self {
        Self {
            documents_indexed,
            status: None,
            message: None,
            vector_store_exists: None,
        }
    }
}

/// One uploaded document. `filename` is the server-assigned identity and is
/// used as-is in deletion requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub filename: String,
    pub size_mb: f64,

    /// Size in bytes, when the server reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl DocumentRecord {
    pub fn new(filename: impl Into<String>, size_mb: f64) -> Self {
        Self {
            filename: filename.into(),
            size_mb,
            size: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentsResponse {
    #[serde(default)]
    pub documents: Vec<DocumentRecord>,
}

/// FastAPI error body. `detail` is usually a string but validation errors
/// (HTTP 422) carry a list of objects.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorDetail {
    pub detail: serde_json::Value,
}

impl ErrorDetail {
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Result of `POST /api/index`, both on 2xx and on error status codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexResponse {
    pub status: String,

    #[serde(default)]
    pub message: String,

    /// Files that went into the index
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

impl IndexResponse {
    pub fn succeeded(&self) -> bool {
        self.status == INDEX_SUCCESS
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub answer: String,

    #[serde(default)]
    pub sources: Vec<Source>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResponse {
    /// The explicit error indicator, ignoring `null` and empty strings
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.trim().is_empty())
    }
}

/// Retrieval excerpt attached to an answer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub metadata: SourceMetadata,
}

impl Source {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: SourceMetadata::default(),
        }
    }

    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.metadata.page = Some(page.into());
        self
    }

    pub fn with_origin(mut self, source: impl Into<String>) -> Self {
        self.metadata.source = Some(source.into());
        self
    }
}

/// Optional excerpt metadata. Loaders emit `page` as an integer, other
/// pipelines as a string; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceMetadata {
    #[serde(default, deserialize_with = "lenient_text")]
    pub page: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub source: Option<String>,
}

impl SourceMetadata {
    pub fn page_or_placeholder(&self) -> &str {
        self.page.as_deref().unwrap_or(METADATA_PLACEHOLDER)
    }

    pub fn source_or_placeholder(&self) -> &str {
        self.source.as_deref().unwrap_or(METADATA_PLACEHOLDER)
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) if s.is_empty() => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_minimal_body() {
        let status: StatusResponse =
            serde_json::from_value(json!({"documents_indexed": true})).unwrap();
        assert!(status.documents_indexed);
        assert!(status.message.is_none());
    }

    #[test]
    fn test_status_full_body() {
        let status: StatusResponse = serde_json::from_value(json!({
            "status": "not_ready",
            "message": "Documents need indexing",
            "documents_indexed": false,
            "vector_store_exists": true
        }))
        .unwrap();
        assert!(!status.documents_indexed);
        assert_eq!(status.status.as_deref(), Some("not_ready"));
        assert_eq!(status.vector_store_exists, Some(true));
    }

    #[test]
    fn test_documents_preserve_server_order() {
        let docs: DocumentsResponse = serde_json::from_value(json!({
            "documents": [
                {"filename": "zeta.pdf", "size": 1048576, "size_mb": 1.0},
                {"filename": "alpha.pdf", "size_mb": 0.25}
            ]
        }))
        .unwrap();
        let names: Vec<_> = docs.documents.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, vec!["zeta.pdf", "alpha.pdf"]);
        assert_eq!(docs.documents[0].size, Some(1048576));
        assert_eq!(docs.documents[1].size, None);
    }

    #[test]
    fn test_page_number_or_string() {
        let numeric: Source =
            serde_json::from_value(json!({"content": "x", "metadata": {"page": 4}})).unwrap();
        assert_eq!(numeric.metadata.page.as_deref(), Some("4"));

        let text: Source =
            serde_json::from_value(json!({"content": "x", "metadata": {"page": "iv"}})).unwrap();
        assert_eq!(text.metadata.page.as_deref(), Some("iv"));
    }

    #[test]
    fn test_missing_metadata_uses_placeholder() {
        let source: Source = serde_json::from_value(json!({"content": "excerpt"})).unwrap();
        assert_eq!(source.metadata.page_or_placeholder(), "N/A");
        assert_eq!(source.metadata.source_or_placeholder(), "N/A");

        let nulls: Source = serde_json::from_value(json!({
            "content": "excerpt",
            "metadata": {"page": null, "source": "", "author": "ignored"}
        }))
        .unwrap();
        assert_eq!(nulls.metadata, SourceMetadata::default());
    }

    #[test]
    fn test_query_error_indicator() {
        let ok: QueryResponse = serde_json::from_value(json!({
            "answer": "Paris is the capital.",
            "sources": [],
            "error": null
        }))
        .unwrap();
        assert_eq!(ok.error_message(), None);

        let empty: QueryResponse =
            serde_json::from_value(json!({"answer": "a", "sources": [], "error": ""})).unwrap();
        assert_eq!(empty.error_message(), None);

        let failed: QueryResponse =
            serde_json::from_value(json!({"error": "index not built"})).unwrap();
        assert_eq!(failed.error_message(), Some("index not built"));
        assert!(failed.sources.is_empty());
    }

    #[test]
    fn test_index_response_discriminator() {
        let ok: IndexResponse = serde_json::from_value(json!({
            "status": "success",
            "message": "Indexed 2 PDF files",
            "files": ["a.pdf", "b.pdf"]
        }))
        .unwrap();
        assert!(ok.succeeded());
        assert_eq!(ok.files.len(), 2);

        let failed: IndexResponse =
            serde_json::from_value(json!({"status": "error", "message": "No PDF files"})).unwrap();
        assert!(!failed.succeeded());
    }

    #[test]
    fn test_error_detail_message() {
        let plain: ErrorDetail = serde_json::from_value(json!({"detail": "Only PDF files"})).unwrap();
        assert_eq!(plain.message(), "Only PDF files");

        let structured: ErrorDetail =
            serde_json::from_value(json!({"detail": [{"msg": "field required"}]})).unwrap();
        assert!(structured.message().contains("field required"));
    }
}
