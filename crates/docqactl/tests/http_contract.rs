//! REST contract tests for HttpBackend
//!
//! Verify request shape (method, path, body) and response mapping into the
//! transport / protocol error taxonomy against a wiremock server.

use docqa_common::ClientError;
use docqactl::backend::{Backend, HttpBackend};
use docqactl::upload::FileHandle;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn backend(server: &MockServer) -> HttpBackend {
    HttpBackend::new(&server.uri()).unwrap()
}

// ────────────────────────────────────────────────────────────────────────────
// Status and listing
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_status_parses_ready_flag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ready",
            "documents_indexed": true,
            "vector_store_exists": true,
            "message": "System is ready"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let status = backend(&server).await.status().await.unwrap();
    assert!(status.documents_indexed);
    assert_eq!(status.message.as_deref(), Some("System is ready"));
}

#[tokio::test]
async fn test_status_error_is_protocol_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = backend(&server).await.status().await.unwrap_err();
    assert!(matches!(err, ClientError::Protocol { status: 503, .. }));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_failure() {
    // Bind then drop to get a port nobody listens on
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };
    let err = HttpBackend::new(&uri).unwrap().status().await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}

#[tokio::test]
async fn test_documents_keep_server_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                {"filename": "z.pdf", "size": 2048, "size_mb": 0.0},
                {"filename": "a.pdf", "size": 3145728, "size_mb": 3.0}
            ]
        })))
        .mount(&server)
        .await;

    let docs = backend(&server).await.list_documents().await.unwrap();
    let names: Vec<_> = docs.iter().map(|d| d.filename.as_str()).collect();
    assert_eq!(names, vec!["z.pdf", "a.pdf"]);
    assert_eq!(docs[1].size, Some(3145728));
}

// ────────────────────────────────────────────────────────────────────────────
// Upload and delete
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_upload_sends_multipart_file_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"report.pdf\""))
        .and(body_string_contains("%PDF-1.4 fake"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "File report.pdf uploaded successfully",
            "filename": "report.pdf"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let file = FileHandle::in_memory("report.pdf", b"%PDF-1.4 fake".to_vec());
    backend(&server).await.upload(&file).await.unwrap();
}

#[tokio::test]
async fn test_upload_rejection_carries_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Only PDF files are allowed"})),
        )
        .mount(&server)
        .await;

    let file = FileHandle::in_memory("notes.txt", b"text".to_vec());
    let err = backend(&server).await.upload(&file).await.unwrap_err();
    assert_eq!(err.user_message(), "Only PDF files are allowed");
}

#[tokio::test]
async fn test_upload_of_missing_file_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = FileHandle::from_path(dir.path().join("gone.pdf"));
    let err = backend(&server).await.upload(&file).await.unwrap_err();
    assert!(matches!(err, ClientError::File { .. }));
}

#[tokio::test]
async fn test_delete_encodes_filename() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/documents/my%20file.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "File my file.pdf deleted successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    backend(&server)
        .await
        .delete_document("my file.pdf")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/documents/missing.pdf"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "File not found"})))
        .mount(&server)
        .await;

    let err = backend(&server)
        .await
        .delete_document("missing.pdf")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Protocol { status: 404, ref detail } if detail == "File not found"));
}

// ────────────────────────────────────────────────────────────────────────────
// Index
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_index_success_discriminator() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/index"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "Indexed 2 PDF files",
            "files": ["a.pdf", "b.pdf"]
        })))
        .mount(&server)
        .await;

    let outcome = backend(&server).await.trigger_index().await.unwrap();
    assert!(outcome.succeeded);
    assert_eq!(outcome.message, "Indexed 2 PDF files");
    assert_eq!(outcome.files, vec!["a.pdf", "b.pdf"]);
}

#[tokio::test]
async fn test_index_error_status_in_2xx_body_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/index"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "message": "No PDF files found. Upload PDFs first!"
        })))
        .mount(&server)
        .await;

    let outcome = backend(&server).await.trigger_index().await.unwrap();
    assert!(!outcome.succeeded);
    assert_eq!(outcome.message, "No PDF files found. Upload PDFs first!");
}

#[tokio::test]
async fn test_index_server_error_uses_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/index"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "Error indexing documents: boom"})),
        )
        .mount(&server)
        .await;

    let err = backend(&server).await.trigger_index().await.unwrap_err();
    assert_eq!(err.user_message(), "Error indexing documents: boom");
}

// ────────────────────────────────────────────────────────────────────────────
// Query
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_query_sends_question_and_parses_sources() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/query"))
        .and(body_json(json!({"question": "What is RAG?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "Retrieval augmented generation.",
            "sources": [
                {"content": "RAG combines...", "metadata": {"page": 3, "source": "/data/pdfs/rag.pdf"}},
                {"content": "no metadata", "metadata": {}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = backend(&server).await.query("What is RAG?").await.unwrap();
    assert_eq!(reply.answer, "Retrieval augmented generation.");
    assert_eq!(reply.sources.len(), 2);
    assert_eq!(reply.sources[0].metadata.page_or_placeholder(), "3");
    assert_eq!(reply.sources[1].metadata.source_or_placeholder(), "N/A");
    assert!(reply.error_message().is_none());
}

#[tokio::test]
async fn test_query_error_field_is_an_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "System is not ready. Index documents first!"
        })))
        .mount(&server)
        .await;

    let reply = backend(&server).await.query("anything").await.unwrap();
    assert_eq!(
        reply.error_message(),
        Some("System is not ready. Index documents first!")
    );
}

#[tokio::test]
async fn test_query_http_error_detail_becomes_error_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/query"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "Error processing query: oom"})),
        )
        .mount(&server)
        .await;

    let reply = backend(&server).await.query("anything").await.unwrap();
    assert_eq!(reply.error_message(), Some("Error processing query: oom"));
}

#[tokio::test]
async fn test_query_garbage_body_is_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let err = backend(&server).await.query("anything").await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn test_base_url_path_prefix_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rag/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"documents_indexed": false})))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&format!("{}/rag/", server.uri())).unwrap();
    assert!(!backend.status().await.unwrap().documents_indexed);
}
