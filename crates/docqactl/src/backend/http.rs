//! REST client for the retrieval/generation server

use async_trait::async_trait;
use docqa_common::{
    ClientError, DocumentRecord, DocumentsResponse, ErrorDetail, IndexResponse, QueryRequest,
    QueryResponse, StatusResponse,
};
use reqwest::multipart::{Form, Part};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{Backend, IndexOutcome};
use crate::upload::FileHandle;

/// HTTP backend. No timeout or retry is layered on top of reqwest.
pub struct HttpBackend {
    client: reqwest::Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("docqactl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Append path segments to the base URL; each segment is percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn transport(err: reqwest::Error) -> ClientError {
    if err.is_decode() {
        ClientError::Decode(err.to_string())
    } else {
        ClientError::Transport(err.to_string())
    }
}

/// Build a protocol error, preferring the FastAPI `detail` field
fn protocol_error(status: StatusCode, body: &[u8]) -> ClientError {
    let detail = serde_json::from_slice::<ErrorDetail>(body)
        .ok()
        .map(|d| d.message())
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    ClientError::Protocol {
        status: status.as_u16(),
        detail,
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
    serde_json::from_slice(body).map_err(|e| ClientError::Decode(e.to_string()))
}

async fn read_body(response: reqwest::Response) -> Result<(StatusCode, Vec<u8>), ClientError> {
    let status = response.status();
    let body = response.bytes().await.map_err(transport)?;
    Ok((status, body.to_vec()))
}

#[async_trait]
impl Backend for HttpBackend {
    async fn status(&self) -> Result<StatusResponse, ClientError> {
        let url = self.endpoint(&["api", "status"])?;
        let response = self.client.get(url).send().await.map_err(transport)?;
        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            return Err(protocol_error(status, &body));
        }
        decode(&body)
    }

    async fn list_documents(&self) -> Result<Vec<DocumentRecord>, ClientError> {
        let url = self.endpoint(&["api", "documents"])?;
        let response = self.client.get(url).send().await.map_err(transport)?;
        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            return Err(protocol_error(status, &body));
        }
        let listing: DocumentsResponse = decode(&body)?;
        Ok(listing.documents)
    }

    async fn upload(&self, file: &FileHandle) -> Result<(), ClientError> {
        let url = self.endpoint(&["api", "upload"])?;
        let bytes = file.read().await?;
        debug!(file = %file.name(), bytes = bytes.len(), "uploading");

        let part = Part::bytes(bytes).file_name(file.name().to_string());
        let form = Form::new().part("file", part);
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        // Success body is ignored
        let (status, body) = read_body(response).await?;
        if status.is_success() {
            Ok(())
        } else {
            Err(protocol_error(status, &body))
        }
    }

    async fn delete_document(&self, filename: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["api", "documents", filename])?;
        let response = self.client.delete(url).send().await.map_err(transport)?;
        let (status, body) = read_body(response).await?;
        if status.is_success() {
            Ok(())
        } else {
            Err(protocol_error(status, &body))
        }
    }

    async fn trigger_index(&self) -> Result<IndexOutcome, ClientError> {
        let url = self.endpoint(&["api", "index"])?;
        let response = self.client.post(url).send().await.map_err(transport)?;
        let (status, body) = read_body(response).await?;

        match serde_json::from_slice::<IndexResponse>(&body) {
            Ok(reply) => Ok(IndexOutcome {
                succeeded: status.is_success() && reply.succeeded(),
                message: reply.message,
                files: reply.files,
            }),
            Err(e) if status.is_success() => Err(ClientError::Decode(e.to_string())),
            Err(_) => Err(protocol_error(status, &body)),
        }
    }

    async fn query(&self, question: &str) -> Result<QueryResponse, ClientError> {
        let url = self.endpoint(&["api", "query"])?;
        let request = QueryRequest {
            question: question.to_string(),
        };
        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(transport)?;
        let (status, body) = read_body(response).await?;

        if status.is_success() {
            return decode(&body);
        }

        // Error statuses still count as an answer when they carry an
        // explicit error message
        if let Ok(reply) = serde_json::from_slice::<QueryResponse>(&body) {
            if reply.error_message().is_some() {
                return Ok(reply);
            }
        }
        if let Ok(detail) = serde_json::from_slice::<ErrorDetail>(&body) {
            return Ok(QueryResponse {
                error: Some(detail.message()),
                ..QueryResponse::default()
            });
        }
        Err(protocol_error(status, &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_segments() {
        let backend = HttpBackend::new("http://127.0.0.1:8000").unwrap();
        assert_eq!(
            backend.endpoint(&["api", "status"]).unwrap().as_str(),
            "http://127.0.0.1:8000/api/status"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let backend = HttpBackend::new("https://example.org/rag/").unwrap();
        assert_eq!(
            backend.endpoint(&["api", "index"]).unwrap().as_str(),
            "https://example.org/rag/api/index"
        );
    }

    #[test]
    fn test_filename_segment_is_encoded() {
        let backend = HttpBackend::new("http://localhost:8000").unwrap();
        let url = backend
            .endpoint(&["api", "documents", "annual report?.pdf"])
            .unwrap();
        assert_eq!(url.path(), "/api/documents/annual%20report%3F.pdf");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpBackend::new("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpBackend::new("mailto:someone@example.org"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_protocol_error_detail() {
        let err = protocol_error(StatusCode::BAD_REQUEST, br#"{"detail":"Only PDF files"}"#);
        assert!(matches!(
            err,
            ClientError::Protocol { status: 400, ref detail } if detail == "Only PDF files"
        ));

        let err = protocol_error(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>");
        assert!(matches!(
            err,
            ClientError::Protocol { status: 502, ref detail } if detail == "Bad Gateway"
        ));
    }
}
