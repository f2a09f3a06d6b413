//! Document registry view - the uploaded documents as the server lists them

use docqa_common::DocumentRecord;
use std::sync::{Arc, Mutex};
use tracing::warn;

use crate::backend::Backend;
use crate::events::{EventSink, UiEvent};

pub const EMPTY_PLACEHOLDER: &str = "No documents uploaded yet";
pub const FAILED_PLACEHOLDER: &str = "Failed to load document list";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RegistryView {
    /// Nothing fetched yet
    #[default]
    Loading,
    Empty,
    /// Server order preserved
    Listed(Vec<DocumentRecord>),
    Failed(String),
}

impl RegistryView {
    pub fn from_documents(documents: Vec<DocumentRecord>) -> Self {
        if documents.is_empty() {
            Self::Empty
        } else {
            Self::Listed(documents)
        }
    }

    pub fn documents(&self) -> &[DocumentRecord] {
        match self {
            Self::Listed(docs) => docs,
            _ => &[],
        }
    }

    /// Placeholder line for views without entries
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::Loading => Some("Loading..."),
            Self::Empty => Some(EMPTY_PLACEHOLDER),
            Self::Failed(_) => Some(FAILED_PLACEHOLDER),
            Self::Listed(_) => None,
        }
    }
}

pub struct DocumentRegistry {
    backend: Arc<dyn Backend>,
    sink: EventSink,
    last: Mutex<RegistryView>,
}

impl DocumentRegistry {
    pub fn new(backend: Arc<dyn Backend>, sink: EventSink) -> Self {
        Self {
            backend,
            sink,
            last: Mutex::new(RegistryView::Loading),
        }
    }

    /// Re-fetch the full list. A failure becomes an inline placeholder;
    /// the next refresh retries.
    pub async fn refresh(&self) -> RegistryView {
        let view = match self.backend.list_documents().await {
            Ok(documents) => RegistryView::from_documents(documents),
            Err(err) => {
                warn!(error = %err, "document list failed");
                RegistryView::Failed(err.user_message())
            }
        };

        *self.last.lock().unwrap_or_else(|p| p.into_inner()) = view.clone();
        self.sink.emit(UiEvent::Documents(view.clone()));
        view
    }

    pub fn current(&self) -> RegistryView {
        self.last.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FakeBackend;

    #[tokio::test]
    async fn test_empty_listing() {
        let registry = DocumentRegistry::new(Arc::new(FakeBackend::new()), EventSink::detached());
        assert_eq!(registry.current(), RegistryView::Loading);

        let view = registry.refresh().await;
        assert_eq!(view, RegistryView::Empty);
        assert_eq!(view.placeholder(), Some(EMPTY_PLACEHOLDER));
    }

    #[tokio::test]
    async fn test_listing_keeps_order() {
        let backend = FakeBackend::indexed_with(vec![
            DocumentRecord::new("b.pdf", 0.5),
            DocumentRecord::new("a.pdf", 2.0),
        ]);
        let registry = DocumentRegistry::new(Arc::new(backend), EventSink::detached());
        let view = registry.refresh().await;
        let names: Vec<_> = view.documents().iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, vec!["b.pdf", "a.pdf"]);
        assert_eq!(view.placeholder(), None);
    }

    #[tokio::test]
    async fn test_failure_is_inline() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_unreachable(true);
        let registry = DocumentRegistry::new(backend.clone(), EventSink::detached());

        let view = registry.refresh().await;
        assert!(matches!(view, RegistryView::Failed(_)));
        assert_eq!(view.placeholder(), Some(FAILED_PLACEHOLDER));

        backend.set_unreachable(false);
        assert_eq!(registry.refresh().await, RegistryView::Empty);
    }
}
