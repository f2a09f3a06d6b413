//! Controller wiring
//!
//! One [`App`] per session. Every controller shares the same backend, the
//! same event sink and the same readiness cell.

use std::sync::Arc;

use crate::backend::Backend;
use crate::chat::ChatController;
use crate::confirm::Confirm;
use crate::delete::DeletionFlow;
use crate::events::EventSink;
use crate::index::IndexController;
use crate::notify::Notifier;
use crate::registry::DocumentRegistry;
use crate::status::StatusMonitor;
use crate::upload::UploadController;

#[derive(Clone)]
pub struct App {
    pub status: Arc<StatusMonitor>,
    pub registry: Arc<DocumentRegistry>,
    pub uploads: Arc<UploadController>,
    pub indexer: Arc<IndexController>,
    pub deletion: Arc<DeletionFlow>,
    pub chat: Arc<ChatController>,
    pub notifier: Notifier,
}

impl App {
    pub fn new(backend: Arc<dyn Backend>, confirm: Arc<dyn Confirm>, sink: EventSink) -> Self {
        let notifier = Notifier::new(sink.clone());
        let status = Arc::new(StatusMonitor::new(
            backend.clone(),
            notifier.clone(),
            sink.clone(),
        ));
        let registry = Arc::new(DocumentRegistry::new(backend.clone(), sink.clone()));
        let uploads = Arc::new(UploadController::new(
            backend.clone(),
            registry.clone(),
            status.clone(),
            notifier.clone(),
            sink.clone(),
        ));
        let indexer = Arc::new(IndexController::new(
            backend.clone(),
            status.clone(),
            confirm.clone(),
            notifier.clone(),
            sink.clone(),
        ));
        let deletion = Arc::new(DeletionFlow::new(
            backend.clone(),
            registry.clone(),
            status.clone(),
            confirm,
            notifier.clone(),
        ));
        let chat = Arc::new(ChatController::new(
            backend,
            status.subscribe(),
            notifier.clone(),
            sink,
        ));

        Self {
            status,
            registry,
            uploads,
            indexer,
            deletion,
            chat,
            notifier,
        }
    }

    /// Initial load: readiness and the document list
    pub async fn bootstrap(&self) {
        tokio::join!(self.status.refresh(), self.registry.refresh());
    }
}
