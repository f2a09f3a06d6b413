//! Deletion flow

use docqa_common::{ErrorKind, ValidationError};
use std::sync::Arc;
use tracing::warn;

use crate::backend::Backend;
use crate::confirm::{Confirm, ConfirmRequest};
use crate::notify::Notifier;
use crate::registry::DocumentRegistry;
use crate::status::StatusMonitor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Failed { reason: String, kind: ErrorKind },
}

pub struct DeletionFlow {
    backend: Arc<dyn Backend>,
    registry: Arc<DocumentRegistry>,
    status: Arc<StatusMonitor>,
    confirm: Arc<dyn Confirm>,
    notifier: Notifier,
}

impl DeletionFlow {
    pub fn new(
        backend: Arc<dyn Backend>,
        registry: Arc<DocumentRegistry>,
        status: Arc<StatusMonitor>,
        confirm: Arc<dyn Confirm>,
        notifier: Notifier,
    ) -> Self {
        Self {
            backend,
            registry,
            status,
            confirm,
            notifier,
        }
    }

    /// Delete after confirmation. Success refreshes the list and readiness
    /// (removing the last document can make the system not ready); failure
    /// only notifies.
    pub async fn delete(&self, filename: &str) -> Result<DeleteOutcome, ValidationError> {
        if !self.confirm.confirm(&ConfirmRequest::delete(filename)).await {
            return Err(ValidationError::Declined);
        }

        match self.backend.delete_document(filename).await {
            Ok(()) => {
                self.notifier.success(format!("Deleted {}", filename));
                self.registry.refresh().await;
                self.status.refresh().await;
                Ok(DeleteOutcome::Deleted)
            }
            Err(err) => {
                warn!(file = %filename, error = %err, "delete failed");
                let reason = err.user_message();
                self.notifier
                    .error(format!("Failed to delete {}: {}", filename, reason));
                Ok(DeleteOutcome::Failed {
                    reason,
                    kind: err.kind(),
                })
            }
        }
    }
}
