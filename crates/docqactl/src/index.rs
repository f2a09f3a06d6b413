//! Index controller - server-side (re)indexing behind a confirmation

use docqa_common::ValidationError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::{Backend, IndexOutcome};
use crate::confirm::{Confirm, ConfirmRequest};
use crate::events::{EventSink, Operation, UiEvent};
use crate::guard::{BusyGuard, FlightGuard};
use crate::notify::Notifier;
use crate::status::StatusMonitor;

pub struct IndexController {
    backend: Arc<dyn Backend>,
    status: Arc<StatusMonitor>,
    confirm: Arc<dyn Confirm>,
    notifier: Notifier,
    sink: EventSink,
    in_flight: AtomicBool,
}

impl IndexController {
    pub fn new(
        backend: Arc<dyn Backend>,
        status: Arc<StatusMonitor>,
        confirm: Arc<dyn Confirm>,
        notifier: Notifier,
        sink: EventSink,
    ) -> Self {
        Self {
            backend,
            status,
            confirm,
            notifier,
            sink,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Ask, then index. The trigger stays disabled until the call settles;
    /// readiness is refreshed afterwards whether indexing worked or not.
    pub async fn trigger(&self) -> Result<IndexOutcome, ValidationError> {
        if self.is_running() {
            self.notifier.warning(ValidationError::IndexInFlight.to_string());
            return Err(ValidationError::IndexInFlight);
        }
        if !self.confirm.confirm(&ConfirmRequest::index()).await {
            return Err(ValidationError::Declined);
        }
        let Some(flight) = FlightGuard::try_acquire(&self.in_flight) else {
            self.notifier.warning(ValidationError::IndexInFlight.to_string());
            return Err(ValidationError::IndexInFlight);
        };

        self.sink.emit(UiEvent::IndexControl { enabled: false });
        let busy = BusyGuard::new(&self.sink, Operation::Index);
        info!("indexing started");

        let outcome = match self.backend.trigger_index().await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "index request failed");
                IndexOutcome {
                    succeeded: false,
                    message: format!("Error while indexing documents: {}", err.user_message()),
                    files: Vec::new(),
                }
            }
        };

        if outcome.succeeded {
            info!(files = ?outcome.files, "indexing finished");
            self.notifier.success(outcome.message.clone());
        } else {
            self.notifier.error(outcome.message.clone());
        }

        self.status.refresh().await;

        drop(flight);
        self.sink.emit(UiEvent::IndexControl { enabled: true });
        drop(busy);
        Ok(outcome)
    }
}
