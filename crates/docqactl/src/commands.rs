//! One-shot commands
//!
//! Each command runs one controller operation against the server, prints
//! what happened and returns the process exit code.

use docqa_common::{ErrorKind, ValidationError};
use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::app::App;
use crate::chat::SubmitOutcome;
use crate::console::{with_events, Console};
use crate::delete::DeleteOutcome;
use crate::errors::{
    EXIT_GENERAL_ERROR, EXIT_SERVER_UNAVAILABLE, EXIT_SUCCESS, EXIT_VALIDATION,
};
use crate::escape::literal_line;
use crate::events::UiEvent;
use crate::notify::{Level, Notification};
use crate::registry::RegistryView;
use crate::status::Readiness;
use crate::upload::FileHandle;

/// Everything a one-shot command needs
pub struct Session {
    pub app: App,
    pub events: mpsc::UnboundedReceiver<UiEvent>,
    pub console: Console,
}

impl Session {
    /// Exit code for a failure: unreachable when the last poll said so
    fn failure_code(&self) -> i32 {
        if self.app.status.current().readiness == Readiness::Unreachable {
            EXIT_SERVER_UNAVAILABLE
        } else {
            EXIT_GENERAL_ERROR
        }
    }
}

fn validation_code(err: &ValidationError) -> i32 {
    match err {
        ValidationError::UploadInFlight
        | ValidationError::IndexInFlight
        | ValidationError::QuestionInFlight => EXIT_GENERAL_ERROR,
        _ => EXIT_VALIDATION,
    }
}

pub async fn status(mut session: Session) -> i32 {
    let app = session.app.clone();
    let status = with_events(&mut session.console, &mut session.events, app.status.refresh()).await;
    session.console.status(&status);
    match status.readiness {
        Readiness::Unreachable => EXIT_SERVER_UNAVAILABLE,
        _ => EXIT_SUCCESS,
    }
}

pub async fn documents(mut session: Session) -> i32 {
    let app = session.app.clone();
    with_events(&mut session.console, &mut session.events, app.bootstrap()).await;
    let view = app.registry.current();
    session.console.documents(&view);
    match view {
        RegistryView::Failed(_) => session.failure_code(),
        _ => EXIT_SUCCESS,
    }
}

pub async fn upload(mut session: Session, files: Vec<PathBuf>) -> i32 {
    let app = session.app.clone();
    let handles = files.into_iter().map(FileHandle::from_path).collect();
    let result = with_events(
        &mut session.console,
        &mut session.events,
        app.uploads.upload(handles),
    )
    .await;

    match result {
        Ok(report) => {
            session.console.documents(&app.registry.current());
            if report.failed() == 0 {
                EXIT_SUCCESS
            } else {
                EXIT_GENERAL_ERROR
            }
        }
        Err(err) => {
            session
                .console
                .notification(&Notification::new(Level::Warning, err.to_string()));
            validation_code(&err)
        }
    }
}

pub async fn delete(mut session: Session, filename: String) -> i32 {
    let app = session.app.clone();
    let result = with_events(
        &mut session.console,
        &mut session.events,
        app.deletion.delete(&filename),
    )
    .await;

    match result {
        Ok(DeleteOutcome::Deleted) => {
            session.console.status(&app.status.current());
            EXIT_SUCCESS
        }
        Ok(DeleteOutcome::Failed { kind, .. }) => match kind {
            ErrorKind::Transport => EXIT_SERVER_UNAVAILABLE,
            _ => EXIT_GENERAL_ERROR,
        },
        Err(err) => validation_code(&err),
    }
}

pub async fn index(mut session: Session) -> i32 {
    let app = session.app.clone();
    let result = with_events(&mut session.console, &mut session.events, app.indexer.trigger()).await;

    match result {
        Ok(outcome) => {
            for file in &outcome.files {
                println!("  {}", literal_line(file));
            }
            session.console.status(&app.status.current());
            if outcome.succeeded {
                EXIT_SUCCESS
            } else {
                session.failure_code()
            }
        }
        Err(err) => validation_code(&err),
    }
}

/// Poll readiness first; the question is only sent when the server is ready
pub async fn ask(mut session: Session, question: String) -> i32 {
    let app = session.app.clone();
    let outcome = with_events(&mut session.console, &mut session.events, async {
        app.status.refresh().await;
        app.chat.submit(&question).await
    })
    .await;

    if !matches!(outcome, SubmitOutcome::Rejected(_)) {
        if let Some(answer) = app.chat.transcript().last() {
            session.console.message(answer);
        }
    }

    match outcome {
        SubmitOutcome::Answered => EXIT_SUCCESS,
        SubmitOutcome::Failed => session.failure_code(),
        SubmitOutcome::Rejected(ValidationError::NotReady)
            if app.status.current().readiness == Readiness::Unreachable =>
        {
            EXIT_SERVER_UNAVAILABLE
        }
        SubmitOutcome::Rejected(err) => validation_code(&err),
    }
}
