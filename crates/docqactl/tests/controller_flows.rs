//! End-to-end controller flows against the in-memory backend

use std::sync::Arc;
use std::time::Duration;

use docqa_common::{DocumentRecord, ValidationError};
use docqactl::backend::FakeBackend;
use docqactl::chat::SubmitOutcome;
use docqactl::confirm::AutoConfirm;
use docqactl::delete::DeleteOutcome;
use docqactl::events::{drain, EventSink, UiEvent};
use docqactl::notify::Level;
use docqactl::registry::RegistryView;
use docqactl::status::Readiness;
use docqactl::tui::state::AppState;
use docqactl::upload::FileHandle;
use docqactl::App;
use tokio::sync::mpsc::UnboundedReceiver;

fn app_with(backend: Arc<FakeBackend>, confirm: bool) -> (App, UnboundedReceiver<UiEvent>) {
    let (sink, events) = EventSink::channel();
    let app = App::new(backend, Arc::new(AutoConfirm(confirm)), sink);
    (app, events)
}

fn notifications(events: &[UiEvent]) -> Vec<(Level, String)> {
    events
        .iter()
        .filter_map(|e| match e {
            UiEvent::Notify(n) => Some((n.level, n.message.clone())),
            _ => None,
        })
        .collect()
}

fn names(view: &RegistryView) -> Vec<String> {
    view.documents().iter().map(|d| d.filename.clone()).collect()
}

#[tokio::test]
async fn test_batch_upload_continues_past_a_failure() {
    let backend = Arc::new(FakeBackend::new());
    backend.fail_upload("b.pdf", "Only PDF files are allowed");
    let (app, mut events) = app_with(backend.clone(), true);

    let dir = tempfile::tempdir().unwrap();
    let mut files = Vec::new();
    for name in ["a.pdf", "b.pdf", "c.pdf"] {
        let path = dir.path().join(name);
        std::fs::write(&path, b"%PDF-1.4").unwrap();
        files.push(FileHandle::from_path(path));
    }

    let report = app.uploads.upload(files).await.unwrap();
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(backend.upload_attempts(), vec!["a.pdf", "b.pdf", "c.pdf"]);
    assert_eq!(names(&app.registry.current()), vec!["a.pdf", "c.pdf"]);
    assert_eq!(backend.calls().status, 1);
    assert_eq!(app.status.current().readiness, Readiness::NotReady);

    let events = drain(&mut events);
    let notes = notifications(&events);
    let successes = notes.iter().filter(|(l, _)| *l == Level::Success).count();
    let errors: Vec<_> = notes.iter().filter(|(l, _)| *l == Level::Error).collect();
    assert_eq!(successes, 2);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].1.contains("b.pdf"));
    assert!(errors[0].1.contains("Only PDF files are allowed"));

    // Loading indicator comes down only after the list and status refresh
    let refreshed = events
        .iter()
        .position(|e| matches!(e, UiEvent::Documents(_)))
        .unwrap();
    let polled = events
        .iter()
        .position(|e| matches!(e, UiEvent::Status(_)))
        .unwrap();
    let idle = events
        .iter()
        .rposition(|e| matches!(e, UiEvent::Busy { active: false, .. }))
        .unwrap();
    assert!(refreshed < polled);
    assert!(polled < idle);
    assert!(events.iter().any(|e| matches!(e, UiEvent::SelectionCleared)));
}

#[tokio::test]
async fn test_missing_file_in_batch_is_reported_not_fatal() {
    let backend = Arc::new(FakeBackend::new());
    let (app, mut events) = app_with(backend.clone(), true);

    let dir = tempfile::tempdir().unwrap();
    let present = dir.path().join("here.pdf");
    std::fs::write(&present, b"%PDF").unwrap();
    let files = vec![
        FileHandle::from_path(dir.path().join("gone.pdf")),
        FileHandle::from_path(present),
    ];

    let report = app.uploads.upload(files).await.unwrap();
    assert_eq!(report.succeeded(), 1);
    assert_eq!(names(&app.registry.current()), vec!["here.pdf"]);
    let notes = notifications(&drain(&mut events));
    assert!(notes.iter().any(|(l, m)| *l == Level::Error && m.contains("gone.pdf")));
}

#[tokio::test]
async fn test_empty_selection_sends_nothing() {
    let backend = Arc::new(FakeBackend::new());
    let (app, _events) = app_with(backend.clone(), true);

    let err = app.uploads.upload(Vec::new()).await.unwrap_err();
    assert_eq!(err, ValidationError::NoFiles);
    assert_eq!(backend.calls().upload, 0);
    assert_eq!(backend.calls().list, 0);
}

#[tokio::test]
async fn test_deleting_last_document_makes_system_not_ready() {
    let backend = Arc::new(FakeBackend::indexed_with(vec![DocumentRecord::new("only.pdf", 1.5)]));
    let (app, mut events) = app_with(backend.clone(), true);
    app.bootstrap().await;
    assert!(app.status.current().ready());

    let outcome = app.deletion.delete("only.pdf").await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert_eq!(app.registry.current(), RegistryView::Empty);
    assert_eq!(app.status.current().readiness, Readiness::NotReady);

    let notes = notifications(&drain(&mut events));
    assert!(notes.contains(&(Level::Success, "Deleted only.pdf".to_string())));

    // The chat is gated on the fresh status
    let outcome = app.chat.submit("anything left?").await;
    assert_eq!(outcome, SubmitOutcome::Rejected(ValidationError::NotReady));
    assert_eq!(backend.calls().query, 0);
}

#[tokio::test]
async fn test_declined_confirmations_send_no_requests() {
    let backend = Arc::new(FakeBackend::indexed_with(vec![DocumentRecord::new("keep.pdf", 0.2)]));
    let (app, mut events) = app_with(backend.clone(), false);

    assert_eq!(
        app.deletion.delete("keep.pdf").await.unwrap_err(),
        ValidationError::Declined
    );
    assert_eq!(app.indexer.trigger().await.unwrap_err(), ValidationError::Declined);

    let calls = backend.calls();
    assert_eq!(calls.delete, 0);
    assert_eq!(calls.index, 0);
    assert_eq!(backend.documents().len(), 1);
    assert!(notifications(&drain(&mut events)).is_empty());
}

#[tokio::test]
async fn test_failed_delete_keeps_list_untouched() {
    let backend = Arc::new(FakeBackend::indexed_with(vec![DocumentRecord::new("locked.pdf", 0.1)]));
    backend.fail_delete("locked.pdf", "Permission denied");
    let (app, mut events) = app_with(backend.clone(), true);
    app.bootstrap().await;
    let list_calls = backend.calls().list;

    let outcome = app.deletion.delete("locked.pdf").await.unwrap();
    assert!(matches!(outcome, DeleteOutcome::Failed { ref reason, .. } if reason == "Permission denied"));
    assert_eq!(backend.calls().list, list_calls);
    assert_eq!(names(&app.registry.current()), vec!["locked.pdf"]);

    let notes = notifications(&drain(&mut events));
    assert!(notes.contains(&(
        Level::Error,
        "Failed to delete locked.pdf: Permission denied".to_string()
    )));
}

#[tokio::test]
async fn test_second_index_trigger_is_refused_while_running() {
    let backend = Arc::new(FakeBackend::new());
    let gate = backend.hold_index();
    let (app, mut events) = app_with(backend.clone(), true);

    let indexer = app.indexer.clone();
    let first = tokio::spawn(async move { indexer.trigger().await });

    // Wait until the first run is parked inside the backend
    while backend.calls().index == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(app.indexer.is_running());
    assert_eq!(
        app.indexer.trigger().await.unwrap_err(),
        ValidationError::IndexInFlight
    );
    assert_eq!(backend.calls().index, 1);

    gate.notify_one();
    let outcome = first.await.unwrap().unwrap();
    // Nothing uploaded yet: the server reports failure in a 2xx body
    assert!(!outcome.succeeded);
    assert!(!app.indexer.is_running());
    assert_eq!(backend.calls().status, 1);
    assert_eq!(app.status.current().readiness, Readiness::NotReady);

    let events = drain(&mut events);
    let notes = notifications(&events);
    assert!(notes.contains(&(
        Level::Error,
        "No PDF files found. Upload PDFs first!".to_string()
    )));
    let disabled = events
        .iter()
        .position(|e| matches!(e, UiEvent::IndexControl { enabled: false }))
        .unwrap();
    let enabled = events
        .iter()
        .position(|e| matches!(e, UiEvent::IndexControl { enabled: true }))
        .unwrap();
    assert!(disabled < enabled);
}

#[tokio::test]
async fn test_index_transport_failure_still_refreshes_status() {
    let backend = Arc::new(FakeBackend::indexed_with(vec![DocumentRecord::new("a.pdf", 1.0)]));
    let (app, mut events) = app_with(backend.clone(), true);
    app.bootstrap().await;
    assert!(app.status.current().ready());
    let polls = backend.calls().status;

    backend.set_unreachable(true);
    let outcome = app.indexer.trigger().await.unwrap();
    assert!(!outcome.succeeded);
    assert!(outcome
        .message
        .starts_with("Error while indexing documents: "));
    assert!(outcome.message.contains("cannot reach server"));

    assert_eq!(backend.calls().status, polls + 1);
    assert_eq!(app.status.current().readiness, Readiness::Unreachable);
    assert!(!app.indexer.is_running());

    let events = drain(&mut events);
    assert!(notifications(&events)
        .iter()
        .any(|(l, m)| *l == Level::Error && m == &outcome.message));
    assert!(events
        .iter()
        .any(|e| matches!(e, UiEvent::IndexControl { enabled: true })));
}

#[tokio::test]
async fn test_upload_index_ask_round_trip() {
    let backend = Arc::new(FakeBackend::new());
    let (app, mut events) = app_with(backend.clone(), true);
    app.bootstrap().await;
    assert_eq!(app.status.current().readiness, Readiness::NotReady);

    app.uploads
        .upload(vec![FileHandle::in_memory("guide.pdf", b"%PDF guide".to_vec())])
        .await
        .unwrap();
    let outcome = app.indexer.trigger().await.unwrap();
    assert!(outcome.succeeded);
    assert_eq!(outcome.files, vec!["guide.pdf"]);
    assert!(app.status.current().ready());

    let answer = app.chat.submit("  what is this?  ").await;
    assert_eq!(answer, SubmitOutcome::Answered);
    assert_eq!(backend.questions(), vec!["what is this?"]);

    let transcript = app.chat.transcript();
    assert_eq!(transcript.len(), 2);
    let reply = &transcript.messages()[1];
    assert_eq!(reply.content, "Answer to: what is this?");
    assert_eq!(reply.sources[0].metadata.source_or_placeholder(), "guide.pdf");

    // Feeding the same events to the TUI state yields the same view
    let mut state = AppState::new("demo");
    for event in drain(&mut events) {
        state.apply(event);
    }
    assert!(state.submit_enabled());
    assert_eq!(state.transcript.len(), 2);
    assert_eq!(names(&state.documents), vec!["guide.pdf"]);
    assert!(state.busy.is_empty());
}

#[tokio::test]
async fn test_repeated_polls_change_nothing_else() {
    let backend = Arc::new(FakeBackend::indexed_with(vec![
        DocumentRecord::new("a.pdf", 1.0),
        DocumentRecord::new("b.pdf", 2.0),
    ]));
    let (app, mut events) = app_with(backend.clone(), true);
    app.bootstrap().await;
    app.chat.submit("first").await;
    let transcript = app.chat.transcript();
    let listing = app.registry.current();
    drain(&mut events);

    for _ in 0..3 {
        app.status.refresh().await;
        app.registry.refresh().await;
    }

    assert_eq!(app.chat.transcript(), transcript);
    assert_eq!(app.registry.current(), listing);
    assert!(app.status.current().ready());
    assert!(notifications(&drain(&mut events)).is_empty());
}

#[tokio::test]
async fn test_unreachable_server_blocks_submit() {
    let backend = Arc::new(FakeBackend::indexed_with(vec![DocumentRecord::new("a.pdf", 1.0)]));
    let (app, mut events) = app_with(backend.clone(), true);
    app.bootstrap().await;

    let mut state = AppState::new("demo");
    for event in drain(&mut events) {
        state.apply(event);
    }
    assert!(state.submit_enabled());

    backend.set_unreachable(true);
    app.status.refresh().await;
    for event in drain(&mut events) {
        state.apply(event);
    }
    assert_eq!(app.status.current().readiness, Readiness::Unreachable);
    assert!(!state.submit_enabled());

    let outcome = app.chat.submit("hello?").await;
    assert_eq!(outcome, SubmitOutcome::Rejected(ValidationError::NotReady));
    assert_eq!(backend.calls().query, 0);
}
