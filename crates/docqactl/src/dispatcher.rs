//! Command dispatcher
//!
//! Front ends never await controllers on their own input loop. They send a
//! [`Command`]; the dispatcher runs each one on its own task so a long
//! index run does not hold up a status refresh or a question.

use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

use crate::app::App;
use crate::upload::FileHandle;

#[derive(Debug, Clone)]
pub enum Command {
    RefreshStatus,
    RefreshDocuments,
    Upload(Vec<FileHandle>),
    TriggerIndex,
    Delete(String),
    Ask(String),
}

impl Command {
    /// Upload command for typed paths
    pub fn upload_paths(paths: Vec<PathBuf>) -> Self {
        Self::Upload(paths.into_iter().map(FileHandle::from_path).collect())
    }

    fn name(&self) -> &'static str {
        match self {
            Self::RefreshStatus => "refresh_status",
            Self::RefreshDocuments => "refresh_documents",
            Self::Upload(_) => "upload",
            Self::TriggerIndex => "index",
            Self::Delete(_) => "delete",
            Self::Ask(_) => "ask",
        }
    }
}

pub struct Dispatcher {
    app: App,
    rx: mpsc::Receiver<Command>,
    cancel: CancellationToken,
    tasks: TaskTracker,
}

impl Dispatcher {
    pub fn new(app: App, rx: mpsc::Receiver<Command>, cancel: CancellationToken) -> Self {
        Self {
            app,
            rx,
            cancel,
            tasks: TaskTracker::new(),
        }
    }

    /// Run until cancelled or until every sender is gone. On a closed
    /// channel the commands already running are awaited; on cancellation
    /// they are left behind.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!("dispatcher cancelled");
                    return;
                }
                command = self.rx.recv() => match command {
                    Some(command) => self.spawn(command),
                    None => break,
                },
            }
        }

        self.tasks.close();
        self.tasks.wait().await;
        debug!("dispatcher drained");
    }

    fn spawn(&self, command: Command) {
        debug!(command = command.name(), "dispatching");
        let app = self.app.clone();
        self.tasks.spawn(async move { execute(&app, command).await });
    }
}

/// Run one command to completion. Outcomes reach the user through events
/// and notifications.
pub async fn execute(app: &App, command: Command) {
    match command {
        Command::RefreshStatus => {
            app.status.refresh().await;
        }
        Command::RefreshDocuments => {
            app.registry.refresh().await;
        }
        Command::Upload(files) => {
            if let Err(reason) = app.uploads.upload(files).await {
                app.notifier.warning(reason.to_string());
            }
        }
        Command::TriggerIndex => {
            if let Err(reason) = app.indexer.trigger().await {
                debug!(%reason, "index not started");
            }
        }
        Command::Delete(filename) => {
            if let Err(reason) = app.deletion.delete(&filename).await {
                debug!(file = %filename, %reason, "delete not started");
            }
        }
        Command::Ask(question) => {
            app.chat.submit(&question).await;
        }
    }
}

/// Queue a status refresh every `period`, starting one period from now
pub fn spawn_status_timer(
    period: Duration,
    commands: mpsc::Sender<Command>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = period.as_secs(), "status timer started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if commands.send(Command::RefreshStatus).await.is_err() {
                        break;
                    }
                }
            }
        }
        debug!("status timer stopped");
    })
}
