//! Line-oriented output for one-shot commands and the REPL
//!
//! Prints the same [`UiEvent`]s the TUI folds into its state. The loading
//! indicator is an indicatif spinner.

use docqa_common::config::ColorMode;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::future::Future;
use std::io::IsTerminal;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::chat::{ChatMessage, Role};
use crate::escape::{literal, literal_line};
use crate::events::{drain, UiEvent};
use crate::notify::{Level, Notification};
use crate::registry::RegistryView;
use crate::status::{Readiness, SystemStatus};

const THIN_SEP: &str = "------------------------------------------------------------";

pub struct Console {
    color: bool,
    spinner: Option<ProgressBar>,
}

impl Console {
    pub fn new(mode: ColorMode) -> Self {
        let color = match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => {
                std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
            }
        };
        Self {
            color,
            spinner: None,
        }
    }

    /// Print one controller event. Transcript and document events are
    /// left to the command that asked for them.
    pub fn show(&mut self, event: UiEvent) {
        match event {
            UiEvent::Notify(notification) => self.notification(&notification),
            UiEvent::Busy { op, active: true } => self.start_spinner(op.label()),
            UiEvent::Busy { active: false, .. } => self.stop_spinner(),
            _ => {}
        }
    }

    fn start_spinner(&mut self, label: &str) {
        if !std::io::stderr().is_terminal() {
            return;
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(format!("{}...", label));
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print above the spinner when one is running
    fn line(&self, text: String) {
        match &self.spinner {
            Some(spinner) => spinner.println(text),
            None => println!("{}", text),
        }
    }

    pub fn notification(&self, notification: &Notification) {
        let symbol = notification.level.symbol();
        let message = literal_line(&notification.message);
        let text = if self.color {
            match notification.level {
                Level::Info => format!("{} {}", symbol.cyan(), message),
                Level::Success => format!("{} {}", symbol.green(), message),
                Level::Warning => format!("{} {}", symbol.yellow(), message.yellow()),
                Level::Error => format!("{} {}", symbol.red(), message.red()),
            }
        } else {
            format!("{} {}", symbol, message)
        };
        self.line(text);
    }

    pub fn status(&self, status: &SystemStatus) {
        let caption = literal_line(&status.caption);
        let dot = if self.color {
            match status.readiness {
                Readiness::Ready => "●".green().to_string(),
                Readiness::NotReady => "●".yellow().to_string(),
                Readiness::Unreachable => "●".red().to_string(),
                Readiness::Unknown => "●".dimmed().to_string(),
            }
        } else {
            "●".to_string()
        };
        self.line(format!("{} {}", dot, caption));
    }

    pub fn documents(&self, view: &RegistryView) {
        if let Some(placeholder) = view.placeholder() {
            let text = match view {
                RegistryView::Failed(reason) => {
                    format!("{}: {}", placeholder, literal_line(reason))
                }
                _ => placeholder.to_string(),
            };
            self.line(self.dim(&text));
            return;
        }

        let documents = view.documents();
        let width = documents
            .iter()
            .map(|d| literal_line(&d.filename).chars().count())
            .max()
            .unwrap_or(0);
        for doc in documents {
            self.line(format!(
                "  {:<w$}  {}",
                literal_line(&doc.filename),
                self.dim(&format!("{:>8.2} MB", doc.size_mb)),
                w = width
            ));
        }
        self.line(self.dim(&format!("{} document(s)", documents.len())));
    }

    pub fn message(&self, message: &ChatMessage) {
        let (prefix, content) = match message.role {
            Role::User => ("You:", literal(&message.content)),
            Role::Assistant => ("Answer:", literal(&message.content)),
        };
        let prefix = if self.color {
            match message.role {
                Role::User => prefix.blue().bold().to_string(),
                Role::Assistant => prefix.green().bold().to_string(),
            }
        } else {
            prefix.to_string()
        };
        self.line(format!("{} {}", prefix, content));

        if message.sources.is_empty() {
            return;
        }
        self.line(self.heading("Sources:"));
        for (n, source) in message.sources.iter().enumerate() {
            self.line(self.dim(&format!(
                "  [{}] Page: {} | Source: {}",
                n + 1,
                literal_line(source.metadata.page_or_placeholder()),
                literal_line(source.metadata.source_or_placeholder()),
            )));
            for line in literal(&source.content).lines() {
                self.line(format!("      {}", line));
            }
        }
    }

    pub fn separator(&self) {
        self.line(self.dim(THIN_SEP));
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            text.yellow().bold().to_string()
        } else {
            text.to_string()
        }
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        self.stop_spinner();
    }
}

/// Drive `operation` while printing the events it emits
pub async fn with_events<F, T>(
    console: &mut Console,
    events: &mut mpsc::UnboundedReceiver<UiEvent>,
    operation: F,
) -> T
where
    F: Future<Output = T>,
{
    tokio::pin!(operation);
    loop {
        tokio::select! {
            output = &mut operation => {
                for event in drain(events) {
                    console.show(event);
                }
                return output;
            }
            Some(event) = events.recv() => console.show(event),
        }
    }
}
