//! REPL - line-mode chat over the same controllers as the TUI
//!
//! Plain lines are questions; slash commands cover the rest. Confirmation
//! prompts are answered on the next input line.

use anyhow::Result;
use owo_colors::OwoColorize;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::app::App;
use crate::backend::Backend;
use crate::chat::Role;
use crate::confirm::{is_yes, ChannelConfirm};
use crate::console::Console;
use crate::dispatcher::{execute, spawn_status_timer, Command, Dispatcher};
use crate::events::{drain, EventSink, UiEvent};
use crate::upload::parse_selection;

#[derive(Debug)]
pub enum ReplInput {
    Empty,
    Quit,
    Help,
    Run(Command),
    Invalid(String),
}

pub fn parse_line(line: &str) -> ReplInput {
    let line = line.trim();
    if line.is_empty() {
        return ReplInput::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return ReplInput::Run(Command::Ask(line.to_string()));
    };

    let (name, args) = rest
        .split_once(char::is_whitespace)
        .map(|(n, a)| (n, a.trim()))
        .unwrap_or((rest, ""));
    match name {
        "quit" | "exit" | "q" => ReplInput::Quit,
        "help" | "?" => ReplInput::Help,
        "status" => ReplInput::Run(Command::RefreshStatus),
        "docs" | "documents" => ReplInput::Run(Command::RefreshDocuments),
        "index" => ReplInput::Run(Command::TriggerIndex),
        "upload" => {
            let paths = parse_selection(args);
            if paths.is_empty() {
                ReplInput::Invalid("usage: /upload <file> [file...]".to_string())
            } else {
                ReplInput::Run(Command::upload_paths(paths))
            }
        }
        "delete" | "rm" => {
            if args.is_empty() {
                ReplInput::Invalid("usage: /delete <filename>".to_string())
            } else {
                ReplInput::Run(Command::Delete(args.to_string()))
            }
        }
        other => ReplInput::Invalid(format!("unknown command: /{}", other)),
    }
}

fn print_help() {
    println!("{}", "Commands".bold());
    println!("  <question>              ask a question");
    println!("  /upload <file> [...]    upload PDFs");
    println!("  /index                  index uploaded documents");
    println!("  /delete <filename>      delete a document");
    println!("  /docs                   list documents");
    println!("  /status                 check readiness");
    println!("  /quit                   leave");
}

fn print_prompt() {
    print!("{} ", "docqa>".bright_cyan());
    let _ = std::io::stdout().flush();
}

/// Start the REPL
pub async fn run(backend: Arc<dyn Backend>, mut console: Console, status_interval: Duration) -> Result<()> {
    let (sink, mut events) = EventSink::channel();
    let (confirm, mut confirms) = ChannelConfirm::channel();
    let app = App::new(backend, Arc::new(confirm), sink);

    // Background polling goes through the dispatcher; typed commands run inline
    let cancel = CancellationToken::new();
    let (commands, command_rx) = mpsc::channel(8);
    tokio::spawn(Dispatcher::new(app.clone(), command_rx, cancel.clone()).run());
    let timer = spawn_status_timer(status_interval, commands, cancel.clone());

    app.bootstrap().await;
    for event in drain(&mut events) {
        console.show(event);
    }
    console.status(&app.status.current());
    println!("Type a question, or /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("repl started");

    loop {
        print_prompt();
        let line = tokio::select! {
            line = lines.next_line() => line?,
            Some(event) = events.recv() => {
                println!();
                show(&mut console, event);
                continue;
            }
        };
        let Some(line) = line else {
            println!();
            break;
        };

        let command = match parse_line(&line) {
            ReplInput::Empty => continue,
            ReplInput::Quit => break,
            ReplInput::Help => {
                print_help();
                continue;
            }
            ReplInput::Invalid(message) => {
                println!("{}", message.yellow());
                continue;
            }
            ReplInput::Run(command) => command,
        };

        let after = match &command {
            Command::RefreshStatus => After::Status,
            Command::RefreshDocuments | Command::Upload(_) | Command::Delete(_) => After::Documents,
            _ => After::Nothing,
        };

        let operation = execute(&app, command);
        tokio::pin!(operation);
        loop {
            tokio::select! {
                _ = &mut operation => break,
                Some(event) = events.recv() => show(&mut console, event),
                Some(pending) = confirms.recv() => {
                    print!("{} [y/N] ", pending.request.prompt);
                    let _ = std::io::stdout().flush();
                    let answer = lines.next_line().await?.unwrap_or_default();
                    pending.answer(is_yes(&answer));
                }
            }
        }
        for event in drain(&mut events) {
            show(&mut console, event);
        }

        match after {
            After::Status => console.status(&app.status.current()),
            After::Documents => console.documents(&app.registry.current()),
            After::Nothing => {}
        }
    }

    cancel.cancel();
    let _ = timer.await;
    info!("repl stopped");
    Ok(())
}

enum After {
    Status,
    Documents,
    Nothing,
}

/// Answers are printed as they land; everything else goes to the console
fn show(console: &mut Console, event: UiEvent) {
    match event {
        UiEvent::Appended(message) if message.role == Role::Assistant => console.message(&message),
        other => console.show(other),
    }
}
