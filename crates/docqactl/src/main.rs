//! docqactl - upload PDFs, index them and ask questions about them

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docqa_common::DocqaConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use docqactl::backend::{Backend, FakeBackend, HttpBackend};
use docqactl::commands::{self, Session};
use docqactl::confirm::{AutoConfirm, Confirm, StdinConfirm};
use docqactl::console::Console;
use docqactl::errors::{exit_code_for, EXIT_GENERAL_ERROR, EXIT_SUCCESS};
use docqactl::events::EventSink;
use docqactl::logging::{self, LogTarget};
use docqactl::tui::{self, TuiOptions};
use docqactl::App;

#[derive(Parser)]
#[command(name = "docqactl")]
#[command(about = "Document Q&A - upload PDFs, index them, ask questions", long_about = None)]
#[command(version)]
struct Cli {
    /// Server base URL (overrides config and DOCQA_SERVER_URL)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Config file (default: ~/.config/docqa/config.toml, then /etc/docqa/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Run against a built-in in-memory server
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Full-screen terminal UI (default)
    Tui,

    /// Line-mode chat
    Chat,

    /// Show whether the system is ready for questions
    Status,

    /// List uploaded documents
    Documents,

    /// Upload one or more files
    Upload {
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
    },

    /// Delete a document
    Delete {
        filename: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Index all uploaded documents
    Index {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Ask a single question
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
}

fn load_config(cli: &Cli) -> Result<DocqaConfig> {
    let mut config = DocqaConfig::load(cli.config.as_deref())?;
    if let Some(server) = &cli.server {
        config.server.base_url = server.trim().to_string();
        config.validate()?;
    }
    Ok(config)
}

fn build_backend(cli: &Cli, config: &DocqaConfig) -> Result<Arc<dyn Backend>> {
    if cli.demo {
        return Ok(Arc::new(FakeBackend::new()));
    }
    let backend = HttpBackend::new(&config.server.base_url)
        .with_context(|| format!("Cannot use server {}", config.server.base_url))?;
    Ok(Arc::new(backend))
}

/// Warnings only by default; -v uses the configured level, -vv debug
fn stderr_level(config: &DocqaConfig, verbose: u8) -> String {
    match verbose {
        0 => "warn".to_string(),
        1 => config.logging.level.clone(),
        _ => "debug".to_string(),
    }
}

fn session(backend: Arc<dyn Backend>, confirm: Arc<dyn Confirm>, config: &DocqaConfig) -> Session {
    let (sink, events) = EventSink::channel();
    Session {
        app: App::new(backend, confirm, sink),
        events,
        console: Console::new(config.ui.color),
    }
}

fn confirm_for(yes: bool) -> Arc<dyn Confirm> {
    if yes {
        Arc::new(AutoConfirm(true))
    } else {
        Arc::new(StdinConfirm)
    }
}

async fn run(mut cli: Cli) -> Result<i32> {
    let config = load_config(&cli)?;
    let command = cli.command.take().unwrap_or(Commands::Tui);

    if matches!(command, Commands::Tui) {
        logging::init_for_tui(config.logging.file.as_deref(), &config.logging.level);
    } else {
        logging::init(LogTarget::Stderr, &stderr_level(&config, cli.verbose))?;
    }
    debug!(server = %config.server.base_url, demo = cli.demo, "configuration loaded");

    let backend = build_backend(&cli, &config)?;
    let server_label = if cli.demo {
        "demo (in-memory)".to_string()
    } else {
        config.server.base_url.clone()
    };

    let code = match command {
        Commands::Tui => {
            tui::run(
                backend,
                TuiOptions {
                    server_url: server_label,
                    status_interval: config.status_interval(),
                    notification_ttl: config.notification_ttl(),
                },
            )
            .await?;
            EXIT_SUCCESS
        }
        Commands::Chat => {
            docqactl::repl::run(backend, Console::new(config.ui.color), config.status_interval())
                .await?;
            EXIT_SUCCESS
        }
        Commands::Status => commands::status(session(backend, confirm_for(false), &config)).await,
        Commands::Documents => {
            commands::documents(session(backend, confirm_for(false), &config)).await
        }
        Commands::Upload { files } => {
            commands::upload(session(backend, confirm_for(false), &config), files).await
        }
        Commands::Delete { filename, yes } => {
            commands::delete(session(backend, confirm_for(yes), &config), filename).await
        }
        Commands::Index { yes } => {
            commands::index(session(backend, confirm_for(yes), &config)).await
        }
        Commands::Ask { question } => {
            commands::ask(session(backend, confirm_for(false), &config), question.join(" ")).await
        }
    };
    Ok(code)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            match err.downcast_ref::<docqa_common::ClientError>() {
                Some(client) => exit_code_for(client),
                None => EXIT_GENERAL_ERROR,
            }
        }
    };
    std::process::exit(code);
}
