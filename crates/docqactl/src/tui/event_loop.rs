//! Event Loop - terminal setup, key handling and event folding
//!
//! Keys become [`Command`]s for the dispatcher; controller output comes
//! back as [`UiEvent`]s and confirmation requests, folded into
//! [`AppState`] before every frame.

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::layout::compute_layout;
use super::render::{conversation_max_scroll, draw_ui};
use super::state::{AppState, Focus, InputMode};
use super::TuiOptions;
use crate::app::App;
use crate::backend::Backend;
use crate::confirm::{ChannelConfirm, PendingConfirm};
use crate::dispatcher::{spawn_status_timer, Command, Dispatcher};
use crate::events::{EventSink, UiEvent};
use crate::upload::parse_selection;

const FRAME_POLL: Duration = Duration::from_millis(100);
const MOUSE_SCROLL_LINES: usize = 3;

type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// Run the TUI until the user quits
pub async fn run(backend: Arc<dyn Backend>, options: TuiOptions) -> Result<()> {
    let (sink, mut events) = EventSink::channel();
    let (confirm, mut confirms) = ChannelConfirm::channel();
    let app = App::new(backend, Arc::new(confirm), sink);

    let cancel = CancellationToken::new();
    let (commands, command_rx) = mpsc::channel(32);
    tokio::spawn(Dispatcher::new(app, command_rx, cancel.clone()).run());
    let timer = spawn_status_timer(options.status_interval, commands.clone(), cancel.clone());

    commands.send(Command::RefreshStatus).await?;
    commands.send(Command::RefreshDocuments).await?;

    enable_raw_mode().map_err(|e| {
        anyhow::anyhow!(
            "Failed to enable raw mode: {}. Ensure you're running in a real terminal (TTY).",
            e
        )
    })?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture).map_err(|e| {
        let _ = disable_raw_mode();
        anyhow::anyhow!("Failed to initialize terminal: {}", e)
    })?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut state = AppState::new(options.server_url);
    info!("tui started");
    // Terminal reads block; keep them off the dispatcher's workers
    let result = tokio::task::block_in_place(|| {
        run_event_loop(
            &mut terminal,
            &mut state,
            &commands,
            &mut events,
            &mut confirms,
            options.notification_ttl,
        )
    });

    // Anything still waiting on the user is refused
    if let Some(pending) = state.pending_confirm.take() {
        pending.answer(false);
    }
    cancel.cancel();
    let _ = timer.await;

    let cleanup = restore_terminal(&mut terminal);
    info!("tui stopped");
    result.and(cleanup)
}

fn restore_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_event_loop(
    terminal: &mut Term,
    state: &mut AppState,
    commands: &mpsc::Sender<Command>,
    events: &mut mpsc::UnboundedReceiver<UiEvent>,
    confirms: &mut mpsc::UnboundedReceiver<PendingConfirm>,
    notification_ttl: Duration,
) -> Result<()> {
    loop {
        while let Ok(event) = events.try_recv() {
            state.apply(event);
        }
        if state.pending_confirm.is_none() {
            if let Ok(pending) = confirms.try_recv() {
                state.pending_confirm = Some(pending);
            }
        }
        state.expire_notifications(chrono::Local::now(), notification_ttl);
        if state.loading_label().is_some() {
            state.spinner_frame = state.spinner_frame.wrapping_add(1);
        }

        terminal.draw(|f| draw_ui(f, state))?;

        if !event::poll(FRAME_POLL)? {
            continue;
        }
        match event::read()? {
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => scroll_up(terminal, state, MOUSE_SCROLL_LINES),
                MouseEventKind::ScrollDown => scroll_down(terminal, state, MOUSE_SCROLL_LINES),
                _ => {}
            },
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if handle_key(terminal, state, key, commands) == Flow::Quit {
                    return Ok(());
                }
            }
            _ => {}
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn send(commands: &mpsc::Sender<Command>, command: Command) {
    if let Err(err) = commands.try_send(command) {
        warn!(error = %err, "command queue full, dropping command");
    }
}

fn handle_key(
    terminal: &Term,
    state: &mut AppState,
    key: KeyEvent,
    commands: &mpsc::Sender<Command>,
) -> Flow {
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return Flow::Quit;
    }

    // A confirmation dialog swallows every other key
    if let Some(pending) = state.pending_confirm.take() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => pending.answer(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => pending.answer(false),
            _ => state.pending_confirm = Some(pending),
        }
        return Flow::Continue;
    }

    match (key.code, key.modifiers) {
        (KeyCode::F(1), _) => state.show_help = !state.show_help,
        (KeyCode::Esc, _) => {
            if state.show_help {
                state.show_help = false;
            } else if state.mode == InputMode::UploadPaths {
                state.cancel_upload_entry();
            }
        }
        (KeyCode::F(2), _) | (KeyCode::Char('o'), KeyModifiers::CONTROL) => {
            state.begin_upload_entry();
        }
        (KeyCode::F(5), _) => {
            send(commands, Command::RefreshStatus);
            send(commands, Command::RefreshDocuments);
        }
        (KeyCode::F(6), _) => {
            if state.index_enabled {
                send(commands, Command::TriggerIndex);
            }
        }
        (KeyCode::Tab, _) => state.toggle_focus(),
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => state.clear_input(),
        (KeyCode::PageUp, _) => {
            let amount = page_amount(terminal);
            scroll_up(terminal, state, amount);
        }
        (KeyCode::PageDown, _) => {
            let amount = page_amount(terminal);
            scroll_down(terminal, state, amount);
        }
        _ => match state.focus {
            Focus::Documents => handle_documents_key(state, key, commands),
            Focus::Question => handle_input_key(state, key, commands),
        },
    }
    Flow::Continue
}

fn handle_documents_key(state: &mut AppState, key: KeyEvent, commands: &mpsc::Sender<Command>) {
    match key.code {
        KeyCode::Up => state.select_previous_document(),
        KeyCode::Down => state.select_next_document(),
        KeyCode::Delete | KeyCode::Char('d') => {
            if let Some(filename) = state.selected_filename() {
                send(commands, Command::Delete(filename.to_string()));
            }
        }
        _ => {}
    }
}

fn handle_input_key(state: &mut AppState, key: KeyEvent, commands: &mpsc::Sender<Command>) {
    match key.code {
        KeyCode::Enter => match state.mode {
            InputMode::Question => {
                // The controller validates; the key only refuses while a
                // question is already out
                if !state.chat_state.in_progress() {
                    let question = state.input.clone();
                    state.push_history(&question);
                    send(commands, Command::Ask(question));
                }
            }
            InputMode::UploadPaths => {
                let paths = parse_selection(&state.input);
                send(commands, Command::upload_paths(paths));
            }
        },
        KeyCode::Backspace => state.backspace(),
        KeyCode::Up if state.mode == InputMode::Question => state.history_up(),
        KeyCode::Down if state.mode == InputMode::Question => state.history_down(),
        KeyCode::Char(c)
            if key.modifiers == KeyModifiers::NONE || key.modifiers == KeyModifiers::SHIFT =>
        {
            state.insert_char(c);
        }
        _ => {}
    }
}

fn page_amount(terminal: &Term) -> usize {
    terminal
        .size()
        .map(|s| (s.height / 4) as usize)
        .unwrap_or(10)
        .max(10)
}

fn current_scroll(terminal: &Term, state: &AppState) -> (usize, usize) {
    let max = terminal
        .size()
        .map(|area| conversation_max_scroll(state, compute_layout(area).conversation))
        .unwrap_or(0);
    (state.scroll_offset.min(max), max)
}

fn scroll_up(terminal: &Term, state: &mut AppState, lines: usize) {
    let (current, _) = current_scroll(terminal, state);
    state.scroll_offset = current.saturating_sub(lines);
}

fn scroll_down(terminal: &Term, state: &mut AppState, lines: usize) {
    let (current, max) = current_scroll(terminal, state);
    let next = current.saturating_add(lines);
    if next >= max {
        state.scroll_to_bottom();
    } else {
        state.scroll_offset = next;
    }
}
