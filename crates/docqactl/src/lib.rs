//! docqactl - terminal client for the document question-answering service
//!
//! Controllers (status, registry, upload, index, deletion, chat) hold the
//! client-side state and sequencing. Front ends (TUI, REPL, one-shot
//! commands) only turn user input into controller calls and display the
//! [`events::UiEvent`]s the controllers emit.

pub mod app;
pub mod backend;
pub mod chat;
pub mod commands;
pub mod confirm;
pub mod console;
pub mod delete;
pub mod dispatcher;
pub mod errors;
pub mod escape;
pub mod events;
pub mod guard;
pub mod index;
pub mod logging;
pub mod notify;
pub mod registry;
pub mod repl;
pub mod status;
pub mod tui;
pub mod upload;

pub use app::App;
pub use backend::{Backend, FakeBackend, HttpBackend};
