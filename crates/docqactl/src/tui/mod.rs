//! TUI front end
//!
//! - event_loop: terminal setup and key handling
//! - state: the view state controller events fold into
//! - render: drawing
//! - layout: panel grid
//! - utils: wrapping and overlays

mod event_loop;
mod layout;
pub mod render;
pub mod state;
mod utils;

use std::time::Duration;

pub use event_loop::run;

pub struct TuiOptions {
    pub server_url: String,
    pub status_interval: Duration,
    pub notification_ttl: Duration,
}
