//! Layout - TUI grid computation
//!
//! Header and status bar take one line each, the input bar three, the
//! notification strip one. The rest is split between the documents panel
//! and the conversation; the documents panel is dropped on narrow
//! terminals.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuiLayout {
    pub header: Rect,
    /// Zero width when the terminal is too narrow
    pub documents: Rect,
    pub conversation: Rect,
    pub notifications: Rect,
    pub input: Rect,
    pub status_bar: Rect,
}

const HEADER_HEIGHT: u16 = 1;
const STATUS_BAR_HEIGHT: u16 = 1;
const NOTIFICATION_HEIGHT: u16 = 1;
const INPUT_HEIGHT: u16 = 3;
const MIN_CONVERSATION_WIDTH: u16 = 40;
const DOCUMENTS_WIDTH: u16 = 32;

pub fn compute_layout(frame_area: Rect) -> TuiLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(NOTIFICATION_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(frame_area);

    let body = rows[1];
    let show_documents = body.width >= DOCUMENTS_WIDTH + MIN_CONVERSATION_WIDTH;

    let (documents, conversation) = if show_documents {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(DOCUMENTS_WIDTH), Constraint::Min(0)])
            .split(body);
        (columns[0], columns[1])
    } else {
        (Rect::new(body.x, body.y, 0, body.height), body)
    };

    TuiLayout {
        header: rows[0],
        documents,
        conversation,
        notifications: rows[2],
        input: rows[3],
        status_bar: rows[4],
    }
}

pub fn should_show_scroll_up_indicator(scroll_offset: usize) -> bool {
    scroll_offset > 0
}

/// More content below the visible window
pub fn should_show_scroll_down_indicator(
    total_content_lines: usize,
    visible_lines: usize,
    scroll_offset: usize,
) -> bool {
    scroll_offset + visible_lines < total_content_lines
}

/// Clamp a requested offset; `usize::MAX` means "stick to the bottom"
pub fn effective_scroll(requested: usize, total_lines: usize, visible_lines: usize) -> usize {
    let max_scroll = total_lines.saturating_sub(visible_lines);
    requested.min(max_scroll)
}
