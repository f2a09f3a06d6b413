//! Rendering - draws [`AppState`] and nothing else
//!
//! All user and server text goes through [`literal`] before it reaches a
//! span.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::layout;
use super::state::{AppState, Focus, InputMode};
use super::utils::{centered_rect, draw_help_overlay, wrap_text};
use crate::chat::{ChatMessage, Role};
use crate::escape::{literal, literal_line};
use crate::notify::Level;
use crate::status::Readiness;

const SPINNER: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

pub fn draw_ui(f: &mut Frame, state: &AppState) {
    let size = f.size();
    let grid = layout::compute_layout(size);

    draw_header(f, grid.header, state);
    if grid.documents.width > 0 {
        draw_documents_panel(f, grid.documents, state);
    }
    draw_conversation_panel(f, grid.conversation, state);
    draw_notifications(f, grid.notifications, state);
    draw_input_bar(f, grid.input, state);
    draw_status_bar(f, grid.status_bar, state);

    if let Some(label) = state.loading_label() {
        draw_loading_overlay(f, grid.conversation, label, state.spinner_frame);
    }
    if let Some(pending) = &state.pending_confirm {
        draw_confirm_overlay(f, size, &pending.request.title, &pending.request.prompt);
    }
    if state.show_help {
        draw_help_overlay(f, size);
    }
}

fn draw_header(f: &mut Frame, area: Rect, state: &AppState) {
    let text = Line::from(vec![
        Span::raw(" "),
        Span::styled(
            format!("docqa v{}", env!("CARGO_PKG_VERSION")),
            Style::default()
                .fg(Color::Rgb(150, 200, 255))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" │ {}", literal_line(&state.server_url)),
            Style::default().fg(Color::Rgb(150, 200, 255)),
        ),
    ]);
    f.render_widget(
        Paragraph::new(text).style(Style::default().bg(Color::Rgb(0, 0, 0))),
        area,
    );
}

fn readiness_color(readiness: Readiness) -> Color {
    match readiness {
        Readiness::Ready => Color::Green,
        Readiness::NotReady => Color::Yellow,
        Readiness::Unreachable => Color::Red,
        Readiness::Unknown => Color::Gray,
    }
}

/// Format: ● System ready │ checked 15:42:08 │ Indexing ⠙ │ F1 help
fn draw_status_bar(f: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = vec![
        Span::raw(" "),
        Span::styled("●", Style::default().fg(readiness_color(state.status.readiness))),
        Span::raw(" "),
        Span::styled(
            literal_line(&state.status.caption),
            Style::default().fg(Color::Rgb(180, 180, 180)),
        ),
    ];
    if let Some(at) = state.status.checked_at {
        spans.push(Span::styled(
            format!(" │ checked {}", at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if let Some(label) = state.loading_label() {
        spans.push(Span::styled(
            format!(" │ {} {}", label, SPINNER[state.spinner_frame % SPINNER.len()]),
            Style::default().fg(Color::Yellow),
        ));
    }
    if !state.index_enabled {
        spans.push(Span::styled(" │ F6 disabled", Style::default().fg(Color::DarkGray)));
    }
    spans.push(Span::styled(" │ F1 help", Style::default().fg(Color::DarkGray)));

    f.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Rgb(20, 20, 20))),
        area,
    );
}

fn draw_documents_panel(f: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.focus == Focus::Documents;
    let border = if focused { Color::Yellow } else { Color::Rgb(80, 180, 255) };
    let block = Block::default()
        .title(" Documents ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    if let Some(placeholder) = state.documents.placeholder() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            placeholder,
            Style::default().fg(Color::Gray),
        )))
        .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = state
        .documents
        .documents()
        .iter()
        .map(|doc| {
            let size = format!("{:.2} MB", doc.size_mb);
            let name_width = width.saturating_sub(size.len() + 1);
            let name: String = literal_line(&doc.filename).chars().take(name_width).collect();
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<w$} ", name, w = name_width)),
                Span::styled(size, Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let mut list_state = ListState::default();
    if focused {
        list_state.select(Some(state.selected_document));
    }
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Rgb(40, 40, 80)).add_modifier(Modifier::BOLD))
        .highlight_symbol("› ");
    f.render_stateful_widget(list, area, &mut list_state);
}

/// Transcript lines for one message; content and metadata are literal
pub fn message_lines(message: &ChatMessage, width: usize) -> Vec<Line<'static>> {
    let (prefix, color) = match message.role {
        Role::User => ("You: ", Color::Rgb(100, 150, 255)),
        Role::Assistant => ("Answer: ", Color::Rgb(100, 255, 100)),
    };
    let indent = " ".repeat(prefix.len());
    let mut lines = Vec::new();

    let content = literal(&message.content);
    for (i, wrapped) in wrap_text(&content, width.saturating_sub(prefix.len()))
        .into_iter()
        .enumerate()
    {
        if i == 0 {
            lines.push(Line::from(vec![
                Span::styled(prefix, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::raw(wrapped),
            ]));
        } else {
            lines.push(Line::from(format!("{}{}", indent, wrapped)));
        }
    }

    if !message.sources.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("{}Sources:", indent),
            Style::default().fg(Color::Rgb(255, 200, 80)),
        )));
        let source_indent = format!("{}  ", indent);
        for (n, source) in message.sources.iter().enumerate() {
            lines.push(Line::from(Span::styled(
                format!(
                    "{}[{}] Page: {} | Source: {}",
                    source_indent,
                    n + 1,
                    literal_line(source.metadata.page_or_placeholder()),
                    literal_line(source.metadata.source_or_placeholder()),
                ),
                Style::default().fg(Color::Gray),
            )));
            for wrapped in wrap_text(
                &literal(&source.content),
                width.saturating_sub(source_indent.len() + 4),
            ) {
                lines.push(Line::from(Span::styled(
                    format!("{}    {}", source_indent, wrapped),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
    }

    lines.push(Line::from(""));
    lines
}

fn conversation_lines(state: &AppState, area: Rect) -> Vec<Line<'static>> {
    let content_width = area.width.saturating_sub(4) as usize;
    if state.transcript.is_empty() {
        return vec![Line::from(Span::styled(
            "Upload PDFs, index them, then ask a question.",
            Style::default().fg(Color::Gray),
        ))];
    }
    state
        .transcript
        .iter()
        .flat_map(|m| message_lines(m, content_width))
        .collect()
}

/// Largest useful scroll offset for the conversation panel at `area`
pub fn conversation_max_scroll(state: &AppState, area: Rect) -> usize {
    let visible_lines = area.height.saturating_sub(2) as usize;
    conversation_lines(state, area)
        .len()
        .saturating_sub(visible_lines)
}

fn draw_conversation_panel(f: &mut Frame, area: Rect, state: &AppState) {
    let lines = conversation_lines(state, area);
    let total_lines = lines.len();
    let visible_lines = area.height.saturating_sub(2) as usize;
    let scroll = layout::effective_scroll(state.scroll_offset, total_lines, visible_lines);

    let indicator = if total_lines > visible_lines {
        let up = if layout::should_show_scroll_up_indicator(scroll) { "▲" } else { " " };
        let down = if layout::should_show_scroll_down_indicator(total_lines, visible_lines, scroll) {
            "▼"
        } else {
            " "
        };
        format!(" {}{} ", up, down)
    } else {
        String::new()
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(format!(" Conversation{} ", indicator))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Rgb(80, 180, 255))),
        )
        .scroll((scroll.min(u16::MAX as usize) as u16, 0));
    f.render_widget(paragraph, area);
}

fn level_style(level: Level) -> Style {
    let color = match level {
        Level::Info => Color::Cyan,
        Level::Success => Color::Green,
        Level::Warning => Color::Yellow,
        Level::Error => Color::Red,
    };
    Style::default().fg(color)
}

/// Newest notification wins the strip
fn draw_notifications(f: &mut Frame, area: Rect, state: &AppState) {
    let line = match state.notifications.last() {
        Some(n) => Line::from(vec![
            Span::raw(" "),
            Span::styled(
                format!("{} {}", n.level.symbol(), literal_line(&n.message)),
                level_style(n.level),
            ),
        ]),
        None => Line::from(""),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_input_bar(f: &mut Frame, area: Rect, state: &AppState) {
    let (title, hint) = match state.mode {
        InputMode::Question => (" Question ", state.submit_label()),
        InputMode::UploadPaths => (" Upload: file paths (Esc to cancel) ", "Upload"),
    };
    let enabled = match state.mode {
        InputMode::Question => state.submit_enabled(),
        InputMode::UploadPaths => !state.busy.contains(&crate::events::Operation::Upload),
    };
    let button_style = if enabled {
        Style::default().fg(Color::Black).bg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray).bg(Color::Rgb(40, 40, 40))
    };
    let focused = state.focus == Focus::Question && state.pending_confirm.is_none();
    let border = if focused { Color::Yellow } else { Color::Rgb(80, 80, 80) };

    let button = format!(" {} ", hint);
    let input_width = (area.width as usize).saturating_sub(button.chars().count() + 6);
    let visible: String = {
        let chars: Vec<char> = state.input.chars().collect();
        let start = state.cursor_pos.saturating_sub(input_width);
        chars[start.min(chars.len())..].iter().take(input_width).collect()
    };

    let line = Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Cyan)),
        Span::raw(literal_line(&visible)),
        Span::styled(if focused { "_" } else { " " }, Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(button, button_style),
    ]);

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(paragraph, area);
}

fn draw_loading_overlay(f: &mut Frame, area: Rect, label: &str, frame: usize) {
    let width = 30.min(area.width);
    let popup = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(3) / 2,
        width,
        3.min(area.height),
    );
    let text = Line::from(Span::styled(
        format!(" {} {}...", SPINNER[frame % SPINNER.len()], label),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ));
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL)),
        popup,
    );
}

fn draw_confirm_overlay(f: &mut Frame, area: Rect, title: &str, prompt: &str) {
    let popup = centered_rect(50, 30, area);
    let width = popup.width.saturating_sub(4) as usize;
    let mut lines: Vec<Line> = wrap_text(&literal(prompt), width)
        .into_iter()
        .map(Line::from)
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("[y] Yes", Style::default().fg(Color::Green)),
        Span::raw("   "),
        Span::styled("[n] No", Style::default().fg(Color::Red)),
    ]));

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(format!(" {} ", title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        ),
        popup,
    );
}
