//! Pure view functions: take `&AppState`, draw to a ratatui frame.

use parlor_core::api::Role;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use crate::state::AppState;

/// Sidebar width in columns.
const SIDEBAR_WIDTH: u16 = 32;

/// Height of the input box (including borders).
const INPUT_HEIGHT: u16 = 3;

/// Height of the error banner (including borders).
const BANNER_HEIGHT: u16 = 3;

/// Height of the status line.
const STATUS_HEIGHT: u16 = 1;

/// Spinner frames shown while a turn is in flight.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

/// Renders the entire TUI to the frame.
pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(area);

    render_sidebar(frame, state, columns[0]);
    render_main(frame, state, columns[1]);
}

fn render_sidebar(frame: &mut Frame, state: &AppState, area: Rect) {
    let active = state.controller.active_conversation.as_deref();
    let width = area.width.saturating_sub(2) as usize;

    let items: Vec<ListItem<'_>> = state
        .controller
        .conversations
        .iter()
        .map(|entry| {
            let is_active = active == Some(entry.id.as_str());
            let marker = if is_active { "▌ " } else { "  " };
            let title_style = if is_active {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let title = Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Cyan)),
                Span::styled(truncate(&entry.title, width.saturating_sub(2)), title_style),
            ]);
            let preview = Line::from(Span::styled(
                format!(
                    "  {}",
                    truncate(&entry.last_message_preview, width.saturating_sub(2))
                ),
                Style::default().fg(Color::DarkGray),
            ));
            ListItem::new(Text::from(vec![title, preview]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" conversations "),
    );
    frame.render_widget(list, area);
}

fn render_main(frame: &mut Frame, state: &AppState, area: Rect) {
    let banner_height = if state.controller.error.is_some() {
        BANNER_HEIGHT
    } else {
        0
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height),
            Constraint::Min(3),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(area);

    if let Some(error) = &state.controller.error {
        render_banner(frame, error, rows[0]);
    }
    render_transcript(frame, state, rows[1]);
    render_input(frame, state, rows[2]);
    render_status(frame, state, rows[3]);
}

fn render_banner(frame: &mut Frame, error: &str, area: Rect) {
    let banner = Paragraph::new(Line::from(vec![
        Span::styled("⚠ ", Style::default().fg(Color::Yellow)),
        Span::raw(error.to_string()),
        Span::styled("  (esc to dismiss)", Style::default().fg(Color::DarkGray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    frame.render_widget(banner, area);
}

fn render_transcript(frame: &mut Frame, state: &AppState, area: Rect) {
    let width = area.width.saturating_sub(2).max(1) as usize;
    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in &state.controller.messages {
        let header = match msg.role {
            Role::User => Span::styled(
                "● you".to_string(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Role::Assistant => Span::styled(
                format!("● {}", model_display_name(&msg.model)),
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
        };
        lines.push(Line::from(header));

        for raw in msg.content.split('\n') {
            for wrapped in wrap_line(raw, width) {
                lines.push(Line::from(wrapped));
            }
        }
        lines.push(Line::default());
    }

    let viewport = area.height.saturating_sub(2) as usize;
    let max_offset = lines.len().saturating_sub(viewport);
    let offset = max_offset.saturating_sub(state.scroll_from_bottom as usize);

    let transcript = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" chat "))
        .scroll((offset as u16, 0));
    frame.render_widget(transcript, area);
}

fn render_input(frame: &mut Frame, state: &AppState, area: Rect) {
    let input = Paragraph::new(Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Cyan)),
        Span::raw(state.input.clone()),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(input, area);

    let cursor_x = area.x + 3 + state.input.width() as u16;
    frame.set_cursor_position((cursor_x.min(area.x + area.width.saturating_sub(2)), area.y + 1));
}

fn render_status(frame: &mut Frame, state: &AppState, area: Rect) {
    let activity = if state.controller.is_busy() {
        let spinner = SPINNER_FRAMES[state.spinner_frame % SPINNER_FRAMES.len()];
        format!("{spinner} thinking…")
    } else {
        "ready".to_string()
    };

    let status = Line::from(vec![
        Span::styled(
            format!(" {} ", model_display_name(&state.controller.selected_model)),
            Style::default().fg(Color::Magenta),
        ),
        Span::raw(format!("· {activity} ")),
        Span::styled(
            "· enter send · ↑/↓ switch · ^n new · ^d delete · ^p model · alt-←/→ history · ^c quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(status), area);
}

/// Friendly names for well-known model ids; unknown ids pass through.
pub fn model_display_name(model_id: &str) -> &str {
    match model_id {
        "gpt-5.2" => "GPT-5.2",
        "gpt-5.2-pro" => "GPT-5.2 Pro",
        "gemini-3-pro-preview" => "Gemini 3 Pro",
        "gemini-3-flash-preview" => "Gemini 3 Flash",
        "claude-opus-4-5" => "Claude 4.5 Opus",
        "claude-sonnet-4-5" => "Claude 4.5 Sonnet",
        "claude-haiku-4-5" => "Claude 4.5 Haiku",
        other => other,
    }
}

/// Greedy display-width wrap of one logical line.
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if line.is_empty() {
        return vec![String::new()];
    }

    let mut rows = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for c in line.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > width && !current.is_empty() {
            rows.push(std::mem::take(&mut current));
            current_width = 0;
        }
        current.push(c);
        current_width += char_width;
    }
    rows.push(current);
    rows
}

/// Truncates to a display width, appending an ellipsis when cut.
fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let char_width = c.width().unwrap_or(0);
        if used + char_width + 1 > width {
            break;
        }
        out.push(c);
        used += char_width;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_model_ids_map_to_friendly_names() {
        assert_eq!(model_display_name("claude-haiku-4-5"), "Claude 4.5 Haiku");
        assert_eq!(model_display_name("mystery-model"), "mystery-model");
    }

    #[test]
    fn test_wrap_line_splits_at_display_width() {
        let rows = wrap_line("abcdefghij", 4);
        assert_eq!(rows, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_line_handles_wide_chars() {
        // Each kana is 2 columns wide.
        let rows = wrap_line("ああああ", 4);
        assert_eq!(rows, vec!["ああ", "ああ"]);
    }

    #[test]
    fn test_wrap_empty_line_keeps_one_row() {
        assert_eq!(wrap_line("", 10), vec![String::new()]);
    }

    #[test]
    fn test_truncate_appends_ellipsis() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer title", 8), "a longe…");
    }
}
