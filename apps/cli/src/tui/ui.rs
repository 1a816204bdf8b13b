//! Main render function and layout for the TUI.

use super::app::{App, Panel};
use super::components::{chat_panel, confirm_dialog, sidebar};
use super::theme::Theme;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Render the entire application.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    let theme = &app.theme;

    // Clear and fill background with theme color
    Clear.render(area, frame.buffer_mut());
    Block::default()
        .style(Style::default().bg(theme.bg))
        .render(area, frame.buffer_mut());

    // Main layout: status bar at the bottom, content above
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    // Two-panel layout: Sidebar | Chat
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(28), Constraint::Percentage(75)])
        .split(main_chunks[0]);

    sidebar::render(frame, app, chunks[0]);
    chat_panel::render(frame, app, chunks[1]);

    // Status bar
    render_status_bar(frame, app, main_chunks[1]);

    // Delete confirmation overlay (on top of everything)
    confirm_dialog::render(frame, app);
}

/// Render the status bar at the bottom.
fn render_status_bar(frame: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let theme = &app.theme;
    let status_text = if let Some(msg) = &app.status_message {
        msg.clone()
    } else {
        build_status_text(app)
    };

    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(
            status_text,
            Style::default().fg(if app.status_message.is_some() {
                theme.warning
            } else {
                theme.text_muted
            }),
        ),
    ]))
    .style(Style::default().bg(theme.bg_panel));

    frame.render_widget(status, area);
}

/// Build the default status text.
fn build_status_text(app: &App) -> String {
    let document = app
        .session
        .selected_document()
        .map(|d| d.name.as_str())
        .unwrap_or("none");

    let panel_name = match app.active_panel {
        Panel::Sidebar => "Documents",
        Panel::Chat => "Chat",
    };

    format!(
        "{} docs | Active: {} | Panel: {} | Press ? for help, q to quit",
        app.session.documents().len(),
        document,
        panel_name
    )
}

/// Helper to create a styled block for panels.
pub fn panel_block<'a>(title: &str, is_active: bool, theme: &Theme) -> Block<'a> {
    let border_color = if is_active {
        theme.border_active
    } else {
        theme.border
    };

    let title_color = if is_active {
        theme.accent
    } else {
        theme.text_secondary
    };

    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {} ", title))
        .title_style(Style::default().fg(title_color))
        .style(Style::default().bg(theme.bg_panel))
}

/// Helper to truncate a string to fit within a given display width.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return s.chars().take(max_width).collect();
    }

    let target = max_width - 3;
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > target {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate_str("abc", 10), "abc");
    }

    #[test]
    fn test_truncate_long_string_gets_ellipsis() {
        assert_eq!(truncate_str("abcdefghij", 8), "abcde...");
    }

    #[test]
    fn test_truncate_respects_wide_chars() {
        // Each CJK char is two columns wide.
        let truncated = truncate_str("文档文档文档", 7);
        assert!(truncated.ends_with("..."));
        assert!(truncated.width() <= 7);
    }
}
