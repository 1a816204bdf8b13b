//! Delete confirmation dialog.
//!
//! Deleting a document is destructive and cannot be undone, so the TUI
//! gates it behind this modal; the controller is only called after an
//! explicit yes.

use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Render the confirmation dialog overlay.
pub fn render(frame: &mut Frame, app: &App) {
    let Some(document_id) = &app.confirm_delete else {
        return;
    };

    let theme = &app.theme;

    let name = app
        .session
        .documents()
        .iter()
        .find(|d| &d.id == document_id)
        .map(|d| d.name.clone())
        .unwrap_or_else(|| document_id.clone());

    // Centered area for the dialog
    let area = centered_rect(46, 8, frame.area());

    // Clear the background area
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Delete document ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.error))
        .style(Style::default().bg(theme.bg_panel));

    frame.render_widget(block, area);

    let inner = Rect {
        x: area.x + 2,
        y: area.y + 1,
        width: area.width.saturating_sub(4),
        height: area.height.saturating_sub(2),
    };

    let lines = vec![
        Line::from(Span::styled(
            name,
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "This cannot be undone.",
            Style::default().fg(theme.text_secondary),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y]", Style::default().fg(theme.error)),
            Span::styled(" Delete  ", Style::default().fg(theme.text_secondary)),
            Span::styled("[n]", Style::default().fg(theme.text_muted)),
            Span::styled(" Cancel", Style::default().fg(theme.text_secondary)),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Create a centered rect of given width and height within the parent area.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
