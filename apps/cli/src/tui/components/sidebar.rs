//! Sidebar component listing the known documents.

use crate::tui::app::{App, Panel};
use crate::tui::theme::Theme;
use crate::tui::ui::{panel_block, truncate_str};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

/// Render the sidebar panel.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let is_active = app.active_panel == Panel::Sidebar;
    let theme = &app.theme;
    let block = panel_block("Documents", is_active, theme);

    // Split into main content and footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)])
        .split(area);

    let items = build_sidebar_items(app, (chunks[0].width as usize).saturating_sub(4), theme);

    let list = List::new(items)
        .block(block)
        .style(Style::default().bg(theme.bg_panel))
        .highlight_style(
            Style::default()
                .bg(theme.bg_selection)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(list, chunks[0]);

    render_footer(frame, app, chunks[1], is_active, theme);
}

/// Build the sidebar list items.
fn build_sidebar_items(app: &App, max_width: usize, theme: &Theme) -> Vec<ListItem<'static>> {
    let mut items = Vec::new();
    let active_id = app.session.selected_document_id();

    for (idx, document) in app.session.documents().iter().enumerate() {
        let under_cursor = idx == app.selected_doc_idx;
        let is_open = active_id == Some(document.id.as_str());
        let is_deleting = app.session.is_deleting(&document.id);

        let (indicator, indicator_color) = if is_deleting {
            ("~ ", theme.spinner)
        } else if is_open {
            ("● ", theme.accent)
        } else {
            ("  ", theme.text_muted)
        };

        let name = truncate_str(&document.name, max_width.saturating_sub(2));

        let style = if under_cursor {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else if is_open {
            Style::default().fg(theme.text)
        } else {
            Style::default().fg(theme.text_secondary)
        };

        items.push(ListItem::new(Line::from(vec![
            Span::styled(indicator, Style::default().fg(indicator_color)),
            Span::styled(name, style),
        ])));
    }

    // If no documents, show placeholder
    if items.is_empty() {
        items.push(ListItem::new(Line::from(Span::styled(
            "No documents yet",
            Style::default().fg(theme.text_muted),
        ))));
        items.push(ListItem::new(Line::from(Span::styled(
            "Press u to upload one",
            Style::default().fg(theme.text_muted),
        ))));
    }

    items
}

/// Render the footer with key hints.
fn render_footer(frame: &mut Frame, _app: &App, area: Rect, is_active: bool, theme: &Theme) {
    let footer_style = if is_active {
        Style::default().fg(theme.accent).bg(theme.bg)
    } else {
        Style::default().fg(theme.text_muted).bg(theme.bg)
    };

    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " [u] Upload  [d] Delete",
        footer_style,
    )]))
    .style(Style::default().bg(theme.bg));

    frame.render_widget(footer, area);
}
