//! Chat panel component showing the message thread and the query input.

use crate::output::format_time;
use crate::tui::app::{App, InputMode, Panel};
use crate::tui::theme::Theme;
use crate::tui::ui::panel_block;
use chat_session::{Message, MessageKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

/// Render the chat panel.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let is_active = app.active_panel == Panel::Chat;
    let theme = &app.theme;

    let title = match app.session.selected_document() {
        Some(document) => format!("Chat - {}", document.name),
        None => "Chat".to_string(),
    };

    let block = panel_block(&title, is_active, theme);

    // Split into messages area and input area
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(area);

    render_messages(frame, app, chunks[0], block, theme);
    render_input(frame, app, chunks[1], is_active, theme);
}

/// Render the message list with scrolling support.
fn render_messages(frame: &mut Frame, app: &App, area: Rect, block: Block<'_>, theme: &Theme) {
    // Inner area dimensions (account for borders)
    let inner_height = area.height.saturating_sub(2) as usize;
    let inner_width = area.width.saturating_sub(4) as usize;

    if inner_width == 0 || inner_height == 0 {
        frame.render_widget(block, area);
        return;
    }

    let show_placeholder = app.session.messages().is_empty() && !app.session.is_querying();

    if show_placeholder {
        let placeholder = if app.session.selected_document_id().is_none() {
            "Select a document to start"
        } else {
            "No messages yet. Press 'i' to ask a question."
        };

        let paragraph = Paragraph::new(Line::from(Span::styled(
            placeholder,
            Style::default().fg(theme.text_muted),
        )))
        .block(block)
        .style(Style::default().bg(theme.bg_panel))
        .wrap(Wrap { trim: true });

        frame.render_widget(paragraph, area);
        return;
    }

    let all_lines = build_all_message_lines(app, inner_width, theme);

    // Calculate scroll offset
    let total_lines = all_lines.len();
    let max_scroll = total_lines.saturating_sub(inner_height);

    let scroll_offset = if app.chat_auto_scroll {
        // Auto-scroll to bottom
        max_scroll as u16
    } else {
        // Clamp manual scroll to valid range
        app.chat_scroll_offset.min(max_scroll as u16)
    };

    let paragraph = Paragraph::new(all_lines)
        .block(block)
        .style(Style::default().bg(theme.bg_panel))
        .scroll((scroll_offset, 0));

    frame.render_widget(paragraph, area);
}

/// Build all message lines for the chat panel.
fn build_all_message_lines<'a>(app: &App, inner_width: usize, theme: &'a Theme) -> Vec<Line<'a>> {
    let mut lines: Vec<Line> = Vec::new();
    let messages = app.session.messages();

    for (idx, message) in messages.iter().enumerate() {
        lines.extend(render_single_message(message, inner_width, theme));

        if idx < messages.len() - 1 {
            lines.push(Line::from(""));
        }
    }

    // Spinner line while waiting for the answer
    if app.session.is_querying() {
        if !messages.is_empty() {
            lines.push(Line::from(""));
        }
        let spinner = app.spinner_char();
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", spinner), Style::default().fg(theme.spinner)),
            Span::styled(
                "Waiting for answer...".to_string(),
                Style::default()
                    .fg(theme.spinner)
                    .add_modifier(Modifier::ITALIC),
            ),
        ]));
    }

    lines
}

/// Render a single message to lines, with a trailing timestamp.
fn render_single_message<'a>(
    message: &Message,
    inner_width: usize,
    theme: &'a Theme,
) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    let time = format_time(&message.timestamp);

    match message.kind {
        MessageKind::User => {
            // User messages: right-aligned with background, no label
            let text_style = Style::default().fg(theme.text).bg(theme.bg_user_message);

            let content_width = inner_width.saturating_sub(2);
            let wrapped = wrap(&message.text, content_width.max(1));

            for line_text in wrapped {
                let content = format!(" {} ", line_text);
                let padding = inner_width.saturating_sub(content.width());
                lines.push(Line::from(vec![
                    Span::raw(" ".repeat(padding)),
                    Span::styled(content, text_style),
                ]));
            }

            // Right-aligned timestamp under the bubble
            let padding = inner_width.saturating_sub(time.width());
            lines.push(Line::from(vec![
                Span::raw(" ".repeat(padding)),
                Span::styled(time, Style::default().fg(theme.text_muted)),
            ]));
        }
        MessageKind::Assistant => {
            // Assistant messages: left-aligned, markdown rendered
            lines.extend(render_themed_markdown(&message.text, inner_width, theme));
            lines.push(Line::from(Span::styled(
                time,
                Style::default().fg(theme.text_muted),
            )));
        }
        MessageKind::System => {
            lines.extend(render_prefixed_message(
                message,
                "System: ",
                Style::default()
                    .fg(theme.system_message)
                    .add_modifier(Modifier::BOLD | Modifier::ITALIC),
                Style::default()
                    .fg(theme.text_muted)
                    .add_modifier(Modifier::ITALIC),
                inner_width,
            ));
        }
        MessageKind::Error => {
            lines.extend(render_prefixed_message(
                message,
                "! ",
                Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
                Style::default().fg(theme.error),
                inner_width,
            ));
        }
    }

    lines
}

/// Render a message with a styled prefix on the first line and hanging
/// indent on continuations.
fn render_prefixed_message<'a>(
    message: &Message,
    prefix: &str,
    prefix_style: Style,
    content_style: Style,
    inner_width: usize,
) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    let prefix_len = prefix.len();
    let content_width = inner_width.saturating_sub(prefix_len).max(1);

    let wrapped = wrap(&message.text, content_width);
    if wrapped.is_empty() {
        return vec![Line::from(Span::styled(prefix.to_string(), prefix_style))];
    }

    for (line_idx, line_text) in wrapped.iter().enumerate() {
        let line = if line_idx == 0 {
            Line::from(vec![
                Span::styled(prefix.to_string(), prefix_style),
                Span::styled(line_text.to_string(), content_style),
            ])
        } else {
            Line::from(vec![
                Span::raw(" ".repeat(prefix_len)),
                Span::styled(line_text.to_string(), content_style),
            ])
        };
        lines.push(line);
    }

    lines
}

/// Render the input area.
fn render_input(frame: &mut Frame, app: &App, area: Rect, is_active: bool, theme: &Theme) {
    let querying = app.session.is_querying();

    let input_style = match app.input_mode {
        InputMode::Normal => Style::default().fg(theme.text_muted).bg(theme.bg_panel),
        InputMode::Editing if querying => Style::default().fg(theme.text_muted).bg(theme.bg_panel),
        InputMode::Editing => Style::default().fg(theme.text).bg(theme.bg_panel),
        InputMode::UploadPrompt => Style::default().fg(theme.accent).bg(theme.bg_panel),
    };

    let border_color = match (is_active, app.input_mode) {
        (_, InputMode::Editing) => theme.success,
        (_, InputMode::UploadPrompt) => theme.accent,
        (true, _) => theme.border_active,
        (false, _) => theme.border,
    };

    let input_text = match app.input_mode {
        InputMode::UploadPrompt => app.upload_input.clone(),
        InputMode::Normal if app.session.query_input().is_empty() => {
            "[i] Ask a question...".to_string()
        }
        _ => app.session.query_input().to_string(),
    };

    let title = match app.input_mode {
        InputMode::Editing if querying => " Waiting for answer... ",
        InputMode::Editing => " Ask (Enter to send, Esc to exit) ",
        InputMode::UploadPrompt => " Upload path (Enter to upload, Esc to cancel) ",
        InputMode::Normal => " Input ",
    };

    let input = Paragraph::new(input_text).style(input_style).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(title)
            .style(Style::default().bg(theme.bg_panel)),
    );

    frame.render_widget(input, area);

    // Set cursor position while typing
    match app.input_mode {
        InputMode::Editing if !querying => {
            let x = area.x + app.session.query_input().width() as u16 + 1;
            frame.set_cursor_position((x, area.y + 1));
        }
        InputMode::UploadPrompt => {
            let x = area.x + app.upload_input.width() as u16 + 1;
            frame.set_cursor_position((x, area.y + 1));
        }
        _ => {}
    }
}

/// Render markdown text with theme-aware colors.
/// Handles code blocks, inline code, bold, italic, headers, and lists.
fn render_themed_markdown<'a>(text: &str, inner_width: usize, theme: &'a Theme) -> Vec<Line<'a>> {
    let mut lines: Vec<Line<'a>> = Vec::new();
    let mut in_code_block = false;
    let mut code_block_lines: Vec<String> = Vec::new();

    for line in text.lines() {
        // Fenced code blocks
        if line.trim_start().starts_with("```") {
            if in_code_block {
                for code_line in &code_block_lines {
                    lines.push(code_line_to_line(code_line, inner_width, theme));
                }
                code_block_lines.clear();
                in_code_block = false;
            } else {
                in_code_block = true;
            }
            continue;
        }

        if in_code_block {
            code_block_lines.push(line.to_string());
            continue;
        }

        // Headers
        if line.starts_with('#') {
            let header_level = line.chars().take_while(|&c| c == '#').count();
            let header_text = line[header_level..].trim_start();
            let style = Style::default()
                .fg(theme.assistant_message)
                .add_modifier(Modifier::BOLD);
            for wrapped_line in wrap(header_text, inner_width.max(1)) {
                lines.push(Line::from(vec![Span::styled(
                    wrapped_line.to_string(),
                    style,
                )]));
            }
            continue;
        }

        // Bullet lists
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();
        let indent_str = " ".repeat(indent);

        if trimmed.starts_with("- ") || trimmed.starts_with("* ") {
            let list_content = &trimmed[2..];
            let bullet_style = Style::default().fg(theme.text_muted);
            let list_width = inner_width.saturating_sub(indent + 2).max(1);
            let wrapped = wrap(list_content, list_width);
            for (idx, wrapped_line) in wrapped.iter().enumerate() {
                let content_spans = parse_inline_markdown(wrapped_line, theme);
                let mut spans = vec![Span::raw(indent_str.clone())];
                if idx == 0 {
                    spans.push(Span::styled("• ", bullet_style));
                } else {
                    spans.push(Span::raw("  ")); // continuation indent
                }
                spans.extend(content_spans);
                lines.push(Line::from(spans));
            }
            continue;
        }

        // Numbered lists
        if let Some(rest) = parse_numbered_list(trimmed) {
            let prefix_len = trimmed.len() - rest.len();
            let num_prefix = &trimmed[..prefix_len];
            let list_width = inner_width.saturating_sub(indent + prefix_len).max(1);
            let wrapped = wrap(rest, list_width);
            for (idx, wrapped_line) in wrapped.iter().enumerate() {
                let content_spans = parse_inline_markdown(wrapped_line, theme);
                let mut spans = vec![Span::raw(indent_str.clone())];
                if idx == 0 {
                    spans.push(Span::styled(
                        num_prefix.to_string(),
                        Style::default().fg(theme.text_muted),
                    ));
                } else {
                    spans.push(Span::raw(" ".repeat(prefix_len)));
                }
                spans.extend(content_spans);
                lines.push(Line::from(spans));
            }
            continue;
        }

        // Regular paragraph
        if line.is_empty() {
            lines.push(Line::from(""));
        } else {
            for wrapped_line in wrap(line, inner_width.max(1)) {
                let spans = parse_inline_markdown(&wrapped_line, theme);
                lines.push(Line::from(spans));
            }
        }
    }

    // Unclosed code block
    if in_code_block {
        for code_line in &code_block_lines {
            lines.push(code_line_to_line(code_line, inner_width, theme));
        }
    }

    lines
}

/// Style one code-block line, truncating when it is too wide.
fn code_line_to_line<'a>(code_line: &str, inner_width: usize, theme: &'a Theme) -> Line<'a> {
    let display_line = if code_line.len() > inner_width.saturating_sub(2) {
        format!("{}...", &code_line[..inner_width.saturating_sub(5).min(code_line.len())])
    } else {
        code_line.to_string()
    };
    Line::from(vec![Span::styled(
        format!("  {}", display_line),
        Style::default().fg(theme.accent).add_modifier(Modifier::DIM),
    )])
}

/// Parse a numbered list line, returning the content after the number.
fn parse_numbered_list(line: &str) -> Option<&str> {
    let mut idx = 0;
    let bytes = line.as_bytes();

    // Must start with a digit
    if idx >= bytes.len() || !bytes[idx].is_ascii_digit() {
        return None;
    }

    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }

    // Must be followed by . or )
    if idx >= bytes.len() || (bytes[idx] != b'.' && bytes[idx] != b')') {
        return None;
    }
    idx += 1;

    // Must be followed by space
    if idx >= bytes.len() || bytes[idx] != b' ' {
        return None;
    }
    idx += 1;

    Some(&line[idx..])
}

/// Parse inline markdown (bold, italic, code) and return styled spans.
fn parse_inline_markdown<'a>(text: &str, theme: &'a Theme) -> Vec<Span<'a>> {
    let mut spans: Vec<Span<'a>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current = String::new();

    let text_style = Style::default().fg(theme.text);
    let code_style = Style::default().fg(theme.accent);
    let bold_style = Style::default().fg(theme.text).add_modifier(Modifier::BOLD);
    let italic_style = Style::default().fg(theme.text).add_modifier(Modifier::ITALIC);

    while let Some(ch) = chars.next() {
        match ch {
            // Inline code
            '`' => {
                if !current.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut current), text_style));
                }
                let mut code = String::new();
                while let Some(&next) = chars.peek() {
                    if next == '`' {
                        chars.next();
                        break;
                    }
                    code.push(next);
                    chars.next();
                }
                spans.push(Span::styled(code, code_style));
            }
            // Bold (**) or italic (*)
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next(); // consume second *
                    if !current.is_empty() {
                        spans.push(Span::styled(std::mem::take(&mut current), text_style));
                    }
                    let mut bold_text = String::new();
                    while let Some(&next) = chars.peek() {
                        if next == '*' {
                            chars.next();
                            if chars.peek() == Some(&'*') {
                                chars.next();
                                break;
                            }
                            bold_text.push('*');
                        } else {
                            bold_text.push(next);
                            chars.next();
                        }
                    }
                    spans.push(Span::styled(bold_text, bold_style));
                } else {
                    if !current.is_empty() {
                        spans.push(Span::styled(std::mem::take(&mut current), text_style));
                    }
                    let mut italic_text = String::new();
                    while let Some(&next) = chars.peek() {
                        if next == '*' {
                            chars.next();
                            break;
                        }
                        italic_text.push(next);
                        chars.next();
                    }
                    spans.push(Span::styled(italic_text, italic_style));
                }
            }
            _ => {
                current.push(ch);
            }
        }
    }

    if !current.is_empty() {
        spans.push(Span::styled(current, text_style));
    }

    spans
}
