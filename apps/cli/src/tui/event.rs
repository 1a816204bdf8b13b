//! Keyboard event handling for the TUI.

use super::app::{App, InputMode, Panel};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent};
use std::path::Path;
use std::time::Duration;

/// Handle input events. Returns true if the app should quit.
pub async fn handle_events(app: &mut App) -> Result<bool> {
    // Poll for events with a small timeout
    if event::poll(Duration::from_millis(100))? {
        if let Event::Key(key) = event::read()? {
            // Clear status message on any key press
            app.clear_status_message();

            return Ok(handle_key_event(app, key).await);
        }
    }

    Ok(false)
}

/// Handle a key event. Returns true if the app should quit.
async fn handle_key_event(app: &mut App, key: KeyEvent) -> bool {
    // Delete confirmation dialog first (modal overlay)
    if app.confirm_delete.is_some() {
        return handle_confirm_dialog(app, key).await;
    }

    // Handle edit mode separately
    if app.input_mode == InputMode::Editing {
        return handle_edit_mode(app, key).await;
    }

    // Handle the upload path prompt separately
    if app.input_mode == InputMode::UploadPrompt {
        return handle_upload_prompt(app, key).await;
    }

    // Normal mode
    match key.code {
        // Quit
        KeyCode::Char('q') => return true,

        // Panel navigation
        KeyCode::Tab | KeyCode::BackTab => app.next_panel(),

        // Movement
        KeyCode::Char('j') | KeyCode::Down => handle_down(app).await,
        KeyCode::Char('k') | KeyCode::Up => handle_up(app).await,

        // Select the document under the cursor
        KeyCode::Enter => {
            if app.active_panel == Panel::Sidebar {
                app.select_under_cursor().await;
            }
        }

        // Enter edit mode in the chat panel
        KeyCode::Char('i') => {
            app.active_panel = Panel::Chat;
            app.input_mode = InputMode::Editing;
        }

        // Upload prompt
        KeyCode::Char('u') => {
            if !app.session.is_uploading() {
                app.upload_input.clear();
                app.input_mode = InputMode::UploadPrompt;
            } else {
                app.set_status_message("An upload is already running".to_string());
            }
        }

        // Delete the document under the cursor (confirmation gate)
        KeyCode::Char('d') => {
            if let Some(id) = app.document_under_cursor().map(|d| d.id.clone()) {
                app.confirm_delete = Some(id);
            }
        }

        // Clear chat (local only)
        KeyCode::Char('c') => {
            app.session.clear_chat();
            app.set_status_message("Chat cleared".to_string());
        }

        // Refresh document list
        KeyCode::Char('r') => {
            app.refresh().await;
        }

        // Jump to bottom of chat (re-enable auto-scroll)
        KeyCode::Char('G') => {
            if app.active_panel == Panel::Chat {
                app.chat_auto_scroll = true;
                app.chat_scroll_offset = 0; // set to max by render
            }
        }

        // Jump to top of chat
        KeyCode::Char('g') => {
            if app.active_panel == Panel::Chat {
                app.chat_scroll_offset = 0;
                app.chat_auto_scroll = false;
            }
        }

        // Help
        KeyCode::Char('?') => {
            app.set_status_message(
                "Tab: panel | j/k: move | Enter: open | i: ask | u: upload | d: delete | c: clear | r: refresh | q: quit"
                    .to_string(),
            );
        }

        _ => {}
    }

    false
}

/// Handle keys while the delete confirmation dialog is open.
async fn handle_confirm_dialog(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            if let Some(id) = app.confirm_delete.take() {
                match app.session.delete_document(&id).await {
                    Ok(()) => app.sync_sidebar_cursor(),
                    Err(e) => app.set_status_message(format!("Delete failed: {e}")),
                }
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.confirm_delete = None;
            app.set_status_message("Delete cancelled".to_string());
        }
        _ => {}
    }

    false
}

/// Handle key events in edit mode. Returns true if the app should quit.
async fn handle_edit_mode(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            // The controller no-ops on blank input or while a query is
            // already in flight, so no pre-checks here.
            app.start_query();
        }
        KeyCode::Char(c) => {
            if !app.session.is_querying() {
                app.session.push_input(c);
            }
        }
        KeyCode::Backspace => {
            if !app.session.is_querying() {
                app.session.pop_input();
            }
        }
        _ => {}
    }

    false
}

/// Handle key events in the upload path prompt.
async fn handle_upload_prompt(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => {
            app.upload_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            let path_input = app.upload_input.trim().to_string();
            if path_input.is_empty() {
                return false;
            }
            app.upload_input.clear();
            app.input_mode = InputMode::Normal;
            upload_file(app, &path_input).await;
        }
        KeyCode::Char(c) => {
            app.upload_input.push(c);
        }
        KeyCode::Backspace => {
            app.upload_input.pop();
        }
        _ => {}
    }

    false
}

/// Read a local file and hand it to the session controller.
async fn upload_file(app: &mut App, path_input: &str) {
    let path = Path::new(path_input);
    let Some(filename) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
        app.set_status_message(format!("Invalid path: {path_input}"));
        return;
    };

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            app.set_status_message(format!("Cannot read {path_input}: {e}"));
            return;
        }
    };

    match app.session.upload_document(&filename, bytes).await {
        Ok(()) => app.sync_sidebar_cursor(),
        Err(e) => app.set_status_message(format!("Upload failed: {e}")),
    }
}

/// Handle down movement.
async fn handle_down(app: &mut App) {
    match app.active_panel {
        Panel::Sidebar => {
            app.sidebar_down();
            // Open the document under the cursor as we move
            app.select_under_cursor().await;
        }
        Panel::Chat => {
            // Scroll down - show later content
            app.chat_scroll_offset = app.chat_scroll_offset.saturating_add(1);
            app.chat_auto_scroll = false; // user took control
        }
    }
}

/// Handle up movement.
async fn handle_up(app: &mut App) {
    match app.active_panel {
        Panel::Sidebar => {
            app.sidebar_up();
            app.select_under_cursor().await;
        }
        Panel::Chat => {
            // Scroll up - show earlier content
            app.chat_scroll_offset = app.chat_scroll_offset.saturating_sub(1);
            app.chat_auto_scroll = false;
        }
    }
}
