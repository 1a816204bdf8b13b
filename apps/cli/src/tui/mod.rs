//! Ratatui-based terminal UI for docchat.
//!
//! Two-panel layout: a left sidebar listing documents, and a chat panel
//! holding the active document's message thread and the query input. A
//! status bar at the bottom surfaces controller notices and key hints.

mod app;
mod components;
mod event;
pub mod theme;
mod ui;

pub use app::App;
pub use theme::ThemeMode;

use crate::config::Config;
use anyhow::Result;
use crossterm::{
    cursor::Show,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rag_api::RagClient;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, panic};

/// Restore terminal to normal state.
/// Called both on normal exit and on panic; ignores errors so it is safe
/// when the terminal is already restored or only partially set up.
fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        Show
    );
}

/// Install a panic hook that restores the terminal before displaying the
/// panic message, so panic output never lands in the alternate screen.
fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));
}

/// Run the TUI application.
pub async fn run(theme_mode: ThemeMode, config: &Config) -> Result<()> {
    install_panic_hook();

    let result = run_with_terminal(theme_mode, config).await;

    // Always restore, even if setup or the loop failed partway through.
    restore_terminal();

    result
}

/// Inner function that sets up the terminal and runs the app.
/// Separated so that `run()` can guarantee cleanup via restore_terminal().
async fn run_with_terminal(theme_mode: ThemeMode, config: &Config) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let client = RagClient::new(config.base_url()?);
    let mut app = App::new(client, theme_mode);
    run_app(&mut terminal, &mut app).await
}

/// Main application loop.
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    // Initial data load: document list, then the first document's thread.
    match app.session.refresh_documents().await {
        Ok(()) => {
            if let Err(e) = app.session.select_default().await {
                app.set_status_message(format!("Failed to open document: {e}"));
            }
            app.sync_sidebar_cursor();
        }
        Err(e) => {
            app.set_status_message(format!("Failed to reach service: {e}"));
        }
    }

    loop {
        // Advance spinner animation while an operation is in flight
        if app.session.is_querying() || app.session.is_uploading() {
            app.advance_spinner();
        }

        // Install the answer if the background query task finished
        app.poll_pending_query().await;

        // Surface any notices the controller queued since last frame
        app.drain_notices();

        // Render
        terminal.draw(|f| ui::render(f, app))?;

        // Handle events
        if event::handle_events(app).await? {
            break;
        }
    }

    Ok(())
}
