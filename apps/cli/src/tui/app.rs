//! Application state for the TUI.
//!
//! Session data (documents, selection, messages, busy flags) lives in
//! [`ChatSession`]; this struct owns only what the terminal needs on top
//! of it: panel focus, input modes, scroll positions, and the status bar.

use super::theme::{Theme, ThemeMode};
use chat_session::{ChatSession, Document, MessageKind, NoticeLevel, QueryTicket, QueueSink};
use rag_api::{Answer, ApiError, ApiResult, RagClient};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Active panel in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Sidebar,
    Chat,
}

/// Input mode for the chat panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing a query into the chat input.
    Editing,
    /// Typing a file path for upload.
    UploadPrompt,
}

/// Main application state.
pub struct App {
    /// Session core: documents, selection, messages, busy flags.
    pub session: ChatSession,
    /// Notices emitted by the session controller, drained once per frame.
    notices: Arc<QueueSink>,

    // Navigation
    pub active_panel: Panel,
    pub input_mode: InputMode,
    pub selected_doc_idx: usize,

    // Chat scroll
    pub chat_scroll_offset: u16,
    pub chat_auto_scroll: bool,

    // Upload prompt buffer
    pub upload_input: String,

    // Delete confirmation dialog: the document id awaiting a yes/no
    pub confirm_delete: Option<String>,

    // Query running in the background, so the draw loop stays live
    pending_query: Option<(QueryTicket, JoinHandle<ApiResult<Answer>>)>,

    // Status
    pub status_message: Option<String>,
    pub spinner_frame: usize,

    // Theme
    pub theme: Theme,
}

impl App {
    /// Create the application state around a remote client.
    pub fn new(client: RagClient, theme_mode: ThemeMode) -> Self {
        let notices = Arc::new(QueueSink::new());
        let session = ChatSession::new(Arc::new(client), notices.clone());

        Self {
            session,
            notices,
            active_panel: Panel::Sidebar,
            input_mode: InputMode::Normal,
            selected_doc_idx: 0,
            chat_scroll_offset: 0,
            chat_auto_scroll: true,
            upload_input: String::new(),
            confirm_delete: None,
            pending_query: None,
            status_message: None,
            spinner_frame: 0,
            theme: Theme::from_mode(theme_mode),
        }
    }

    /// Set a status message.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some(message);
    }

    /// Clear the status message.
    pub fn clear_status_message(&mut self) {
        self.status_message = None;
    }

    /// Move controller notices into the status bar. Last one wins; errors
    /// are prefixed so the bar shows them in the warning color.
    pub fn drain_notices(&mut self) {
        for notice in self.notices.drain() {
            let text = match notice.level {
                NoticeLevel::Error => format!("Error: {}", notice.text),
                _ => notice.text,
            };
            self.status_message = Some(text);
        }
    }

    /// The document under the sidebar cursor.
    pub fn document_under_cursor(&self) -> Option<&Document> {
        self.session.documents().get(self.selected_doc_idx)
    }

    /// Move the sidebar cursor down (wrapping).
    pub fn sidebar_down(&mut self) {
        let total = self.session.documents().len();
        if total > 0 {
            self.selected_doc_idx = (self.selected_doc_idx + 1) % total;
        }
    }

    /// Move the sidebar cursor up (wrapping).
    pub fn sidebar_up(&mut self) {
        let total = self.session.documents().len();
        if total > 0 {
            self.selected_doc_idx = if self.selected_doc_idx == 0 {
                total - 1
            } else {
                self.selected_doc_idx - 1
            };
        }
    }

    /// Re-align the sidebar cursor after the document list changed:
    /// follow the active document if there is one, otherwise clamp.
    pub fn sync_sidebar_cursor(&mut self) {
        let documents = self.session.documents();
        if let Some(active) = self.session.selected_document_id() {
            if let Some(idx) = documents.iter().position(|d| d.id == active) {
                self.selected_doc_idx = idx;
                return;
            }
        }
        self.selected_doc_idx = self.selected_doc_idx.min(documents.len().saturating_sub(1));
    }

    /// Select the document under the cursor and load its history.
    pub async fn select_under_cursor(&mut self) {
        let Some(id) = self.document_under_cursor().map(|d| d.id.clone()) else {
            return;
        };
        if self.session.selected_document_id() == Some(id.as_str()) {
            return;
        }
        self.chat_auto_scroll = true;
        self.chat_scroll_offset = 0;
        if let Err(e) = self.session.select_document(Some(&id)).await {
            self.set_status_message(format!("Failed to open document: {e}"));
        }
    }

    /// Kick off a query for the pending input without blocking the draw
    /// loop. The result is installed by [`App::poll_pending_query`] on a
    /// later frame; until then the controller's busy flag gates input.
    pub fn start_query(&mut self) {
        let text = self.session.take_input();
        let Some(ticket) = self.session.begin_query(&text) else {
            return;
        };
        self.chat_auto_scroll = true;

        let api = self.session.api();
        let task_ticket = ticket.clone();
        let handle = tokio::spawn(async move {
            // Persist the user message first; failure must not block the
            // query itself.
            if let Err(e) = api
                .post_message(task_ticket.document_id(), task_ticket.user_message())
                .await
            {
                tracing::debug!(error = %e, "failed to persist user message");
            }
            api.query(task_ticket.text(), Some(task_ticket.document_id()))
                .await
        });
        self.pending_query = Some((ticket, handle));
    }

    /// Install the result of a finished query task, if any.
    pub async fn poll_pending_query(&mut self) {
        let finished = self
            .pending_query
            .as_ref()
            .map(|(_, handle)| handle.is_finished())
            .unwrap_or(false);
        if !finished {
            return;
        }
        let Some((ticket, handle)) = self.pending_query.take() else {
            return;
        };

        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(ApiError::Status {
                status: 0,
                message: format!("query task failed: {e}"),
            }),
        };

        if let Some(message) = self.session.finish_query(&ticket, result) {
            if message.kind == MessageKind::Assistant {
                // Fire-and-forget persistence of the answer.
                let api = self.session.api();
                let document_id = ticket.document_id().to_string();
                tokio::spawn(async move {
                    if let Err(e) = api.post_message(&document_id, &message).await {
                        tracing::debug!(error = %e, "failed to persist assistant message");
                    }
                });
            }
            self.chat_auto_scroll = true;
        }
    }

    /// Refresh the document list from the server.
    pub async fn refresh(&mut self) {
        match self.session.refresh_documents().await {
            Ok(()) => {
                self.sync_sidebar_cursor();
                self.set_status_message("Documents refreshed".to_string());
            }
            Err(e) => self.set_status_message(format!("Refresh failed: {e}")),
        }
    }

    /// Move to the other panel.
    pub fn next_panel(&mut self) {
        self.active_panel = match self.active_panel {
            Panel::Sidebar => Panel::Chat,
            Panel::Chat => Panel::Sidebar,
        };
    }

    /// Get the current spinner character for the loading animation.
    pub fn spinner_char(&self) -> char {
        const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }

    /// Advance the spinner frame (call on each render while busy).
    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }
}
