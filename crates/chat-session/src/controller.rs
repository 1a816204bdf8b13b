//! The chat session controller.
//!
//! Owns the entire session state: active document, message log, pending
//! input, and the busy flags gating in-flight operations. State-changing
//! steps are split from their remote calls: `begin_*` performs the local
//! transition and returns a ticket, `apply_*`/`finish_*` installs the
//! remote result if it is still current, and the async methods wire the
//! two together around the [`DocumentApi`] calls. The split is what makes
//! ordering guarantees (stale history discard, busy-flag no-ops) testable
//! without I/O.

use crate::api::DocumentApi;
use crate::format::{format_answer, format_response};
use crate::notify::{Notice, NotificationSink};
use crate::registry::DocumentRegistry;
use rag_api::{Answer, ApiError, ApiResult, Document, Message, MessageKind};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// File extensions the client accepts for upload.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".pdf", ".md"];

/// Whether a file name carries a supported extension (case-insensitive).
pub fn has_supported_extension(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    SUPPORTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Errors reported by session operations.
///
/// Remote failures of queries, uploads, and deletes never surface here;
/// they become log entries or notices per the error policy. What remains
/// are local validation failures and the refresh path, where the caller
/// decides the fallback.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Id not present in the document registry
    #[error("unknown document: {0}")]
    UnknownDocument(String),

    /// File extension not accepted for upload
    #[error("unsupported file type: {0} (expected .pdf or .md)")]
    UnsupportedFileType(String),

    /// Remote call failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Ticket for an in-flight history fetch.
///
/// Tagged with the epoch of the selection that requested it; a fetch whose
/// epoch is no longer current is discarded on completion, so the displayed
/// log always corresponds to the last-requested document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryFetch {
    document_id: String,
    epoch: u64,
}

impl HistoryFetch {
    pub fn document_id(&self) -> &str {
        &self.document_id
    }
}

/// Ticket for an in-flight query.
#[derive(Debug, Clone)]
pub struct QueryTicket {
    document_id: String,
    text: String,
    user_message: Message,
}

impl QueryTicket {
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The `user` message appended when the query began, for persistence.
    pub fn user_message(&self) -> &Message {
        &self.user_message
    }
}

/// Session state and the operations that drive it.
pub struct ChatSession {
    api: Arc<dyn DocumentApi>,
    notifier: Arc<dyn NotificationSink>,
    registry: DocumentRegistry,
    selected: Option<String>,
    messages: Vec<Message>,
    query_input: String,
    uploading: bool,
    querying: bool,
    deleting: HashSet<String>,
    history_epoch: u64,
}

impl ChatSession {
    pub fn new(api: Arc<dyn DocumentApi>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            api,
            notifier,
            registry: DocumentRegistry::new(),
            selected: None,
            messages: Vec::new(),
            query_input: String::new(),
            uploading: false,
            querying: false,
            deleting: HashSet::new(),
            history_epoch: 0,
        }
    }

    // ---- read accessors ----

    /// Handle to the remote API, for callers that drive the begin/finish
    /// halves themselves (e.g. to keep a UI responsive while a call runs).
    pub fn api(&self) -> Arc<dyn DocumentApi> {
        self.api.clone()
    }

    pub fn documents(&self) -> &[Document] {
        self.registry.documents()
    }

    pub fn selected_document_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_document(&self) -> Option<&Document> {
        self.selected.as_deref().and_then(|id| self.registry.get(id))
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn is_querying(&self) -> bool {
        self.querying
    }

    pub fn is_deleting(&self, id: &str) -> bool {
        self.deleting.contains(id)
    }

    // ---- pending input ----

    pub fn query_input(&self) -> &str {
        &self.query_input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.query_input = text.into();
    }

    pub fn push_input(&mut self, c: char) {
        self.query_input.push(c);
    }

    pub fn pop_input(&mut self) {
        self.query_input.pop();
    }

    /// Take the pending input, leaving it empty.
    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.query_input)
    }

    /// Clear the local message log and pending input. Local-only: the
    /// server-side history is deliberately left untouched.
    pub fn clear_chat(&mut self) {
        self.messages.clear();
        self.query_input.clear();
    }

    // ---- document list ----

    /// Refresh the registry from the server. If the current selection
    /// disappeared from the list, falls back to the first remaining
    /// document, or clears selection and log when none remain.
    pub async fn refresh_documents(&mut self) -> Result<(), SessionError> {
        self.registry.refresh(self.api.as_ref()).await?;

        if let Some(id) = self.selected.clone() {
            if !self.registry.contains(&id) {
                let fallback = self.registry.first_id().map(str::to_string);
                self.select_document(fallback.as_deref()).await?;
            }
        }
        Ok(())
    }

    /// Select the first document iff nothing is selected yet.
    pub async fn select_default(&mut self) -> Result<(), SessionError> {
        if self.selected.is_some() {
            return Ok(());
        }
        if let Some(first) = self.registry.first_id().map(str::to_string) {
            self.select_document(Some(&first)).await?;
        }
        Ok(())
    }

    // ---- selection ----

    /// Local half of a selection change: validates the id, installs the
    /// selection, clears the log and pending input, and returns the ticket
    /// for the history fetch (None when deselecting).
    pub fn begin_select(&mut self, id: Option<&str>) -> Result<Option<HistoryFetch>, SessionError> {
        if let Some(id) = id {
            if !self.registry.contains(id) {
                return Err(SessionError::UnknownDocument(id.to_string()));
            }
        }

        self.history_epoch = self.history_epoch.wrapping_add(1);
        self.selected = id.map(str::to_string);
        self.messages.clear();
        self.query_input.clear();

        Ok(id.map(|id| HistoryFetch {
            document_id: id.to_string(),
            epoch: self.history_epoch,
        }))
    }

    /// Install a fetched history if the ticket is still current.
    /// Returns false when the result was stale and discarded.
    pub fn apply_history(&mut self, fetch: &HistoryFetch, history: Vec<Message>) -> bool {
        if fetch.epoch != self.history_epoch
            || self.selected.as_deref() != Some(fetch.document_id.as_str())
        {
            tracing::debug!(document_id = %fetch.document_id, "discarding stale history fetch");
            return false;
        }

        // Replayed assistant messages go through the formatter; it is
        // idempotent, so already-clean history is unaffected.
        self.messages = history
            .into_iter()
            .map(|mut message| {
                if message.kind == MessageKind::Assistant {
                    message.text = format_response(&message.text);
                }
                message
            })
            .collect();
        true
    }

    /// Switch the active document and load its persisted history.
    ///
    /// A failed history fetch degrades to an empty thread rather than an
    /// error: an empty document may legitimately have no history yet.
    pub async fn select_document(&mut self, id: Option<&str>) -> Result<(), SessionError> {
        let Some(fetch) = self.begin_select(id)? else {
            return Ok(());
        };

        let history = self
            .api
            .chat_history(fetch.document_id())
            .await
            .unwrap_or_default();
        self.apply_history(&fetch, history);
        Ok(())
    }

    // ---- query ----

    /// Local half of sending a query. Appends the `user` message and sets
    /// the busy flag. Returns None (a no-op) when the trimmed text is
    /// empty, nothing is selected, or a query is already in flight.
    pub fn begin_query(&mut self, text: &str) -> Option<QueryTicket> {
        if self.querying || text.trim().is_empty() {
            return None;
        }
        let document_id = self.selected.clone()?;

        self.querying = true;
        let user_message = Message::user(text);
        self.messages.push(user_message.clone());

        Some(QueryTicket {
            document_id,
            text: text.to_string(),
            user_message,
        })
    }

    /// Install a query result: an `assistant` message on success, a local
    /// `error` message on failure. Returns a clone of the appended message
    /// so the caller can persist it, or None when the active document
    /// changed while the query was in flight.
    pub fn finish_query(
        &mut self,
        ticket: &QueryTicket,
        result: ApiResult<Answer>,
    ) -> Option<Message> {
        self.querying = false;

        if self.selected.as_deref() != Some(ticket.document_id.as_str()) {
            tracing::debug!(document_id = %ticket.document_id, "discarding query result for deselected document");
            return None;
        }

        let message = match result {
            Ok(answer) => Message::assistant(format_answer(answer)),
            Err(e) => Message::error(format!("Error: {e}")),
        };
        self.messages.push(message.clone());
        Some(message)
    }

    /// Send a query against the active document.
    ///
    /// Ordered effects: append and persist the `user` message, call the
    /// query endpoint, then append the formatted `assistant` message and
    /// persist it, or append a local (unpersisted) `error` message on
    /// failure, leaving the user message in place. Serialized by the
    /// `querying` flag; a second call while one is pending is a no-op.
    pub async fn send_query(&mut self, text: &str) -> Result<(), SessionError> {
        let Some(ticket) = self.begin_query(text) else {
            return Ok(());
        };

        // Fire-and-forget persistence; failure must not block the query.
        if let Err(e) = self
            .api
            .post_message(ticket.document_id(), ticket.user_message())
            .await
        {
            tracing::debug!(error = %e, "failed to persist user message");
        }

        let result = self
            .api
            .query(ticket.text(), Some(ticket.document_id()))
            .await;

        if let Some(message) = self.finish_query(&ticket, result) {
            if message.kind == MessageKind::Assistant {
                if let Err(e) = self.api.post_message(ticket.document_id(), &message).await {
                    tracing::debug!(error = %e, "failed to persist assistant message");
                }
            }
        }
        Ok(())
    }

    // ---- upload ----

    /// Local half of an upload: validates the file name and takes the
    /// global upload flag. Ok(false) means an upload is already running
    /// and this call should be ignored.
    pub fn begin_upload(&mut self, filename: &str) -> Result<bool, SessionError> {
        if !has_supported_extension(filename) {
            return Err(SessionError::UnsupportedFileType(filename.to_string()));
        }
        if self.uploading {
            return Ok(false);
        }
        self.uploading = true;
        Ok(true)
    }

    /// Upload a file and select the resulting document.
    ///
    /// On success the registry is refreshed and the new document selected:
    /// the id from the upload receipt when the server provides one,
    /// otherwise the last entry of the refreshed list. Upload failures are
    /// reported through the notification sink and leave the current
    /// selection and log untouched.
    pub async fn upload_document(
        &mut self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<(), SessionError> {
        if !self.begin_upload(filename)? {
            return Ok(());
        }

        let result = self.api.upload_document(filename, bytes).await;
        self.uploading = false;

        let receipt = match result {
            Ok(receipt) => receipt,
            Err(e) => {
                self.notifier
                    .notify(Notice::error(format!("Upload failed: {e}")));
                return Ok(());
            }
        };

        let detail = receipt
            .message
            .clone()
            .or_else(|| receipt.status.clone())
            .unwrap_or_default();
        self.notifier.notify(Notice::info(
            format!("Uploaded \"{filename}\". {detail}").trim().to_string(),
        ));

        self.registry.refresh(self.api.as_ref()).await?;

        // Prefer the id the server returned; the positional fallback
        // assumes the server appends new documents at the end of the list.
        let new_id = receipt
            .document_id
            .as_deref()
            .filter(|id| self.registry.contains(id))
            .map(str::to_string)
            .or_else(|| self.registry.last_id().map(str::to_string));

        self.select_document(new_id.as_deref()).await
    }

    // ---- delete ----

    /// Delete a document. Callers must have taken the user through an
    /// explicit confirmation gate before invoking this.
    ///
    /// A 404 from the server means the document is already gone and is
    /// treated as success (the registry is still refreshed). Other
    /// failures leave all state unchanged and go to the notification
    /// sink. When the deleted document was the active one, the first
    /// remaining document is selected, or selection and log are cleared.
    pub async fn delete_document(&mut self, id: &str) -> Result<(), SessionError> {
        if !self.registry.contains(id) {
            return Err(SessionError::UnknownDocument(id.to_string()));
        }
        if !self.deleting.insert(id.to_string()) {
            return Ok(()); // delete already in flight for this document
        }

        let result = self.api.delete_document(id).await;
        self.deleting.remove(id);

        match result {
            Ok(_) | Err(ApiError::NotFound(_)) => {
                self.notifier
                    .notify(Notice::info(format!("Document {id} deleted")));
                // refresh_documents reselects when the active document
                // disappeared from the list.
                self.refresh_documents().await
            }
            Err(e) => {
                self.notifier
                    .notify(Notice::error(format!("Delete failed: {e}")));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions() {
        assert!(has_supported_extension("notes.md"));
        assert!(has_supported_extension("Report.PDF"));
        assert!(!has_supported_extension("image.png"));
        assert!(!has_supported_extension("pdf"));
        assert!(!has_supported_extension(""));
    }
}
