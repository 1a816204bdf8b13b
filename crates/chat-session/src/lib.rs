//! Client-side chat/session state machine.
//!
//! This crate owns the only stateful core of the client: one active
//! document, its append-only message log, and the busy flags gating
//! in-flight upload/query/delete operations. It is UI-agnostic; the
//! terminal surfaces in `apps/cli` drive it through the operations on
//! [`ChatSession`], and tests drive it through a scripted [`DocumentApi`].

mod api;
mod controller;
mod format;
mod notify;
mod registry;

pub use api::DocumentApi;
pub use controller::{
    has_supported_extension, ChatSession, HistoryFetch, QueryTicket, SessionError,
    SUPPORTED_EXTENSIONS,
};
pub use format::{format_answer, format_response, sanitize_text};
pub use notify::{Notice, NoticeLevel, NotificationSink, NullSink, QueueSink};
pub use registry::DocumentRegistry;

// Wire types come from the client crate; re-exported so surfaces only
// need one import path.
pub use rag_api::{Answer, ApiError, ApiResult, Document, Message, MessageKind, UploadReceipt};
