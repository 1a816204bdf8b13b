//! Wire types shared with the remote service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document known to the remote service.
///
/// Documents are created server-side on upload and never mutated in place;
/// the client only mirrors the list the server returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Opaque stable identifier, unique within the service.
    pub id: String,
    /// Display name, not guaranteed unique.
    pub name: String,
}

/// Variant tag for a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Assistant,
    System,
    Error,
}

fn default_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// One entry in a document's chat thread.
///
/// Messages are append-only; the `error` kind exists only locally and is
/// never persisted to the remote history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub text: String,
    /// Used only for display ordering/formatting, not conflict resolution.
    #[serde(default = "default_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with the current time.
    pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageKind::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Assistant, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(MessageKind::System, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Error, text)
    }
}

/// A query response from the service.
///
/// The service answers either with a string payload (under `text` or
/// `answer`) or with an arbitrary JSON object. Extraction is total: every
/// JSON value maps to exactly one variant, so callers never chase optional
/// fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Text(String),
    Structured(serde_json::Value),
}

impl Answer {
    /// Classify a raw response value.
    pub fn from_value(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Answer::Text(s),
            other => {
                let extracted = other
                    .get("text")
                    .or_else(|| other.get("answer"))
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_string);
                match extracted {
                    Some(s) => Answer::Text(s),
                    None => Answer::Structured(other),
                }
            }
        }
    }

    /// Raw display text for this answer. Structured payloads are rendered
    /// as compact JSON.
    pub fn into_display_text(self) -> String {
        match self {
            Answer::Text(s) => s,
            Answer::Structured(v) => v.to_string(),
        }
    }
}

/// Response of the upload endpoint.
///
/// `document_id` is what well-behaved servers return so the client can
/// select the new document directly; older servers send only a status
/// message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "documentId", alias = "document_id")]
    pub document_id: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}
