//! HTTP client for the remote document-question-answering service.
//!
//! This crate provides:
//! - Wire types shared with the service (documents, messages, answers)
//! - A typed error enum for transport and protocol failures
//! - [`RagClient`], a thin reqwest wrapper over the service endpoints

mod client;
mod error;
mod types;

pub use client::RagClient;
pub use error::{ApiError, ApiResult};
pub use types::{Answer, Document, Message, MessageKind, UploadReceipt};
