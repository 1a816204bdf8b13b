//! Client for the remote document-question-answering service.
//!
//! Every call is a plain request/response pair, no streaming and no
//! retries. Failures map onto [`ApiError`] and are handled at the
//! session-controller boundary.

use crate::error::{ApiError, ApiResult};
use crate::types::{Answer, Document, Message, UploadReceipt};
use reqwest::multipart;
use serde::Serialize;
use url::Url;

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    #[serde(rename = "documentId", skip_serializing_if = "Option::is_none")]
    document_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    message: &'a Message,
}

/// HTTP client for the remote service.
#[derive(Clone, Debug)]
pub struct RagClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RagClient {
    /// Create a new client for the given base URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments, with proper escaping of
    /// ids that contain reserved characters.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Upload a document as a multipart form (field `file`).
    pub async fn upload_document(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> ApiResult<UploadReceipt> {
        tracing::debug!(filename, size = bytes.len(), "uploading document");

        let part = multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.endpoint(&["upload"]))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// Ask a question, optionally scoped to one document.
    pub async fn query(&self, text: &str, document_id: Option<&str>) -> ApiResult<Answer> {
        let request = QueryRequest {
            query: text,
            document_id,
        };

        tracing::debug!(document_id = ?document_id, "sending query");

        let response = self
            .http
            .post(self.endpoint(&["query"]))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let value: serde_json::Value = response.json().await?;
        Ok(Answer::from_value(value))
    }

    /// Fetch the full document list, in server order.
    pub async fn list_documents(&self) -> ApiResult<Vec<Document>> {
        let response = self.http.get(self.endpoint(&["documents"])).send().await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// Delete a document by id.
    ///
    /// A 404 maps to [`ApiError::NotFound`] so callers can treat an
    /// already-deleted document as success-equivalent.
    pub async fn delete_document(&self, id: &str) -> ApiResult<serde_json::Value> {
        let response = self
            .http
            .delete(self.endpoint(&["documents", id]))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        Ok(response.json().await.unwrap_or(serde_json::Value::Null))
    }

    /// Fetch the persisted chat thread for a document.
    ///
    /// A non-success status degrades to an empty thread: a fresh document
    /// legitimately has no history yet.
    pub async fn chat_history(&self, document_id: &str) -> ApiResult<Vec<Message>> {
        let response = self
            .http
            .get(self.endpoint(&["chat", document_id]))
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!(
                document_id,
                status = response.status().as_u16(),
                "history fetch degraded to empty"
            );
            return Ok(Vec::new());
        }

        Ok(response.json().await?)
    }

    /// Persist one message to a document's chat thread.
    ///
    /// Fire-and-forget: the response body is ignored and only transport
    /// failures propagate.
    pub async fn post_message(&self, document_id: &str, message: &Message) -> ApiResult<()> {
        self.http
            .post(self.endpoint(&["chat", document_id]))
            .json(&PostMessageRequest { message })
            .send()
            .await?;

        Ok(())
    }
}

/// Convert a non-success response into an [`ApiError::Status`].
async fn status_error(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    tracing::error!(status, message = %message, "server returned error");
    ApiError::Status { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageKind;

    fn client() -> RagClient {
        RagClient::new(Url::parse("http://localhost:8000").unwrap())
    }

    #[test]
    fn test_endpoint_building() {
        let url = client().endpoint(&["documents"]);
        assert_eq!(url.as_str(), "http://localhost:8000/documents");
    }

    #[test]
    fn test_endpoint_escapes_ids() {
        let url = client().endpoint(&["documents", "a b/c"]);
        assert_eq!(url.as_str(), "http://localhost:8000/documents/a%20b%2Fc");
    }

    #[test]
    fn test_endpoint_with_base_path() {
        let base = Url::parse("http://localhost:8000/api/").unwrap();
        let url = RagClient::new(base).endpoint(&["chat", "d1"]);
        assert_eq!(url.as_str(), "http://localhost:8000/api/chat/d1");
    }

    #[test]
    fn test_query_request_serialization() {
        let request = QueryRequest {
            query: "hi",
            document_id: Some("d1"),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"query":"hi","documentId":"d1"}"#);
    }

    #[test]
    fn test_query_request_omits_missing_document() {
        let request = QueryRequest {
            query: "hi",
            document_id: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"query":"hi"}"#);
    }

    #[test]
    fn test_post_message_request_wraps_message() {
        let message = Message::new(MessageKind::User, "hello");
        let request = PostMessageRequest { message: &message };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["message"]["type"], "user");
        assert_eq!(value["message"]["text"], "hello");
    }
}
