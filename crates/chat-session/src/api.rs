//! Seam between the session controller and the remote service.

use async_trait::async_trait;
use rag_api::{Answer, ApiResult, Document, Message, RagClient, UploadReceipt};

/// The slice of the remote API the session controller consumes.
///
/// [`RagClient`] is the production implementation; tests implement this
/// with scripted in-memory responses so ordering properties can be checked
/// without a server.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    async fn upload_document(&self, filename: &str, bytes: Vec<u8>) -> ApiResult<UploadReceipt>;

    async fn query(&self, text: &str, document_id: Option<&str>) -> ApiResult<Answer>;

    async fn list_documents(&self) -> ApiResult<Vec<Document>>;

    async fn delete_document(&self, id: &str) -> ApiResult<serde_json::Value>;

    async fn chat_history(&self, document_id: &str) -> ApiResult<Vec<Message>>;

    async fn post_message(&self, document_id: &str, message: &Message) -> ApiResult<()>;
}

#[async_trait]
impl DocumentApi for RagClient {
    async fn upload_document(&self, filename: &str, bytes: Vec<u8>) -> ApiResult<UploadReceipt> {
        RagClient::upload_document(self, filename, bytes).await
    }

    async fn query(&self, text: &str, document_id: Option<&str>) -> ApiResult<Answer> {
        RagClient::query(self, text, document_id).await
    }

    async fn list_documents(&self) -> ApiResult<Vec<Document>> {
        RagClient::list_documents(self).await
    }

    async fn delete_document(&self, id: &str) -> ApiResult<serde_json::Value> {
        RagClient::delete_document(self, id).await
    }

    async fn chat_history(&self, document_id: &str) -> ApiResult<Vec<Message>> {
        RagClient::chat_history(self, document_id).await
    }

    async fn post_message(&self, document_id: &str, message: &Message) -> ApiResult<()> {
        RagClient::post_message(self, document_id, message).await
    }
}
