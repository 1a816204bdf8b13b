//! In-memory mirror of the server's document list.

use crate::api::DocumentApi;
use rag_api::{ApiResult, Document};

/// Read-mostly list of known documents.
///
/// The list is rebuilt wholesale from every server response; the client
/// never generates ids or mutates entries in place, so there is nothing to
/// drift out of sync.
#[derive(Debug, Default)]
pub struct DocumentRegistry {
    documents: Vec<Document>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list with the server's current one.
    ///
    /// On failure the previous list is kept untouched; the caller decides
    /// whether to surface the error or keep showing stale data.
    pub async fn refresh(&mut self, api: &dyn DocumentApi) -> ApiResult<&[Document]> {
        let documents = api.list_documents().await?;
        tracing::debug!(count = documents.len(), "document list refreshed");
        self.documents = documents;
        Ok(&self.documents)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// First document in server-returned order.
    pub fn first_id(&self) -> Option<&str> {
        self.documents.first().map(|d| d.id.as_str())
    }

    /// Last document in server-returned order.
    pub fn last_id(&self) -> Option<&str> {
        self.documents.last().map(|d| d.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rag_api::{Answer, ApiError, Message, UploadReceipt};

    /// Minimal stub returning a fixed document list.
    struct FixedApi(Vec<Document>);

    #[async_trait]
    impl DocumentApi for FixedApi {
        async fn upload_document(
            &self,
            _filename: &str,
            _bytes: Vec<u8>,
        ) -> Result<UploadReceipt, ApiError> {
            Ok(UploadReceipt::default())
        }

        async fn query(
            &self,
            _text: &str,
            _document_id: Option<&str>,
        ) -> Result<Answer, ApiError> {
            Ok(Answer::Text(String::new()))
        }

        async fn list_documents(&self) -> Result<Vec<Document>, ApiError> {
            Ok(self.0.clone())
        }

        async fn delete_document(&self, _id: &str) -> Result<serde_json::Value, ApiError> {
            Ok(serde_json::Value::Null)
        }

        async fn chat_history(&self, _document_id: &str) -> Result<Vec<Message>, ApiError> {
            Ok(Vec::new())
        }

        async fn post_message(
            &self,
            _document_id: &str,
            _message: &Message,
        ) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn doc(id: &str, name: &str) -> Document {
        Document {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_refresh_replaces_wholesale() {
        let mut registry = DocumentRegistry::new();
        assert!(registry.is_empty());

        let api = FixedApi(vec![doc("1", "a.pdf"), doc("2", "b.pdf")]);
        registry.refresh(&api).await.unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.first_id(), Some("1"));
        assert_eq!(registry.last_id(), Some("2"));

        let api = FixedApi(vec![doc("2", "b.pdf")]);
        registry.refresh(&api).await.unwrap();
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains("1"));
        assert!(registry.contains("2"));
    }

    #[tokio::test]
    async fn test_accessors() {
        let mut registry = DocumentRegistry::new();
        let api = FixedApi(vec![doc("1", "a.pdf")]);
        registry.refresh(&api).await.unwrap();

        assert_eq!(registry.get("1").map(|d| d.name.as_str()), Some("a.pdf"));
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.documents().len(), 1);
    }
}
