//! Scenario tests for the session controller.
//!
//! The remote service is a scripted in-memory [`DocumentApi`]: every call
//! is recorded, query/upload/delete results can be queued per test, and
//! the document list and chat histories behave like a tiny server. This
//! is what lets the ordering guarantees (stale history discard, busy-flag
//! no-ops) be asserted deterministically.

use async_trait::async_trait;
use chat_session::{
    Answer, ApiError, ApiResult, ChatSession, Document, DocumentApi, Message, MessageKind, Notice,
    NoticeLevel, QueueSink, SessionError, UploadReceipt,
};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MockApi {
    documents: Mutex<Vec<Document>>,
    histories: Mutex<HashMap<String, Vec<Message>>>,
    query_results: Mutex<VecDeque<ApiResult<Answer>>>,
    upload_results: Mutex<VecDeque<ApiResult<UploadReceipt>>>,
    delete_results: Mutex<VecDeque<ApiResult<serde_json::Value>>>,
    calls: Mutex<Vec<String>>,
}

impl MockApi {
    fn with_documents(docs: &[(&str, &str)]) -> Arc<Self> {
        let api = Self::default();
        *api.documents.lock().unwrap() = docs
            .iter()
            .map(|(id, name)| Document {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect();
        Arc::new(api)
    }

    fn script_query(&self, result: ApiResult<Answer>) {
        self.query_results.lock().unwrap().push_back(result);
    }

    fn script_upload(&self, result: ApiResult<UploadReceipt>) {
        self.upload_results.lock().unwrap().push_back(result);
    }

    fn script_delete(&self, result: ApiResult<serde_json::Value>) {
        self.delete_results.lock().unwrap().push_back(result);
    }

    fn set_history(&self, document_id: &str, messages: Vec<Message>) {
        self.histories
            .lock()
            .unwrap()
            .insert(document_id.to_string(), messages);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn persisted(&self, document_id: &str) -> Vec<Message> {
        self.histories
            .lock()
            .unwrap()
            .get(document_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentApi for MockApi {
    async fn upload_document(&self, filename: &str, _bytes: Vec<u8>) -> ApiResult<UploadReceipt> {
        self.record(format!("upload:{filename}"));
        let scripted = self.upload_results.lock().unwrap().pop_front();
        match scripted {
            Some(Ok(receipt)) => {
                // A successful upload creates the document server-side.
                let mut documents = self.documents.lock().unwrap();
                let id = receipt
                    .document_id
                    .clone()
                    .unwrap_or_else(|| format!("doc-{}", documents.len() + 1));
                documents.push(Document {
                    id,
                    name: filename.to_string(),
                });
                Ok(receipt)
            }
            Some(Err(e)) => Err(e),
            None => Ok(UploadReceipt::default()),
        }
    }

    async fn query(&self, text: &str, _document_id: Option<&str>) -> ApiResult<Answer> {
        self.record(format!("query:{text}"));
        self.query_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Answer::Text("ok".to_string())))
    }

    async fn list_documents(&self) -> ApiResult<Vec<Document>> {
        self.record("list");
        Ok(self.documents.lock().unwrap().clone())
    }

    async fn delete_document(&self, id: &str) -> ApiResult<serde_json::Value> {
        self.record(format!("delete:{id}"));
        if let Some(scripted) = self.delete_results.lock().unwrap().pop_front() {
            if scripted.is_ok() {
                self.documents.lock().unwrap().retain(|d| d.id != id);
            }
            return scripted;
        }

        let mut documents = self.documents.lock().unwrap();
        let existed = documents.iter().any(|d| d.id == id);
        if !existed {
            return Err(ApiError::NotFound(id.to_string()));
        }
        documents.retain(|d| d.id != id);
        Ok(json!({ "status": "deleted" }))
    }

    async fn chat_history(&self, document_id: &str) -> ApiResult<Vec<Message>> {
        self.record(format!("history:{document_id}"));
        Ok(self.persisted(document_id))
    }

    async fn post_message(&self, document_id: &str, message: &Message) -> ApiResult<()> {
        self.record(format!("post:{document_id}"));
        self.histories
            .lock()
            .unwrap()
            .entry(document_id.to_string())
            .or_default()
            .push(message.clone());
        Ok(())
    }
}

fn session(api: &Arc<MockApi>) -> (ChatSession, Arc<QueueSink>) {
    let sink = Arc::new(QueueSink::new());
    let session = ChatSession::new(api.clone(), sink.clone());
    (session, sink)
}

async fn ready_session(api: &Arc<MockApi>) -> (ChatSession, Arc<QueueSink>) {
    let (mut session, sink) = session(api);
    session.refresh_documents().await.unwrap();
    (session, sink)
}

fn kinds(messages: &[Message]) -> Vec<MessageKind> {
    messages.iter().map(|m| m.kind).collect()
}

fn status_error() -> ApiError {
    ApiError::Status {
        status: 500,
        message: "boom".to_string(),
    }
}

// ---- selection ----

#[tokio::test]
async fn select_document_installs_history() {
    let api = MockApi::with_documents(&[("1", "a.pdf")]);
    api.set_history("1", vec![Message::user("hi"), Message::assistant("hello")]);

    let (mut session, _) = ready_session(&api).await;
    session.select_document(Some("1")).await.unwrap();

    assert_eq!(session.selected_document_id(), Some("1"));
    assert_eq!(
        kinds(session.messages()),
        vec![MessageKind::User, MessageKind::Assistant]
    );
}

#[tokio::test]
async fn select_document_with_empty_history_yields_empty_log() {
    let api = MockApi::with_documents(&[("1", "a.pdf"), ("2", "b.pdf")]);
    let (mut session, _) = ready_session(&api).await;

    session.select_document(Some("1")).await.unwrap();
    assert!(session.messages().is_empty());
}

#[tokio::test]
async fn select_unknown_document_is_rejected() {
    let api = MockApi::with_documents(&[("1", "a.pdf")]);
    let (mut session, _) = ready_session(&api).await;

    let result = session.select_document(Some("nope")).await;
    assert!(matches!(result, Err(SessionError::UnknownDocument(_))));
    assert!(session.selected_document_id().is_none());
}

#[tokio::test]
async fn deselect_clears_log_and_input() {
    let api = MockApi::with_documents(&[("1", "a.pdf")]);
    api.set_history("1", vec![Message::user("hi")]);

    let (mut session, _) = ready_session(&api).await;
    session.select_document(Some("1")).await.unwrap();
    session.set_input("draft");

    session.select_document(None).await.unwrap();
    assert!(session.selected_document_id().is_none());
    assert!(session.messages().is_empty());
    assert!(session.query_input().is_empty());
}

#[tokio::test]
async fn stale_history_fetch_is_discarded() {
    let api = MockApi::with_documents(&[("1", "a.pdf"), ("2", "b.pdf")]);
    let (mut session, _) = ready_session(&api).await;

    // Two selections race; the first fetch completes last.
    let first = session.begin_select(Some("1")).unwrap().unwrap();
    let second = session.begin_select(Some("2")).unwrap().unwrap();

    let applied_second = session.apply_history(&second, vec![Message::assistant("for doc 2")]);
    let applied_first = session.apply_history(&first, vec![Message::assistant("for doc 1")]);

    assert!(applied_second);
    assert!(!applied_first);
    assert_eq!(session.selected_document_id(), Some("2"));
    assert_eq!(session.messages().len(), 1);
    assert_eq!(session.messages()[0].text, "for doc 2");
}

#[tokio::test]
async fn stale_fetch_completing_in_request_order_still_loses() {
    let api = MockApi::with_documents(&[("1", "a.pdf"), ("2", "b.pdf")]);
    let (mut session, _) = ready_session(&api).await;

    let first = session.begin_select(Some("1")).unwrap().unwrap();
    let second = session.begin_select(Some("2")).unwrap().unwrap();

    // Completions arrive in request order this time.
    assert!(!session.apply_history(&first, vec![Message::assistant("for doc 1")]));
    assert!(session.apply_history(&second, vec![Message::assistant("for doc 2")]));
    assert_eq!(session.messages()[0].text, "for doc 2");
}

#[tokio::test]
async fn history_replay_formats_assistant_messages() {
    let api = MockApi::with_documents(&[("1", "a.pdf")]);
    api.set_history(
        "1",
        vec![Message::user("q"), Message::assistant("<b>bold</b> answer")],
    );

    let (mut session, _) = ready_session(&api).await;
    session.select_document(Some("1")).await.unwrap();

    assert_eq!(session.messages()[1].text, "**bold** answer");
    // User messages are replayed verbatim.
    assert_eq!(session.messages()[0].text, "q");
}

#[tokio::test]
async fn select_default_picks_first_document() {
    let api = MockApi::with_documents(&[("1", "a.pdf"), ("2", "b.pdf")]);
    let (mut session, _) = ready_session(&api).await;

    session.select_default().await.unwrap();
    assert_eq!(session.selected_document_id(), Some("1"));

    // A second call does not move an existing selection.
    session.select_document(Some("2")).await.unwrap();
    session.select_default().await.unwrap();
    assert_eq!(session.selected_document_id(), Some("2"));
}

#[tokio::test]
async fn select_default_on_empty_registry_is_noop() {
    let api = MockApi::with_documents(&[]);
    let (mut session, _) = ready_session(&api).await;

    session.select_default().await.unwrap();
    assert!(session.selected_document_id().is_none());
    assert!(session.messages().is_empty());
}

// ---- queries ----

#[tokio::test]
async fn blank_query_is_noop() {
    let api = MockApi::with_documents(&[("1", "a.pdf")]);
    let (mut session, _) = ready_session(&api).await;
    session.select_document(Some("1")).await.unwrap();
    let calls_before = api.calls().len();

    session.send_query("").await.unwrap();
    session.send_query("   ").await.unwrap();

    assert!(session.messages().is_empty());
    assert_eq!(api.calls().len(), calls_before);
}

#[tokio::test]
async fn query_without_selection_is_noop() {
    let api = MockApi::with_documents(&[("1", "a.pdf")]);
    let (mut session, _) = ready_session(&api).await;
    let calls_before = api.calls().len();

    session.send_query("hello?").await.unwrap();

    assert!(session.messages().is_empty());
    assert_eq!(api.calls().len(), calls_before);
}

#[tokio::test]
async fn successful_query_appends_user_then_assistant() {
    let api = MockApi::with_documents(&[("1", "a.pdf")]);
    api.script_query(Ok(Answer::Text("the answer".to_string())));

    let (mut session, _) = ready_session(&api).await;
    session.select_document(Some("1")).await.unwrap();
    session.send_query("what is it?").await.unwrap();

    assert_eq!(
        kinds(session.messages()),
        vec![MessageKind::User, MessageKind::Assistant]
    );
    assert_eq!(session.messages()[0].text, "what is it?");
    assert_eq!(session.messages()[1].text, "the answer");
    assert!(!session.is_querying());

    // Both messages were persisted to the remote store.
    let persisted = api.persisted("1");
    assert_eq!(
        kinds(&persisted),
        vec![MessageKind::User, MessageKind::Assistant]
    );
}

#[tokio::test]
async fn failed_query_appends_local_error_after_user() {
    let api = MockApi::with_documents(&[("1", "a.pdf")]);
    api.script_query(Err(status_error()));

    let (mut session, _) = ready_session(&api).await;
    session.select_document(Some("1")).await.unwrap();
    session.send_query("what is it?").await.unwrap();

    assert_eq!(
        kinds(session.messages()),
        vec![MessageKind::User, MessageKind::Error]
    );
    assert_eq!(session.messages()[0].text, "what is it?");
    assert!(session.messages()[1].text.starts_with("Error:"));
    assert!(!session.is_querying());

    // Only the user message reached the store; errors are local.
    assert_eq!(kinds(&api.persisted("1")), vec![MessageKind::User]);
}

#[tokio::test]
async fn second_query_while_in_flight_is_noop() {
    let api = MockApi::with_documents(&[("1", "a.pdf")]);
    let (mut session, _) = ready_session(&api).await;
    session.select_document(Some("1")).await.unwrap();

    let ticket = session.begin_query("first").expect("query should start");
    assert!(session.is_querying());

    // Re-entrant call while the first query is pending.
    assert!(session.begin_query("second").is_none());
    session.send_query("third").await.unwrap();
    assert_eq!(session.messages().len(), 1, "only the first user message");

    session.finish_query(&ticket, Ok(Answer::Text("done".to_string())));
    assert!(!session.is_querying());
    assert_eq!(session.messages().len(), 2);
}

#[tokio::test]
async fn query_result_for_deselected_document_is_dropped() {
    let api = MockApi::with_documents(&[("1", "a.pdf"), ("2", "b.pdf")]);
    let (mut session, _) = ready_session(&api).await;
    session.select_document(Some("1")).await.unwrap();

    let ticket = session.begin_query("pending").expect("query should start");
    session.select_document(Some("2")).await.unwrap();

    let appended = session.finish_query(&ticket, Ok(Answer::Text("late".to_string())));
    assert!(appended.is_none());
    assert!(session.messages().is_empty());
    assert!(!session.is_querying());
}

#[tokio::test]
async fn structured_answer_is_rendered_as_json_text() {
    let api = MockApi::with_documents(&[("1", "a.pdf")]);
    api.script_query(Ok(Answer::Structured(json!({ "score": 1 }))));

    let (mut session, _) = ready_session(&api).await;
    session.select_document(Some("1")).await.unwrap();
    session.send_query("q").await.unwrap();

    assert_eq!(session.messages()[1].kind, MessageKind::Assistant);
    assert!(session.messages()[1].text.contains("score"));
}

// ---- upload ----

#[tokio::test]
async fn upload_selects_document_id_from_receipt() {
    let api = MockApi::with_documents(&[("1", "a.pdf")]);
    api.script_upload(Ok(UploadReceipt {
        status: Some("ok".to_string()),
        document_id: Some("fresh".to_string()),
        ..Default::default()
    }));

    let (mut session, sink) = ready_session(&api).await;
    session.upload_document("notes.md", b"# notes".to_vec()).await.unwrap();

    assert_eq!(session.selected_document_id(), Some("fresh"));
    assert!(session.messages().is_empty());
    assert!(!session.is_uploading());

    let notices = sink.drain();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Info);
    assert!(notices[0].text.contains("notes.md"));
}

#[tokio::test]
async fn upload_without_receipt_id_selects_last_listed_document() {
    let api = MockApi::with_documents(&[("1", "a.pdf")]);
    api.script_upload(Ok(UploadReceipt {
        status: Some("ok".to_string()),
        ..Default::default()
    }));

    let (mut session, _) = ready_session(&api).await;
    session.upload_document("notes.md", b"# notes".to_vec()).await.unwrap();

    // The mock appends the new document, so positional fallback finds it.
    assert_eq!(session.selected_document_id(), Some("doc-2"));
    assert_eq!(session.documents().len(), 2);
}

#[tokio::test]
async fn upload_with_unsupported_extension_is_rejected_locally() {
    let api = MockApi::with_documents(&[("1", "a.pdf")]);
    let (mut session, _) = ready_session(&api).await;
    let calls_before = api.calls().len();

    let result = session.upload_document("image.png", vec![1, 2, 3]).await;
    assert!(matches!(result, Err(SessionError::UnsupportedFileType(_))));
    assert_eq!(api.calls().len(), calls_before, "no network call made");
}

#[tokio::test]
async fn upload_while_uploading_is_ignored() {
    let api = MockApi::with_documents(&[("1", "a.pdf")]);
    let (mut session, _) = ready_session(&api).await;
    let calls_before = api.calls().len();

    assert!(session.begin_upload("first.md").unwrap());
    assert!(session.is_uploading());

    // Second upload while the first is in flight: ignored, no API call.
    session.upload_document("second.md", b"x".to_vec()).await.unwrap();
    assert_eq!(api.calls().len(), calls_before);
}

#[tokio::test]
async fn failed_upload_leaves_session_untouched() {
    let api = MockApi::with_documents(&[("1", "a.pdf")]);
    api.set_history("1", vec![Message::user("kept")]);
    api.script_upload(Err(status_error()));

    let (mut session, sink) = ready_session(&api).await;
    session.select_document(Some("1")).await.unwrap();
    session.upload_document("notes.md", b"x".to_vec()).await.unwrap();

    assert_eq!(session.selected_document_id(), Some("1"));
    assert_eq!(session.messages().len(), 1);
    assert!(!session.is_uploading());

    let notices = sink.drain();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

// ---- delete ----

#[tokio::test]
async fn deleting_selected_document_reselects_first_remaining() {
    let api = MockApi::with_documents(&[("1", "a.pdf"), ("2", "b.pdf")]);
    api.set_history("2", vec![Message::user("old q")]);

    let (mut session, _) = ready_session(&api).await;
    session.select_document(Some("1")).await.unwrap();
    session.delete_document("1").await.unwrap();

    assert_eq!(session.selected_document_id(), Some("2"));
    // The log was freshly loaded for the new selection.
    assert_eq!(session.messages().len(), 1);
    assert!(!session.is_deleting("1"));
}

#[tokio::test]
async fn deleting_last_document_clears_selection_and_log() {
    let api = MockApi::with_documents(&[("1", "a.pdf")]);
    api.set_history("1", vec![Message::user("hi")]);

    let (mut session, _) = ready_session(&api).await;
    session.select_document(Some("1")).await.unwrap();
    session.delete_document("1").await.unwrap();

    assert!(session.selected_document_id().is_none());
    assert!(session.messages().is_empty());
    assert!(session.documents().is_empty());
}

#[tokio::test]
async fn deleting_unselected_document_keeps_selection() {
    let api = MockApi::with_documents(&[("1", "a.pdf"), ("2", "b.pdf")]);
    let (mut session, _) = ready_session(&api).await;
    session.select_document(Some("1")).await.unwrap();

    session.delete_document("2").await.unwrap();
    assert_eq!(session.selected_document_id(), Some("1"));
    assert_eq!(session.documents().len(), 1);
}

#[tokio::test]
async fn delete_not_found_is_success_equivalent() {
    let api = MockApi::with_documents(&[("1", "a.pdf"), ("2", "b.pdf")]);
    let (mut session, sink) = ready_session(&api).await;
    session.select_document(Some("1")).await.unwrap();

    // The server already lost the document; the mock replies 404.
    api.documents.lock().unwrap().retain(|d| d.id != "1");
    session.delete_document("1").await.unwrap();

    // Still refreshed and reselected, exactly like a successful delete.
    assert_eq!(session.selected_document_id(), Some("2"));
    assert_eq!(sink.drain()[0].level, NoticeLevel::Info);
}

#[tokio::test]
async fn failed_delete_leaves_state_unchanged() {
    let api = MockApi::with_documents(&[("1", "a.pdf"), ("2", "b.pdf")]);
    api.script_delete(Err(status_error()));

    let (mut session, sink) = ready_session(&api).await;
    session.select_document(Some("1")).await.unwrap();
    session.delete_document("1").await.unwrap();

    assert_eq!(session.selected_document_id(), Some("1"));
    assert_eq!(session.documents().len(), 2);
    assert_eq!(sink.drain()[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn delete_unknown_document_is_rejected() {
    let api = MockApi::with_documents(&[("1", "a.pdf")]);
    let (mut session, _) = ready_session(&api).await;

    let result = session.delete_document("ghost").await;
    assert!(matches!(result, Err(SessionError::UnknownDocument(_))));
}

// ---- clear chat & input ----

#[tokio::test]
async fn clear_chat_clears_log_and_input_locally() {
    let api = MockApi::with_documents(&[("1", "a.pdf")]);
    api.set_history("1", vec![Message::user("hi"), Message::assistant("yo")]);

    let (mut session, _) = ready_session(&api).await;
    session.select_document(Some("1")).await.unwrap();
    session.set_input("draft");
    let calls_before = api.calls().len();

    session.clear_chat();
    assert!(session.messages().is_empty());
    assert!(session.query_input().is_empty());
    // Local-only: no network call, server history untouched.
    assert_eq!(api.calls().len(), calls_before);
    assert_eq!(api.persisted("1").len(), 2);
}

#[tokio::test]
async fn input_editing_roundtrip() {
    let api = MockApi::with_documents(&[]);
    let (mut session, _) = session(&api);

    session.push_input('h');
    session.push_input('i');
    assert_eq!(session.query_input(), "hi");
    session.pop_input();
    assert_eq!(session.query_input(), "h");
    assert_eq!(session.take_input(), "h");
    assert!(session.query_input().is_empty());
}

// ---- registry reconciliation ----

#[tokio::test]
async fn refresh_drops_vanished_selection() {
    let api = MockApi::with_documents(&[("1", "a.pdf"), ("2", "b.pdf")]);
    let (mut session, _) = ready_session(&api).await;
    session.select_document(Some("2")).await.unwrap();

    // Another client deleted document 2 behind our back.
    api.documents.lock().unwrap().retain(|d| d.id != "2");
    session.refresh_documents().await.unwrap();

    assert_eq!(session.selected_document_id(), Some("1"));
}

// ---- end-to-end scenario ----

#[tokio::test]
async fn scenario_select_query_and_format() {
    let api = MockApi::with_documents(&[("1", "a.pdf"), ("2", "b.pdf")]);
    api.script_query(Ok(Answer::from_value(json!({ "text": "<b>Hello</b>" }))));

    let (mut session, _) = ready_session(&api).await;

    session.select_document(Some("1")).await.unwrap();
    assert!(session.messages().is_empty());

    session.send_query("hi").await.unwrap();
    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].kind, MessageKind::User);
    assert_eq!(messages[0].text, "hi");
    assert_eq!(messages[1].kind, MessageKind::Assistant);
    assert_eq!(messages[1].text, "**Hello**");
}

// ---- notices ----

#[tokio::test]
async fn notices_flow_through_injected_sink() {
    let api = MockApi::with_documents(&[("1", "a.pdf")]);
    api.script_upload(Err(status_error()));

    let (mut session, sink) = ready_session(&api).await;
    session.upload_document("x.md", b"x".to_vec()).await.unwrap();
    session.delete_document("1").await.unwrap();

    let notices: Vec<Notice> = sink.drain();
    assert_eq!(notices.len(), 2);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[1].level, NoticeLevel::Info);
}
