//! One-shot chat commands.

use super::{build_client, PrintSink};
use crate::config::Config;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use chat_session::{ChatSession, MessageKind};
use std::sync::Arc;

/// Ask a question against a document and print the answer.
///
/// Runs through the session controller rather than calling the query
/// endpoint directly, so the user and assistant messages are persisted to
/// the remote history exactly like an interactive session.
pub async fn ask(
    query: &str,
    document: Option<&str>,
    config: &Config,
    format: &OutputFormat,
) -> Result<()> {
    let client = build_client(config)?;
    let sink = Arc::new(PrintSink { format: *format });
    let mut session = ChatSession::new(Arc::new(client), sink);

    session.refresh_documents().await?;
    match document {
        Some(id) => session.select_document(Some(id)).await?,
        None => session.select_default().await?,
    }

    let Some(selected) = session.selected_document() else {
        output::print_error("no documents available - upload one first", format);
        return Ok(());
    };
    let document_name = selected.name.clone();
    let document_id = selected.id.clone();

    session.send_query(query).await?;

    let Some(reply) = session
        .messages()
        .iter()
        .rev()
        .find(|m| matches!(m.kind, MessageKind::Assistant | MessageKind::Error))
    else {
        output::print_error("no answer received", format);
        return Ok(());
    };

    match format {
        OutputFormat::Text => {
            if reply.kind == MessageKind::Error {
                output::print_error(&reply.text, format);
            } else {
                println!("[{}]", document_name);
                println!("{}", reply.text);
            }
        }
        OutputFormat::Json => {
            let body = serde_json::json!({
                "document": document_id,
                "query": query,
                "kind": if reply.kind == MessageKind::Error { "error" } else { "answer" },
                "text": reply.text,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}

/// Print the persisted chat thread for a document.
pub async fn history(document: &str, config: &Config, format: &OutputFormat) -> Result<()> {
    let client = build_client(config)?;
    let messages = client.chat_history(document).await?;

    match format {
        OutputFormat::Text => {
            if messages.is_empty() {
                println!("No messages found");
            } else {
                println!("Messages for document {}:", document);
                println!("{}", "-".repeat(80));
                for message in &messages {
                    println!(
                        "[{}] {} ({})",
                        output::kind_label(message.kind),
                        message.text,
                        output::format_time(&message.timestamp)
                    );
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&messages)?);
        }
    }

    Ok(())
}
