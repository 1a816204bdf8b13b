//! Document management commands.

use super::{build_client, confirm};
use crate::config::Config;
use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use chat_session::has_supported_extension;
use rag_api::ApiError;
use std::path::Path;

/// List documents known to the remote service.
pub async fn docs_list(config: &Config, format: &OutputFormat) -> Result<()> {
    let client = build_client(config)?;
    let documents = client.list_documents().await?;

    match format {
        OutputFormat::Text => {
            if documents.is_empty() {
                println!("No documents found");
            } else {
                println!("{:<36} {}", "ID", "Name");
                println!("{}", "-".repeat(70));
                for document in &documents {
                    println!("{:<36} {}", document.id, document.name);
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&documents)?);
        }
    }

    Ok(())
}

/// Upload a document file.
pub async fn docs_upload(path: &str, config: &Config, format: &OutputFormat) -> Result<()> {
    let path = Path::new(path);
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("invalid file path: {}", path.display()))?;

    // Local validation before any network call.
    if !has_supported_extension(filename) {
        output::print_error(
            &format!("unsupported file type: {filename} (expected .pdf or .md)"),
            format,
        );
        return Ok(());
    }

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    let client = build_client(config)?;
    let receipt = client.upload_document(filename, bytes).await?;

    match format {
        OutputFormat::Text => {
            let detail = receipt
                .message
                .as_deref()
                .or(receipt.status.as_deref())
                .unwrap_or("ok");
            println!("Uploaded {filename}: {detail}");
            if let Some(id) = &receipt.document_id {
                output::print_row("Document ID", id);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
    }

    Ok(())
}

/// Delete a document by id, with a confirmation gate.
pub async fn docs_delete(
    id: &str,
    yes: bool,
    config: &Config,
    format: &OutputFormat,
) -> Result<()> {
    if !yes
        && !confirm(&format!(
            "Delete document {id}? This cannot be undone."
        ))
    {
        println!("Aborted");
        return Ok(());
    }

    let client = build_client(config)?;
    match client.delete_document(id).await {
        Ok(_) => {
            output::print_success(&format!("Document {id} deleted"), format);
        }
        // Already gone server-side; from the user's point of view the
        // delete succeeded.
        Err(ApiError::NotFound(_)) => {
            output::print_success(&format!("Document {id} was already deleted"), format);
        }
        Err(e) => {
            output::print_error(&e.to_string(), format);
        }
    }

    Ok(())
}
