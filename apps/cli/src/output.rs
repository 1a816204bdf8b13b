//! Output formatting for the CLI.

#![allow(dead_code)]

use chat_session::MessageKind;
use chrono::{DateTime, Local, Utc};
use clap::ValueEnum;
use serde::Serialize;

/// Output format.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print output in the specified format.
pub fn print<T: Serialize + std::fmt::Display>(value: &T, format: &OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(value) {
                println!("{}", json);
            } else {
                println!("{}", value);
            }
        }
    }
}

/// Print a success message.
pub fn print_success(message: &str, format: &OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", message),
        OutputFormat::Json => {
            let body = serde_json::json!({ "status": "success", "message": message });
            println!("{}", body);
        }
    }
}

/// Print an error message.
pub fn print_error(message: &str, format: &OutputFormat) {
    match format {
        OutputFormat::Text => eprintln!("Error: {}", message),
        OutputFormat::Json => {
            let body = serde_json::json!({ "status": "error", "message": message });
            eprintln!("{}", body);
        }
    }
}

/// Print a table row.
pub fn print_row(label: &str, value: &str) {
    println!("  {:<16} {}", format!("{}:", label), value);
}

/// Print a divider line.
pub fn print_divider() {
    println!("{}", "-".repeat(50));
}

/// Uppercase label for a message kind, for `[USER]`-style prefixes.
pub fn kind_label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::User => "USER",
        MessageKind::Assistant => "ASSISTANT",
        MessageKind::System => "SYSTEM",
        MessageKind::Error => "ERROR",
    }
}

/// Short local-time display for message timestamps.
pub fn format_time(timestamp: &DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(kind_label(MessageKind::User), "USER");
        assert_eq!(kind_label(MessageKind::Error), "ERROR");
    }

    #[test]
    fn test_format_time_is_hh_mm() {
        let time = format_time(&Utc::now());
        assert_eq!(time.len(), 5);
        assert_eq!(time.as_bytes()[2], b':');
    }
}
