//! CLI command implementations.

mod chat;
mod documents;

pub use chat::{ask, history};
pub use documents::{docs_delete, docs_list, docs_upload};

use crate::config::Config;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use chat_session::{Notice, NoticeLevel, NotificationSink};
use rag_api::RagClient;

/// Build the remote service client from the resolved configuration.
pub fn build_client(config: &Config) -> Result<RagClient> {
    let base_url = config.base_url()?;
    Ok(RagClient::new(base_url))
}

/// Ask user for confirmation.
pub fn confirm(prompt: &str) -> bool {
    use std::io::{self, Write};

    print!("{} [y/N] ", prompt);
    io::stdout().flush().ok();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }

    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Notification sink that prints straight to the terminal, for one-shot
/// commands that run without the TUI status bar.
pub struct PrintSink {
    pub format: OutputFormat,
}

impl NotificationSink for PrintSink {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => output::print_success(&notice.text, &self.format),
            NoticeLevel::Warning | NoticeLevel::Error => {
                output::print_error(&notice.text, &self.format)
            }
        }
    }
}

/// Show the resolved configuration.
pub fn config_show(config: &Config, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("Configuration");
            output::print_divider();
            output::print_row("Base URL", &config.base_url);
            output::print_row("Log level", &config.log_level);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
    }
    Ok(())
}
