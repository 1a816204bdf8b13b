//! docchat - terminal client for a document-question-answering service.

mod commands;
mod config;
mod output;
mod tui;

use clap::{Parser, Subcommand};
use tracing::debug;

/// docchat - chat with your documents through a remote retrieval service.
#[derive(Parser)]
#[command(name = "docchat")]
#[command(about = "Upload documents and ask questions about them")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Use terminal-adaptive colors instead of the docchat theme (TUI only)
    #[arg(long)]
    terminal_colors: bool,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Base URL of the remote service (overrides config and DOCCHAT_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage documents
    Docs {
        #[command(subcommand)]
        command: DocCommands,
    },

    /// Ask a one-shot question against a document
    Ask {
        /// The question to ask
        query: String,
        /// Document ID (defaults to the first listed document)
        #[arg(short, long)]
        document: Option<String>,
    },

    /// Show the persisted chat thread for a document
    History {
        /// Document ID
        document: String,
    },

    /// Show the resolved configuration
    Config,
}

#[derive(Subcommand)]
enum DocCommands {
    /// List documents
    List,
    /// Upload a document (.pdf or .md)
    Upload {
        /// Path to the file
        path: String,
    },
    /// Delete a document
    Delete {
        /// Document ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// Resolve configuration: file, then environment, then flags.
fn load_config(cli: &Cli) -> anyhow::Result<config::Config> {
    let paths = config::Paths::new()?;
    paths.ensure_dirs()?;
    let mut config = config::Config::load(&paths)?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // One-shot commands log to stderr; the TUI must keep the terminal
    // clean, so it appends to the log file instead.
    let launching_tui = cli.command.is_none();
    observability::init_with_config(observability::LogConfig {
        service_name: "cli".into(),
        default_level: cli.log_level.clone(),
        also_stderr: !launching_tui,
        ..Default::default()
    });

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    debug!(base_url = %config.base_url, "configuration resolved");

    let result = if let Some(command) = cli.command {
        match command {
            Commands::Docs { command } => match command {
                DocCommands::List => commands::docs_list(&config, &cli.format).await,
                DocCommands::Upload { path } => {
                    commands::docs_upload(&path, &config, &cli.format).await
                }
                DocCommands::Delete { id, yes } => {
                    commands::docs_delete(&id, yes, &config, &cli.format).await
                }
            },
            Commands::Ask { query, document } => {
                commands::ask(&query, document.as_deref(), &config, &cli.format).await
            }
            Commands::History { document } => {
                commands::history(&document, &config, &cli.format).await
            }
            Commands::Config => commands::config_show(&config, &cli.format),
        }
    } else {
        let theme_mode = if cli.terminal_colors {
            tui::ThemeMode::Terminal
        } else {
            tui::ThemeMode::Docchat
        };
        tui::run(theme_mode, &config).await
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
