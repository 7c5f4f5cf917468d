//! Character sheet command-line editor.
//!
//! Loads rule templates from a data directory, then creates, shows and edits
//! character documents.
//!
//! # Examples
//!
//! ```bash
//! charsheet new --species Vampire --out lestat.chr
//! charsheet set lestat.chr --type attribute --category Mental --name Wits --value 3
//! charsheet show lestat.chr
//! charsheet check lestat.chr --failing
//! ```

mod commands;
mod config;
mod dirs;
mod logging;
mod workspace;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use commands::{Check, New, Set, Show};

use crate::config::ClientConfig;
use crate::workspace::Workspace;

/// Character sheet editor
#[derive(Parser)]
#[command(name = "charsheet")]
#[command(about = "Create and edit character sheets", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory with config.toml and templates/ (overrides CHARSHEET_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Default log level (overrides CHARSHEET_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Create a new character
    New(New),

    /// Print a character sheet
    Show(Show),

    /// Change a trait rating
    Set(Set),

    /// Check trait prerequisites
    Check(Check),
}

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()
        .with_data_dir(cli.data_dir)
        .with_log_level(cli.log_level);
    let _guard = logging::setup_logging(&config)?;

    tracing::info!(data_dir = %config.data_dir.display(), "loading content");
    let workspace = Workspace::load(&config.data_dir)?;

    match cli.command {
        Command::New(cmd) => cmd.execute(&workspace),
        Command::Show(cmd) => cmd.execute(&workspace),
        Command::Set(cmd) => cmd.execute(&workspace),
        Command::Check(cmd) => cmd.execute(&workspace),
    }
}
