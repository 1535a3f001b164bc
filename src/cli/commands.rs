//! CLI commands

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Temporal-Store CLI
#[derive(Parser, Debug)]
#[command(name = "temporal-store")]
#[command(about = "In-memory multi-version key/field store with time travel")]
pub struct Cli {
    /// Configuration file (.toml or .json)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (overrides the config file)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a command script against a fresh store
    Run {
        /// Script file, one command per line
        script: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Read commands from stdin and execute them as they arrive
    Repl {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Parse a script without executing it
    Check {
        /// Script file, one command per line
        script: PathBuf,
    },
}

/// How command results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One human-readable line per command
    Text,
    /// One JSON object per command
    Json,
}
