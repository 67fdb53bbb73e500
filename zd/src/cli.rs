//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config::LlmConfig;
use crate::domain::{Filter, Priority};

/// ZenDo - a calm task list with AI task breakdown
#[derive(Parser)]
#[command(
    name = "zd",
    about = "Task list with priorities, filters and AI-assisted task breakdown",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Task file to use instead of the configured one
    #[arg(long = "data-file", global = true, value_name = "PATH")]
    pub data_file: Option<PathBuf>,

    /// Keep tasks in memory only; nothing is read or written
    #[arg(long, global = true, conflicts_with = "data_file")]
    pub ephemeral: bool,

    /// Subcommand to execute (opens the TUI when omitted)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a task
    Add {
        /// Task text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Priority (low, medium, high)
        #[arg(short, long)]
        priority: Option<Priority>,
    },

    /// List tasks, newest first
    List {
        /// Which tasks to show (all, active, completed)
        #[arg(short, long, default_value = "all")]
        filter: Filter,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Toggle a task between active and completed
    Toggle {
        /// Task ID (or unique prefix)
        id: String,
    },

    /// Delete a task
    Delete {
        /// Task ID (or unique prefix)
        id: String,
    },

    /// Remove every completed task
    ClearCompleted,

    /// Show totals and progress
    Stats {
        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Ask the AI to break a task into subtasks
    Decompose {
        /// Task text to break down
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Add the suggestions as tasks instead of just printing them
        #[arg(long)]
        add: bool,

        /// Priority for added suggestions
        #[arg(short, long)]
        priority: Option<Priority>,
    },

    /// Print the effective configuration
    Config,
}

/// Output format for list/stats commands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("zendo")
        .join("logs")
        .join("zendo.log")
}

/// Generate the after_help text with AI key status and the log path
pub fn generate_after_help(llm: &LlmConfig) -> String {
    debug!("generate_after_help: called");
    let resolved = llm.resolve();
    let (icon, state) = match resolved.get_api_key() {
        Ok(_) => ("\u{2705}", "key found"),
        Err(_) => ("\u{274C}", "key missing"),
    };

    let mut help = String::new();
    help.push_str("AI breakdown:\n");
    help.push_str(&format!(
        "  {} {} {} (${})\n",
        icon, resolved.provider, state, resolved.api_key_env
    ));
    help.push('\n');
    help.push_str(&format!("Logs are written to: {}", get_log_path().display()));
    help
}
