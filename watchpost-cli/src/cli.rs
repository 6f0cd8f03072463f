//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Watchpost -- audit log triage with LLM-assisted alerting.
///
/// Use `watchpost <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "watchpost", version, about, long_about = None)]
pub struct Cli {
    /// Path to the watchpost.toml configuration file.
    #[arg(short, long, default_value = "watchpost.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a single triage pass over the audit log.
    Run(RunArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- run ----

/// Run one fetch / classify / escalate / notify cycle.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Skip LLM enrichment for this run (alerts carry raw descriptions).
    #[arg(long)]
    pub no_escalation: bool,

    /// Override the maximum number of concurrent enrichment requests.
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    /// Cancel the run after this many seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

// ---- config ----

/// Manage watchpost configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, source, triage, escalation, alert).
        #[arg(long)]
        section: Option<String>,
    },
}
