//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Arguments for running the HTTP server.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Interface to listen on (overrides configuration)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides configuration)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Feedback storage directory (overrides configuration)
    #[arg(long, value_name = "DIR")]
    pub feedback_dir: Option<PathBuf>,
}

/// Read-only views over stored feedback.
#[derive(Debug, Subcommand)]
pub enum FeedbackCommand {
    /// List every stored record
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show totals per type and the latest submissions
    Stats {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Summarize one day of feedback
    Summary {
        /// Day to summarize, YYYY-MM-DD (defaults to today, UTC)
        #[arg(short, long)]
        date: Option<String>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
