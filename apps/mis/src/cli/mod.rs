//! # MIS CLI Module
//!
//! This module implements the CLI interface for the MIS engine.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `grade` - Grade a single score
//! - `promote` - Promotion status from an average and failed-subject count
//! - `evaluate` - Grade a term assessment read from a JSON file
//! - `class-report` - Summarize a class read from a JSON file
//! - `calendar` - Academic year and term for a date
//! - `scale` - Print the grading scale
//! - `policy` - Print the active promotion thresholds

mod commands;

use crate::config::AppConfig;
use clap::{Parser, Subcommand};
use mis_core::MisError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// School MIS - Assessment Evaluation Engine
///
/// Grades scores, decides promotion and summarizes classes.
#[derive(Parser, Debug)]
#[command(name = "mis")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file (falls back to MIS_CONFIG)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides configuration)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Grade a single score
    Grade {
        /// Score between 0 and 100, up to two decimals
        #[arg(allow_negative_numbers = true)]
        score: String,
    },

    /// Promotion status from an average and failed-subject count
    Promote {
        /// Term average between 0 and 100
        #[arg(short, long, allow_negative_numbers = true)]
        average: String,

        /// Number of failed subjects
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        failed: i64,
    },

    /// Grade a term assessment read from a JSON file
    Evaluate {
        /// Path to the assessment JSON
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Summarize a class read from a JSON file
    ClassReport {
        /// Path to the class JSON
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Academic year and term for a date
    Calendar {
        /// Date as YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Print the grading scale
    Scale,

    /// Print the active promotion thresholds
    Policy,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), MisError> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let json_mode = cli.json_mode;

    if cli.verbose {
        tracing::info!(
            "Configuration: server {}, rate limit {}",
            config.server.bind_addr(),
            config.security.rate_limit
        );
    }

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(config, host, port).await,
        Some(Commands::Grade { score }) => cmd_grade(json_mode, &score),
        Some(Commands::Promote { average, failed }) => {
            cmd_promote(&config, json_mode, &average, failed)
        }
        Some(Commands::Evaluate { file }) => cmd_evaluate(&config, json_mode, &file),
        Some(Commands::ClassReport { file }) => cmd_class_report(&config, json_mode, &file),
        Some(Commands::Calendar { date }) => cmd_calendar(json_mode, date),
        Some(Commands::Scale) | None => cmd_scale(json_mode),
        Some(Commands::Policy) => cmd_policy(&config, json_mode),
    }
}

// =============================================================================
// TESTS
// =============================================================================
