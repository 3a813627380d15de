//! # School MIS - Assessment Evaluation Server
//!
//! The main binary for the school MIS assessment engine.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for grading, promotion and class reports
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 apps/mis                    │
//! │                                             │
//! │   ┌─────────────┐      ┌─────────────┐      │
//! │   │    CLI      │      │  HTTP API   │      │
//! │   │   (clap)    │      │   (axum)    │      │
//! │   └──────┬──────┘      └──────┬──────┘      │
//! │          └──────────┬─────────┘             │
//! │                     ▼                       │
//! │             ┌───────────────┐               │
//! │             │   mis-core    │               │
//! │             │  (THE RULES)  │               │
//! │             └───────────────┘               │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! mis server --host 0.0.0.0 --port 5000
//!
//! # CLI operations
//! mis grade 79.5
//! mis promote --average 47 --failed 3
//! mis evaluate -f assessment.json
//! mis class-report -f class.json --json-mode
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // MIS_LOG_FORMAT=json switches to machine-parseable output.
    let log_format = std::env::var("MIS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mis=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = mis::cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = mis::cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  School MIS - Assessment Evaluation Engine v{}
  Grades . Promotion . Class reports
"#,
        env!("CARGO_PKG_VERSION")
    );
}
