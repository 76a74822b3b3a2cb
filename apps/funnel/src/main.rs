//! # Funnel
//!
//! The main binary for the two-step quiz funnel.
//!
//! This application provides:
//! - Redirect URL calculation for a landing page URL
//! - Simulated visits against an in-memory quiz page
//! - Configuration inspection
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    apps/funnel (THE BINARY)                  │
//! │                                                              │
//! │  ┌─────────────┐    ┌──────────────┐    ┌────────────────┐  │
//! │  │    CLI      │    │ Async Runner │    │ Tracking Sinks │  │
//! │  │   (clap)    │    │   (tokio)    │    │ (tracing/json) │  │
//! │  └──────┬──────┘    └──────┬───────┘    └───────┬────────┘  │
//! │         └──────────────────┼────────────────────┘           │
//! │                            ▼                                │
//! │                    ┌───────────────┐                        │
//! │                    │  funnel-core  │                        │
//! │                    │  (THE LOGIC)  │                        │
//! │                    └───────────────┘                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Where would this visitor be sent?
//! funnel redirect --url "https://site/?utm_source=fb&gclid=123"
//!
//! # Walk through the quiz
//! funnel simulate -u "https://site/?utm_source=fb" -a step1=gold -a step2=travel
//!
//! # Show configuration
//! funnel --config funnel.toml config
//! ```

use clap::Parser;
use funnel::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Initialize tracing. FUNNEL_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("FUNNEL_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let default_filter = if cli.verbose { "funnel=debug" } else { "funnel=info" };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so stdout stays clean for URLs and JSON output.
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

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    eprintln!(
        r#"
  ┌─┐┬ ┬┌┐┌┌┐┌┌─┐┬
  ├┤ │ ││││││├┤ │
  └  └─┘┘└┘┘└┘└─┘┴─┘

  Quiz Funnel v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
