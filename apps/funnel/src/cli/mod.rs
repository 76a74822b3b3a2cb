//! # Funnel CLI Module
//!
//! This module implements the CLI interface for the funnel.
//!
//! ## Available Commands
//!
//! - `redirect` - Compute the redirect URL for a landing page URL
//! - `simulate` - Run a visit against an in-memory page
//! - `config` - Show the effective configuration

mod commands;

use crate::tracking::AnalyticsMode;
use clap::{Parser, Subcommand};
use funnel_core::{ElementRef, FunnelError, QuizStep};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Funnel - two-step quiz with attribution-preserving redirect
#[derive(Parser, Debug)]
#[command(name = "funnel")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the destination URL
    #[arg(short, long, global = true)]
    pub destination: Option<String>,

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
    /// Compute the redirect URL for a landing page URL
    Redirect {
        /// Full landing page URL, including its query string
        #[arg(short, long)]
        url: String,
    },

    /// Run a visit through the quiz against an in-memory page
    Simulate {
        /// Landing page URL the visitor arrived on
        #[arg(short, long)]
        url: String,

        /// Answers in order, as step=answer (e.g. step1=gold)
        #[arg(short, long = "answer", value_parser = parse_answer)]
        answers: Vec<(QuizStep, String)>,

        /// Remove an element from the page (step1, step2, progressBar,
        /// currentStep, preloader, progress-container)
        #[arg(short, long = "without", value_parser = parse_element)]
        without: Vec<ElementRef>,

        /// Where tracking events go
        #[arg(long, value_enum, default_value_t = AnalyticsMode::Log)]
        analytics: AnalyticsMode,

        /// Use a simulated clock instead of waiting in real time
        #[arg(short, long)]
        instant: bool,
    },

    /// Show the effective configuration
    Config,
}

/// Parse `step=answer`.
pub fn parse_answer(raw: &str) -> Result<(QuizStep, String), FunnelError> {
    let (step, answer) = raw
        .split_once('=')
        .ok_or_else(|| FunnelError::UnknownStep(format!("expected step=answer, got '{}'", raw)))?;
    Ok((step.trim().parse()?, answer.trim().to_string()))
}

fn parse_element(raw: &str) -> Result<ElementRef, FunnelError> {
    raw.parse()
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), FunnelError> {
    let config = crate::config::load_config(cli.config.as_deref(), cli.destination.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Redirect { url }) => cmd_redirect(&config, &url, json_mode),
        Some(Commands::Simulate {
            url,
            answers,
            without,
            analytics,
            instant,
        }) => {
            let options = SimulateOptions {
                url,
                answers,
                without,
                analytics,
                instant,
            };
            cmd_simulate(config, options, json_mode).await
        }
        Some(Commands::Config) | None => cmd_config(&config, json_mode),
    }
}

// =============================================================================
// TESTS
// =============================================================================
