//! # leadq CLI entry point
//!
//! Parses command-line arguments, loads configuration, installs logging
//! and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use leadq_cli::config::AppConfig;
use leadq_cli::logging::{self, LogFormat};
use leadq_cli::run::{run_session, RunArgs};
use leadq_cli::score::{run_score, ScoreArgs};
use leadq_cli::send::{run_send, SendArgs};
use leadq_cli::variants::{run_variants, VariantsArgs};

/// Lead qualification toolkit.
///
/// Scores questionnaire answers, delivers qualification snapshots to
/// webhook endpoints and drives headless wizard sessions.
#[derive(Parser, Debug)]
#[command(name = "leadq", version, about, long_about = None)]
struct Cli {
    /// Raise the log level. Repeat for more (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log line format; overrides LEADQ_LOG_FORMAT.
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List or show questionnaire variants.
    Variants(VariantsArgs),

    /// Score an answer set and print the qualification result.
    Score(ScoreArgs),

    /// Deliver a JSON payload to a webhook stage endpoint.
    Send(SendArgs),

    /// Run a scripted wizard session.
    Run(RunArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::from(2);
        }
    };
    if let Some(format) = cli.log_format {
        config.log.format = format;
    }
    if let Err(e) = logging::init(&config.log, cli.verbose) {
        eprintln!("error: {e:#}");
        return ExitCode::from(2);
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "leadq starting");

    let result = dispatch(cli.command, &config).await;

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

async fn dispatch(command: Commands, config: &AppConfig) -> anyhow::Result<u8> {
    match command {
        Commands::Variants(args) => run_variants(&args, &leadq_cli::load_registry(config)?),
        Commands::Score(args) => run_score(&args, &leadq_cli::load_registry(config)?),
        Commands::Send(args) => run_send(&args, &config.webhook).await,
        Commands::Run(args) => {
            let registry = leadq_cli::load_registry(config)?;
            run_session(&args, &registry, &config.webhook).await
        }
    }
}
