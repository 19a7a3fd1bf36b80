//! # aira CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use aira_cli::assess::{run_classify, run_report, run_validate, ClassifyArgs, ReportArgs, ValidateArgs};
use aira_cli::session::{run_session, run_system, SessionArgs, SystemArgs};

/// AI Act risk assessment CLI
///
/// Classifies AI systems into the four risk tiers of the EU AI Act, exports
/// compliance reports, and drives ten-step assessments stored in a remote
/// registry.
#[derive(Parser, Debug)]
#[command(name = "aira", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify a flattened answers file into a risk tier.
    Classify(ClassifyArgs),

    /// Classify and export the compliance report with checklist and timeline.
    Report(ReportArgs),

    /// Run the step validators over an answers file.
    Validate(ValidateArgs),

    /// Register systems with the remote registry.
    System(SystemArgs),

    /// Drive a remote assessment session (show, submit, draft, classify).
    Session(SessionArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "aira CLI starting");

    let result = match &cli.command {
        Commands::Classify(args) => run_classify(args),
        Commands::Report(args) => run_report(args),
        Commands::Validate(args) => run_validate(args),
        Commands::System(args) => run_system(args),
        Commands::Session(args) => run_session(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Logs go to stderr; stdout carries command output.
fn init_tracing(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
