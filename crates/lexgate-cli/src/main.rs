//! # lexgate CLI entry point
//!
//! Parses command-line arguments, loads the lexicon registry, and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lexgate_cli::check::{run_check, CheckArgs};
use lexgate_cli::collections::{run_collections, CollectionsArgs};
use lexgate_cli::{load_registry, EXIT_ERROR};

/// lexgate: classify AT Protocol records against lexicon schemas.
///
/// Each record is reported as PASS (conforms to its collection's lexicon),
/// WARN (unknown collection or empty payload), or FAIL (violates the
/// lexicon, with the first violation named).
#[derive(Parser, Debug)]
#[command(name = "lexgate", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Load lexicons from this directory instead of the bundled set.
    #[arg(long, value_name = "DIR", global = true)]
    lexicons: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify records from a file, stdin, or a JSON Lines dump.
    Check(CheckArgs),

    /// List the collections the registry accepts.
    Collections(CollectionsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "lexgate starting");

    let result = load_registry(cli.lexicons.as_deref()).and_then(|registry| match &cli.command {
        Commands::Check(args) => run_check(args, &registry),
        Commands::Collections(args) => run_collections(args, &registry),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
