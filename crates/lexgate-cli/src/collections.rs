//! # Collections Subcommand
//!
//! Lists the collection ids the loaded registry accepts, sorted, one per
//! line.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use lexgate_schema::SchemaRegistry;

use crate::EXIT_OK;

/// Arguments for the `lexgate collections` subcommand.
#[derive(Args, Debug, Default)]
pub struct CollectionsArgs {
    /// Print a JSON array instead of one id per line.
    #[arg(long)]
    pub json: bool,
}

/// Execute the collections subcommand, printing to stdout.
pub fn run_collections(args: &CollectionsArgs, registry: &SchemaRegistry) -> Result<u8> {
    let stdout = std::io::stdout();
    write_collections(args, registry, &mut stdout.lock())?;
    Ok(EXIT_OK)
}

/// Write the registry's collection ids to `out`.
pub fn write_collections(
    args: &CollectionsArgs,
    registry: &SchemaRegistry,
    out: &mut impl Write,
) -> Result<()> {
    let ids = registry.collections();
    if args.json {
        writeln!(out, "{}", serde_json::to_string(&ids)?)?;
    } else {
        for id in &ids {
            writeln!(out, "{id}")?;
        }
    }
    tracing::debug!(count = ids.len(), shared = registry.shared_len(), "listed collections");
    Ok(())
}
