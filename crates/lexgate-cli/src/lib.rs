//! # lexgate-cli — Record Classification from the Command Line
//!
//! Provides the `lexgate` command-line interface: a thin front end over
//! `lexgate-schema` that loads a lexicon registry and classifies records
//! read from files, stdin, or newline-delimited feed dumps.
//!
//! ## Subcommands
//!
//! - `lexgate check` — Classify one record, a bare payload, or a JSON
//!   Lines dump of records.
//! - `lexgate collections` — List the collections the registry knows.
//!
//! ## Exit Codes
//!
//! - `0`: no record failed.
//! - `1`: at least one record failed (or warned, under `--strict`).
//! - `2`: operational error (unreadable input, bad lexicon directory).
//!
//! ```bash
//! lexgate check record.json
//! lexgate check --collection app.bsky.feed.post payload.yaml
//! lexgate --lexicons ./lexicons check --lines --strict firehose.jsonl
//! ```

pub mod check;
pub mod collections;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use lexgate_schema::SchemaRegistry;

/// Exit code when nothing failed.
pub const EXIT_OK: u8 = 0;
/// Exit code when a record failed classification.
pub const EXIT_FAILED: u8 = 1;
/// Exit code for operational errors.
pub const EXIT_ERROR: u8 = 2;

/// Load the registry from `lexicons` when given, otherwise the bundled set.
pub fn load_registry(lexicons: Option<&Path>) -> Result<SchemaRegistry> {
    let registry = match lexicons {
        Some(dir) => SchemaRegistry::from_dir(dir)
            .with_context(|| format!("failed to load lexicons from {}", dir.display()))?,
        None => SchemaRegistry::bundled().context("failed to load bundled lexicons")?,
    };
    tracing::info!(collections = registry.len(), "lexicon registry ready");
    Ok(registry)
}

/// Read input text from `path`, or from stdin when `path` is absent or `-`.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("failed to read {}", p.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}
