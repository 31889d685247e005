//! # Check Subcommand
//!
//! Classifies records against the loaded registry and prints one verdict
//! per record.
//!
//! Input forms:
//!
//! - default: one feed record (`repo`, `collection`, `rkey`, `seq`,
//!   `action`, `raw`) as JSON or YAML;
//! - `--collection NSID`: a bare payload, JSON or YAML, checked as a record
//!   of that collection;
//! - `--lines`: JSON Lines, one feed record per line. Blank lines are
//!   skipped.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use serde_json::{Map, Value};

use lexgate_core::RawRecord;
use lexgate_schema::{inspect, RecordInspection, SchemaRegistry, Tier};

use crate::{EXIT_FAILED, EXIT_OK};

/// Arguments for the `lexgate check` subcommand.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Record file to check. Reads stdin when absent or `-`.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Treat the input as a bare payload of this collection.
    #[arg(long, value_name = "NSID", conflicts_with = "lines")]
    pub collection: Option<String>,

    /// Input is JSON Lines, one record per line.
    #[arg(long)]
    pub lines: bool,

    /// Exit non-zero on warnings as well as failures.
    #[arg(long)]
    pub strict: bool,

    /// Print verdicts only, without payloads.
    #[arg(long, short)]
    pub quiet: bool,

    /// Print one JSON object per record instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Per-tier record counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub total: usize,
    pub passed: usize,
    pub warned: usize,
    pub failed: usize,
}

impl CheckSummary {
    fn record(&mut self, tier: Tier) {
        self.total += 1;
        match tier {
            Tier::Pass => self.passed += 1,
            Tier::Warn => self.warned += 1,
            Tier::Fail => self.failed += 1,
        }
    }

    /// Exit code for this summary.
    pub fn exit_code(&self, strict: bool) -> u8 {
        if self.failed > 0 || (strict && self.warned > 0) {
            EXIT_FAILED
        } else {
            EXIT_OK
        }
    }
}

/// Execute the check subcommand, printing to stdout.
///
/// Returns exit code: 0 when nothing failed, 1 on failure.
pub fn run_check(args: &CheckArgs, registry: &SchemaRegistry) -> Result<u8> {
    let text = crate::read_input(args.path.as_deref())?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = check_text(args, registry, &text, &mut out)?;
    Ok(summary.exit_code(args.strict))
}

/// Parse `text` per `args`, classify every record, and write verdicts to
/// `out`.
pub fn check_text(
    args: &CheckArgs,
    registry: &SchemaRegistry,
    text: &str,
    out: &mut impl Write,
) -> Result<CheckSummary> {
    let records = parse_records(args, text)?;
    tracing::debug!(records = records.len(), "parsed check input");

    let mut summary = CheckSummary::default();
    for record in &records {
        let view = inspect(registry, Some(record));
        summary.record(view.classification.tier);
        if args.json {
            writeln!(out, "{}", serde_json::to_string(&view)?)?;
        } else {
            write_verdict(out, &view, args.quiet)?;
        }
    }

    if records.len() > 1 {
        if args.json {
            writeln!(out, "{}", serde_json::to_string(&summary)?)?;
        } else {
            writeln!(
                out,
                "Records: {}/{} passed, {} warned, {} failed",
                summary.passed, summary.total, summary.warned, summary.failed
            )?;
        }
    }

    tracing::info!(
        total = summary.total,
        passed = summary.passed,
        warned = summary.warned,
        failed = summary.failed,
        "check complete"
    );
    Ok(summary)
}

fn write_verdict(out: &mut impl Write, view: &RecordInspection, quiet: bool) -> Result<()> {
    let label = match view.classification.tier {
        Tier::Pass => "PASS",
        Tier::Warn => "WARN",
        Tier::Fail => "FAIL",
    };
    let uri = view.uri.as_deref().unwrap_or("(no record selected)");
    writeln!(out, "{label}: {uri}: {}", view.classification.message)?;

    if quiet {
        return Ok(());
    }
    let lines: Vec<&str> = view.formatted_payload.split('\n').collect();
    for line in lines.iter().take(view.display_lines) {
        writeln!(out, "    {line}")?;
    }
    if lines.len() > view.display_lines {
        writeln!(out, "    ... {} more lines", lines.len() - view.display_lines)?;
    }
    Ok(())
}

/// Turn input text into records according to the input form in `args`.
///
/// Empty input or a `null` document is an absent record: no collection,
/// empty payload.
pub fn parse_records(args: &CheckArgs, text: &str) -> Result<Vec<RawRecord>> {
    if args.lines {
        return text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str::<Option<RawRecord>>(line)
                    .map(Option::unwrap_or_default)
                    .with_context(|| format!("invalid record on line {}", i + 1))
            })
            .collect();
    }

    let document = parse_document(text)?;
    let record = match &args.collection {
        Some(collection) => RawRecord::new(collection.clone(), payload_from(document)?),
        None => serde_json::from_value::<Option<RawRecord>>(document)
            .context("input is not a record")?
            .unwrap_or_default(),
    };
    Ok(vec![record])
}

/// Parse a JSON or YAML document. JSON is tried first for its error
/// positions; YAML is the fallback.
fn parse_document(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(json_err) => serde_yaml::from_str(text).with_context(|| {
            format!("input is neither JSON nor YAML (JSON error: {json_err})")
        }),
    }
}

fn payload_from(document: Value) -> Result<Map<String, Value>> {
    match document {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => bail!("payload must be a mapping, got {}", json_type_name(&other)),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
