//! # Record Inspection
//!
//! Everything a display needs for one record: its address, its
//! classification, the payload pretty-printed, and how many lines of
//! viewport to give that payload.

use lexgate_core::RawRecord;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::classify::{classify, Classification};
use crate::registry::SchemaRegistry;

/// Smallest payload viewport, in lines.
pub const MIN_DISPLAY_LINES: usize = 5;
/// Largest payload viewport, in lines.
pub const MAX_DISPLAY_LINES: usize = 25;

/// Display bundle for a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordInspection {
    /// `at://repo/collection/rkey`, or `None` when no record is selected.
    pub uri: Option<String>,
    pub classification: Classification,
    /// Payload as JSON indented by two spaces.
    pub formatted_payload: String,
    /// Line count of `formatted_payload`, clamped to the viewport bounds.
    pub display_lines: usize,
}

/// Clamp a line count into `[MIN_DISPLAY_LINES, MAX_DISPLAY_LINES]`.
pub fn clamp_display_lines(lines: usize) -> usize {
    lines.clamp(MIN_DISPLAY_LINES, MAX_DISPLAY_LINES)
}

/// Render a payload as two-space indented JSON.
pub fn format_payload(payload: &Map<String, Value>) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|_| "{}".to_string())
}

/// Validate, classify, and format `record` for display.
///
/// An absent record is treated as an empty one: no collection, empty
/// payload.
pub fn inspect(registry: &SchemaRegistry, record: Option<&RawRecord>) -> RecordInspection {
    let empty = RawRecord::default();
    let record = record.unwrap_or(&empty);

    let outcome = registry.validate(&record.collection, &record.raw);
    let formatted_payload = format_payload(&record.raw);
    let display_lines = clamp_display_lines(formatted_payload.split('\n').count());

    RecordInspection {
        uri: record.at_uri(),
        classification: classify(&outcome),
        formatted_payload,
        display_lines,
    }
}
