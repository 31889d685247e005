//! # Error Types
//!
//! Errors raised by the core primitives. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! Identifier errors are configuration problems (a schema document with a
//! bad id). Format errors are payload problems and are turned into
//! validation outcomes by the schema crate, never surfaced as failures.

use thiserror::Error;

use crate::format::StringFormat;

/// Error constructing a validated identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// NSID does not follow `authority.segments.name` syntax.
    #[error("invalid NSID: \"{value}\" ({reason})")]
    InvalidNsid {
        /// The rejected string.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// A string value did not satisfy a declared lexicon format.
///
/// `Display` renders the predicate part of a validation message
/// (`must be a valid datetime`) so callers can prefix it with a field path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("must be a valid {format}")]
pub struct FormatError {
    /// The format that was declared.
    pub format: StringFormat,
    /// Detail on the rejection, for logs.
    pub reason: String,
}

impl FormatError {
    pub(crate) fn new(format: StringFormat, reason: impl Into<String>) -> Self {
        Self {
            format,
            reason: reason.into(),
        }
    }
}
