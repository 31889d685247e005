//! # Schema Errors
//!
//! Configuration errors raised while loading lexicon documents. These are
//! fatal to registry construction and never produced while validating a
//! record: payload problems are reported through
//! [`ValidationOutcome`](crate::ValidationOutcome) instead.

use lexgate_core::IdentifierError;
use thiserror::Error;

/// Error loading or parsing a lexicon document.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The document is not valid JSON or does not match the lexicon model.
    #[error("schema load error for '{source_name}': {reason}")]
    Parse {
        /// File name or other label for the document.
        source_name: String,
        /// Reason the document could not be parsed.
        reason: String,
    },

    /// The document declares a lexicon language version other than 1.
    #[error("unsupported lexicon version {version} in '{source_name}'")]
    UnsupportedVersion {
        /// File name or other label for the document.
        source_name: String,
        /// The declared version.
        version: u64,
    },

    /// The document id is not a valid NSID.
    #[error("invalid schema id: {0}")]
    InvalidId(#[from] IdentifierError),

    /// IO error reading a schema directory or file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
