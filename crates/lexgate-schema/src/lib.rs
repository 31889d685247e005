//! # lexgate-schema — Lexicon Registry, Validation & Classification
//!
//! Checks record payloads against lexicon schema documents and reduces
//! the result to a Pass/Warn/Fail tier for display or gating.
//!
//! ## Pipeline
//!
//! 1. [`SchemaRegistry`] holds the loaded documents. Only documents whose
//!    `main` definition is a `record` are collections; the rest stay
//!    available for `ref` resolution.
//! 2. [`RecordValidator`] checks a payload against its collection's record
//!    schema and returns a [`ValidationOutcome`].
//! 3. [`classify`] maps the outcome to a [`Classification`].
//! 4. [`inspect`] bundles the classification with the formatted payload
//!    and a clamped viewport height.
//!
//! ## Crate Policy
//!
//! - Depends only on `lexgate-core` internally.
//! - Only registry construction can fail. Unknown collections, empty
//!   payloads, and structural violations are outcomes, not errors.
//! - Validation is deterministic: the same registry and payload always
//!   produce the same outcome, reason text included.

pub mod bundled;
pub mod classify;
pub mod error;
pub mod inspect;
pub mod lexicon;
pub mod registry;
pub mod validate;

pub use classify::{classify, Classification, Tier};
pub use error::SchemaError;
pub use inspect::{
    clamp_display_lines, format_payload, inspect, RecordInspection, MAX_DISPLAY_LINES,
    MIN_DISPLAY_LINES,
};
pub use lexicon::{LexDef, SchemaDocument, LEXICON_VERSION};
pub use registry::SchemaRegistry;
pub use validate::{RecordValidator, ValidationOutcome, Violation, MAX_DEPTH};
