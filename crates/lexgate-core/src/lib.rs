//! # lexgate-core — Foundational Types for lexgate
//!
//! Leaf crate of the workspace. It defines the primitives every other
//! crate builds on: validated namespaced identifiers, the string formats
//! a lexicon can declare, and the raw record shape delivered by the
//! repository event feed.
//!
//! ## Key Design Principles
//!
//! 1. **Validated identifiers.** [`Nsid`] can only be constructed through
//!    its checking constructor. A schema document with a malformed id never
//!    makes it into a registry.
//!
//! 2. **Formats are data.** [`StringFormat`] is one exhaustive enum; every
//!    format a lexicon may declare has exactly one checker behind
//!    [`StringFormat::check`].
//!
//! 3. **Absent means empty.** A missing record or a `null` payload both
//!    collapse to an empty [`RawRecord`], so downstream code never has to
//!    branch on optionality.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `lexgate-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod error;
pub mod format;
pub mod nsid;
pub mod record;

pub use error::{FormatError, IdentifierError};
pub use format::StringFormat;
pub use nsid::Nsid;
pub use record::RawRecord;
