//! # Lexicon Document Model
//!
//! Typed representation of lexicon (schema) documents, version 1. A
//! document has an NSID `id` and a map of named definitions. The `main`
//! definition, when present, is what the bare NSID refers to; a document
//! whose `main` is a `record` defines a collection.
//!
//! Definitions are parsed with `serde`, tagged by their `type` field.
//! Unknown `type` values are a parse error, so a registry never holds a
//! definition the validator cannot interpret.
//!
//! ## Extension
//!
//! `object` definitions accept `additionalProperties: false` to reject
//! undeclared fields. Without it objects are open, as in plain lexicons.

use std::collections::BTreeMap;

use lexgate_core::{Nsid, StringFormat};
use serde::Deserialize;

use crate::error::SchemaError;

/// The only lexicon language version this crate understands.
pub const LEXICON_VERSION: u64 = 1;

/// A parsed lexicon document. Immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    /// Lexicon language version (always [`LEXICON_VERSION`]).
    pub lexicon: u64,
    /// Document identifier; the collection id for record documents.
    pub id: Nsid,
    /// Optional schema revision counter.
    pub revision: Option<u64>,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Named definitions, including `main` when present.
    pub defs: BTreeMap<String, LexDef>,
}

#[derive(Deserialize)]
struct RawDocument {
    lexicon: u64,
    id: String,
    #[serde(default)]
    revision: Option<u64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    defs: BTreeMap<String, LexDef>,
}

impl SchemaDocument {
    /// Parse a lexicon document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Parse`] for malformed JSON, unknown definition
    /// kinds, or a document without definitions;
    /// [`SchemaError::UnsupportedVersion`] for a lexicon version other than 1;
    /// [`SchemaError::InvalidId`] when `id` is not an NSID.
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        Self::parse("<inline>", text)
    }

    /// Parse a lexicon document, labelling errors with `source_name`.
    pub fn parse(source_name: &str, text: &str) -> Result<Self, SchemaError> {
        let raw: RawDocument = serde_json::from_str(text).map_err(|e| SchemaError::Parse {
            source_name: source_name.to_string(),
            reason: format!("invalid lexicon JSON: {e}"),
        })?;

        if raw.lexicon != LEXICON_VERSION {
            return Err(SchemaError::UnsupportedVersion {
                source_name: source_name.to_string(),
                version: raw.lexicon,
            });
        }
        if raw.defs.is_empty() {
            return Err(SchemaError::Parse {
                source_name: source_name.to_string(),
                reason: "document has no definitions".to_string(),
            });
        }

        Ok(Self {
            lexicon: raw.lexicon,
            id: Nsid::new(raw.id)?,
            revision: raw.revision,
            description: raw.description,
            defs: raw.defs,
        })
    }

    /// The `main` definition, if the document has one.
    pub fn main(&self) -> Option<&LexDef> {
        self.defs.get("main")
    }

    /// The record definition, when `main` is of kind `record`.
    pub fn main_record(&self) -> Option<&LexRecord> {
        match self.main() {
            Some(LexDef::Record(record)) => Some(record),
            _ => None,
        }
    }

    /// Whether this document defines a record collection.
    pub fn is_record(&self) -> bool {
        self.main_record().is_some()
    }

    /// Look up a definition by name.
    pub fn def(&self, name: &str) -> Option<&LexDef> {
        self.defs.get(name)
    }
}

/// One lexicon definition, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LexDef {
    /// A storable record shape.
    Record(LexRecord),
    /// An XRPC query (HTTP GET) signature.
    Query(LexXrpc),
    /// An XRPC procedure (HTTP POST) signature.
    Procedure(LexXrpc),
    /// An event-stream subscription signature.
    Subscription(LexXrpc),
    /// A named symbol with no data shape.
    Token(LexToken),
    /// A mapping with declared properties.
    Object(LexObject),
    /// A UTF-8 string.
    String(LexString),
    /// A signed 64-bit integer.
    Integer(LexInteger),
    /// A boolean.
    Boolean(LexBoolean),
    /// JSON `null`.
    Null(LexNull),
    /// Raw bytes, `{"$bytes": "<base64>"}` in JSON.
    Bytes(LexBytes),
    /// A CID link, `{"$link": "<cid>"}` in JSON.
    CidLink(LexCidLink),
    /// A blob reference.
    Blob(LexBlob),
    /// A homogeneous list.
    Array(LexArray),
    /// A reference to another definition.
    Ref(LexRef),
    /// One of several referenced object definitions.
    Union(LexUnion),
    /// Any object.
    Unknown(LexUnknown),
}

impl LexDef {
    /// The lexicon `type` spelling of this definition.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Record(_) => "record",
            Self::Query(_) => "query",
            Self::Procedure(_) => "procedure",
            Self::Subscription(_) => "subscription",
            Self::Token(_) => "token",
            Self::Object(_) => "object",
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Boolean(_) => "boolean",
            Self::Null(_) => "null",
            Self::Bytes(_) => "bytes",
            Self::CidLink(_) => "cid-link",
            Self::Blob(_) => "blob",
            Self::Array(_) => "array",
            Self::Ref(_) => "ref",
            Self::Union(_) => "union",
            Self::Unknown(_) => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexRecord {
    #[serde(default)]
    pub description: Option<String>,
    /// Record key type (`tid`, `nsid`, `any`, `literal:<value>`).
    #[serde(default)]
    pub key: Option<String>,
    pub record: LexObject,
}

/// Query, procedure, and subscription signatures. Only the description is
/// kept; the rest of the signature is irrelevant to record validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LexXrpc {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LexToken {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexObject {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub nullable: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, LexDef>,
    /// `Some(false)` closes the object to undeclared fields.
    #[serde(default)]
    pub additional_properties: Option<bool>,
}

impl LexObject {
    /// Whether undeclared fields are rejected.
    pub fn is_closed(&self) -> bool {
        self.additional_properties == Some(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexString {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub format: Option<StringFormat>,
    /// Minimum length in UTF-8 bytes.
    #[serde(default)]
    pub min_length: Option<usize>,
    /// Maximum length in UTF-8 bytes.
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub min_graphemes: Option<usize>,
    #[serde(default)]
    pub max_graphemes: Option<usize>,
    /// Closed set of permitted values.
    #[serde(default, rename = "enum")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, rename = "const")]
    pub const_value: Option<String>,
    /// Suggested values. Advisory only, never enforced.
    #[serde(default)]
    pub known_values: Vec<String>,
    #[serde(default)]
    pub default: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LexInteger {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub minimum: Option<i64>,
    #[serde(default)]
    pub maximum: Option<i64>,
    #[serde(default, rename = "enum")]
    pub enum_values: Option<Vec<i64>>,
    #[serde(default, rename = "const")]
    pub const_value: Option<i64>,
    #[serde(default)]
    pub default: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LexBoolean {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "const")]
    pub const_value: Option<bool>,
    #[serde(default)]
    pub default: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LexNull {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexBytes {
    #[serde(default)]
    pub description: Option<String>,
    /// Minimum decoded length in bytes.
    #[serde(default)]
    pub min_length: Option<usize>,
    /// Maximum decoded length in bytes.
    #[serde(default)]
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LexCidLink {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexBlob {
    #[serde(default)]
    pub description: Option<String>,
    /// Accepted MIME types; `type/*` and `*/*` are wildcards. Empty accepts all.
    #[serde(default)]
    pub accept: Vec<String>,
    /// Maximum blob size in bytes.
    #[serde(default)]
    pub max_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexArray {
    #[serde(default)]
    pub description: Option<String>,
    pub items: Box<LexDef>,
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LexRef {
    #[serde(default)]
    pub description: Option<String>,
    /// `#local`, `nsid`, or `nsid#name`.
    #[serde(rename = "ref")]
    pub reference: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LexUnion {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub refs: Vec<String>,
    /// Closed unions reject `$type` values not listed in `refs`.
    #[serde(default)]
    pub closed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LexUnknown {
    #[serde(default)]
    pub description: Option<String>,
}
