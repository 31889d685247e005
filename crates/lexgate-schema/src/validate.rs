//! # Record Validation
//!
//! Structural conformance checking of record payloads against the
//! registered lexicon for their collection.
//!
//! ## Step Order
//!
//! 1. Unregistered collection: [`ValidationOutcome::UnknownCollection`].
//!    No structural check is attempted.
//! 2. Payload with no fields: [`ValidationOutcome::EmptyPayload`].
//! 3. Structural check of the payload against the `main` record object.
//!    The first violation stops the walk and becomes
//!    [`ValidationOutcome::Invalid`].
//!
//! ## Walk Order
//!
//! Objects check their `required` list in declared order, then present
//! properties in name order, then (for closed objects) undeclared fields.
//! Arrays check length, then elements in index order. The walk is a pure
//! function of the registry and the payload, so the same input always
//! reports the same violation.
//!
//! ## Unions
//!
//! A union value with a `$type` is checked against the listed alternative
//! of that name. An unlisted `$type` passes in an open union and fails in
//! a closed one. Without `$type`, the first alternative the value fits is
//! taken.

use std::fmt;

use base64::engine::general_purpose;
use base64::Engine as _;
use lexgate_core::format::check_cid;
use serde_json::{Map, Value};
use unicode_segmentation::UnicodeSegmentation;

use crate::lexicon::{
    LexArray, LexBlob, LexBoolean, LexBytes, LexDef, LexInteger, LexObject, LexString, LexUnion,
    SchemaDocument,
};
use crate::registry::{Resolved, SchemaRegistry};

/// Maximum definition nesting followed before giving up. Bounds `ref`
/// cycles that never consume payload structure.
pub const MAX_DEPTH: usize = 64;

/// Result of validating one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValidationOutcome {
    /// The payload conforms to the collection's record schema.
    Valid,
    /// No record schema is registered for the collection.
    UnknownCollection,
    /// The payload has no top-level fields.
    EmptyPayload,
    /// The first structural violation found, as a sentence.
    Invalid(String),
}

impl ValidationOutcome {
    /// Returns true for [`ValidationOutcome::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("Record is Valid"),
            Self::UnknownCollection => f.write_str("Unknown Collection"),
            Self::EmptyPayload => f.write_str("Record is Empty"),
            Self::Invalid(reason) => f.write_str(reason),
        }
    }
}

/// A single structural violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path to the offending field, with `[i]` for array elements.
    pub path: String,
    /// What is wrong with it (`is required`, `must be a string`).
    pub message: String,
}

impl Violation {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "record {}", self.message)
        } else {
            write!(f, "{} {}", self.path, self.message)
        }
    }
}

/// Validates record payloads against a [`SchemaRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct RecordValidator<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> RecordValidator<'a> {
    /// Create a validator backed by `registry`.
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Validate `payload` as a record of `collection`.
    ///
    /// Never fails: every problem with the payload is reported as a
    /// [`ValidationOutcome`] variant.
    pub fn validate(&self, collection: &str, payload: &Map<String, Value>) -> ValidationOutcome {
        let Some(document) = self.registry.get(collection) else {
            tracing::debug!(collection, "no lexicon registered for collection");
            return ValidationOutcome::UnknownCollection;
        };
        if payload.is_empty() {
            return ValidationOutcome::EmptyPayload;
        }

        let outcome = match self.check_record(document, payload) {
            Ok(()) => ValidationOutcome::Valid,
            Err(violation) => ValidationOutcome::Invalid(violation.to_string()),
        };
        tracing::debug!(collection, outcome = %outcome, "validated record");
        outcome
    }

    /// Run the structural check alone, returning the first violation.
    ///
    /// # Errors
    ///
    /// Returns the first [`Violation`] in walk order.
    pub fn check_record(
        &self,
        document: &'a SchemaDocument,
        payload: &Map<String, Value>,
    ) -> Result<(), Violation> {
        let Some(record) = document.main_record() else {
            return Err(Violation::new("", format!("{} is not a record lexicon", document.id)));
        };

        if let Some(tag) = payload.get("$type") {
            let matches = tag
                .as_str()
                .is_some_and(|t| same_definition(t, document.id.as_str()));
            if !matches {
                return Err(Violation::new("$type", format!("must be {}", document.id)));
            }
        }

        Walker {
            registry: self.registry,
        }
        .object(document, &record.record, payload, "", 0)
    }
}

struct Walker<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> Walker<'a> {
    fn object(
        &self,
        doc: &'a SchemaDocument,
        def: &'a LexObject,
        value: &Map<String, Value>,
        path: &str,
        depth: usize,
    ) -> Result<(), Violation> {
        for name in &def.required {
            if !value.contains_key(name) {
                return Err(Violation::new(join(path, name), "is required"));
            }
        }

        for (name, prop) in &def.properties {
            let Some(field) = value.get(name) else {
                continue;
            };
            if field.is_null() && def.nullable.contains(name) {
                continue;
            }
            self.value(doc, prop, field, &join(path, name), depth + 1)?;
        }

        if def.is_closed() {
            if let Some(extra) = value
                .keys()
                .find(|key| key.as_str() != "$type" && !def.properties.contains_key(*key))
            {
                return Err(Violation::new(join(path, extra), "is not allowed"));
            }
        }

        Ok(())
    }

    fn value(
        &self,
        doc: &'a SchemaDocument,
        def: &'a LexDef,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> Result<(), Violation> {
        if depth > MAX_DEPTH {
            return Err(Violation::new(
                path,
                format!("exceeds maximum nesting depth of {MAX_DEPTH}"),
            ));
        }

        match def {
            LexDef::Boolean(d) => boolean(d, value, path),
            LexDef::Integer(d) => integer(d, value, path),
            LexDef::String(d) => string(d, value, path),
            LexDef::Bytes(d) => bytes(d, value, path),
            LexDef::CidLink(_) => cid_link(value, path),
            LexDef::Blob(d) => blob(d, value, path),
            LexDef::Null(_) => {
                if value.is_null() {
                    Ok(())
                } else {
                    Err(Violation::new(path, "must be null"))
                }
            }
            LexDef::Unknown(_) => {
                if value.is_object() {
                    Ok(())
                } else {
                    Err(Violation::new(path, "must be an object"))
                }
            }
            LexDef::Array(d) => self.array(doc, d, value, path, depth),
            LexDef::Object(d) => {
                let map = value
                    .as_object()
                    .ok_or_else(|| Violation::new(path, "must be an object"))?;
                self.object(doc, d, map, path, depth)
            }
            LexDef::Record(d) => {
                let map = value
                    .as_object()
                    .ok_or_else(|| Violation::new(path, "must be an object"))?;
                self.object(doc, &d.record, map, path, depth)
            }
            LexDef::Ref(d) => {
                let target = self.resolve(doc, &d.reference, path)?;
                self.resolved(target, value, path, depth + 1)
            }
            LexDef::Union(d) => self.union(doc, d, value, path, depth),
            LexDef::Token(_)
            | LexDef::Query(_)
            | LexDef::Procedure(_)
            | LexDef::Subscription(_) => Err(Violation::new(
                path,
                format!("is declared with a {} definition, which holds no data", def.kind()),
            )),
        }
    }

    fn resolve(
        &self,
        doc: &'a SchemaDocument,
        reference: &str,
        path: &str,
    ) -> Result<Resolved<'a>, Violation> {
        self.registry.resolve(reference, doc).ok_or_else(|| {
            Violation::new(path, format!("references unknown definition {reference}"))
        })
    }

    /// Check a value against a definition reached through a `ref`. A ref to
    /// a token accepts only the token's own name.
    fn resolved(
        &self,
        target: Resolved<'a>,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> Result<(), Violation> {
        if let LexDef::Token(_) = target.def {
            let name = target.qualified_name();
            return match value.as_str() {
                Some(s) if same_definition(s, &name) => Ok(()),
                _ => Err(Violation::new(path, format!("must be {name}"))),
            };
        }
        self.value(target.document, target.def, value, path, depth)
    }

    fn array(
        &self,
        doc: &'a SchemaDocument,
        def: &'a LexArray,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> Result<(), Violation> {
        let items = value
            .as_array()
            .ok_or_else(|| Violation::new(path, "must be an array"))?;

        if let Some(max) = def.max_length {
            if items.len() > max {
                return Err(Violation::new(
                    path,
                    format!("must not have more than {max} elements"),
                ));
            }
        }
        if let Some(min) = def.min_length {
            if items.len() < min {
                return Err(Violation::new(
                    path,
                    format!("must not have fewer than {min} elements"),
                ));
            }
        }

        for (i, item) in items.iter().enumerate() {
            self.value(doc, &def.items, item, &format!("{path}[{i}]"), depth + 1)?;
        }
        Ok(())
    }

    fn union(
        &self,
        doc: &'a SchemaDocument,
        def: &'a LexUnion,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> Result<(), Violation> {
        let map = value
            .as_object()
            .ok_or_else(|| Violation::new(path, "must be an object"))?;
        let alternatives = || {
            def.refs
                .iter()
                .map(|r| qualify(r, doc))
                .collect::<Vec<_>>()
                .join("|")
        };

        if let Some(tag) = map.get("$type") {
            let tag = tag
                .as_str()
                .ok_or_else(|| Violation::new(join(path, "$type"), "must be a string"))?;
            let selected = def
                .refs
                .iter()
                .find(|r| same_definition(&qualify(r, doc), tag));
            return match selected {
                Some(reference) => {
                    let target = self.resolve(doc, reference, path)?;
                    self.resolved(target, value, path, depth + 1)
                }
                None if def.closed => Err(Violation::new(
                    join(path, "$type"),
                    format!("must be one of ({})", alternatives()),
                )),
                None => Ok(()),
            };
        }

        if def.refs.is_empty() && !def.closed {
            return Ok(());
        }
        for reference in &def.refs {
            let target = self.resolve(doc, reference, path)?;
            if self.resolved(target, value, path, depth + 1).is_ok() {
                return Ok(());
            }
        }
        Err(Violation::new(
            path,
            format!("does not match any of ({})", alternatives()),
        ))
    }
}

fn boolean(def: &LexBoolean, value: &Value, path: &str) -> Result<(), Violation> {
    let b = value
        .as_bool()
        .ok_or_else(|| Violation::new(path, "must be a boolean"))?;
    if let Some(expected) = def.const_value {
        if b != expected {
            return Err(Violation::new(path, format!("must be {expected}")));
        }
    }
    Ok(())
}

fn integer(def: &LexInteger, value: &Value, path: &str) -> Result<(), Violation> {
    let n = integral(value).ok_or_else(|| Violation::new(path, "must be an integer"))?;

    if let Some(expected) = def.const_value {
        if n != expected {
            return Err(Violation::new(path, format!("must be {expected}")));
        }
    }
    if let Some(allowed) = &def.enum_values {
        if !allowed.contains(&n) {
            let list: Vec<String> = allowed.iter().map(i64::to_string).collect();
            return Err(Violation::new(path, format!("must be one of ({})", list.join("|"))));
        }
    }
    if let Some(min) = def.minimum {
        if n < min {
            return Err(Violation::new(path, format!("can not be less than {min}")));
        }
    }
    if let Some(max) = def.maximum {
        if n > max {
            return Err(Violation::new(path, format!("can not be greater than {max}")));
        }
    }
    Ok(())
}

fn string(def: &LexString, value: &Value, path: &str) -> Result<(), Violation> {
    let s = value
        .as_str()
        .ok_or_else(|| Violation::new(path, "must be a string"))?;

    if let Some(expected) = &def.const_value {
        if s != expected {
            return Err(Violation::new(path, format!("must be {expected}")));
        }
    }
    if let Some(allowed) = &def.enum_values {
        if !allowed.iter().any(|a| a == s) {
            return Err(Violation::new(
                path,
                format!("must be one of ({})", allowed.join("|")),
            ));
        }
    }

    if let Some(max) = def.max_length {
        if s.len() > max {
            return Err(Violation::new(
                path,
                format!("must not be longer than {max} characters"),
            ));
        }
    }
    if let Some(min) = def.min_length {
        if s.len() < min {
            return Err(Violation::new(
                path,
                format!("must not be shorter than {min} characters"),
            ));
        }
    }

    if def.max_graphemes.is_some() || def.min_graphemes.is_some() {
        let graphemes = s.graphemes(true).count();
        if let Some(max) = def.max_graphemes {
            if graphemes > max {
                return Err(Violation::new(
                    path,
                    format!("must not be longer than {max} graphemes"),
                ));
            }
        }
        if let Some(min) = def.min_graphemes {
            if graphemes < min {
                return Err(Violation::new(
                    path,
                    format!("must not be shorter than {min} graphemes"),
                ));
            }
        }
    }

    if let Some(format) = def.format {
        format
            .check(s)
            .map_err(|e| Violation::new(path, e.to_string()))?;
    }
    Ok(())
}

fn bytes(def: &LexBytes, value: &Value, path: &str) -> Result<(), Violation> {
    let encoded = value
        .as_object()
        .filter(|m| m.len() == 1)
        .and_then(|m| m.get("$bytes"))
        .and_then(Value::as_str)
        .ok_or_else(|| Violation::new(path, "must be a byte array"))?;
    let decoded = general_purpose::STANDARD_NO_PAD
        .decode(encoded)
        .or_else(|_| general_purpose::STANDARD.decode(encoded))
        .map_err(|_| Violation::new(path, "must be a byte array"))?;

    if let Some(max) = def.max_length {
        if decoded.len() > max {
            return Err(Violation::new(path, format!("must not be larger than {max} bytes")));
        }
    }
    if let Some(min) = def.min_length {
        if decoded.len() < min {
            return Err(Violation::new(path, format!("must not be smaller than {min} bytes")));
        }
    }
    Ok(())
}

fn cid_link(value: &Value, path: &str) -> Result<(), Violation> {
    let link = value
        .as_object()
        .filter(|m| m.len() == 1)
        .and_then(|m| m.get("$link"))
        .and_then(Value::as_str);
    match link {
        Some(cid) if check_cid(cid).is_ok() => Ok(()),
        _ => Err(Violation::new(path, "must be a cid-link")),
    }
}

fn blob(def: &LexBlob, value: &Value, path: &str) -> Result<(), Violation> {
    let map = value
        .as_object()
        .ok_or_else(|| Violation::new(path, "must be a blob"))?;

    let (mime_type, size) = if map.get("$type").and_then(Value::as_str) == Some("blob") {
        let link = map
            .get("ref")
            .and_then(Value::as_object)
            .and_then(|r| r.get("$link"))
            .and_then(Value::as_str);
        if !link.is_some_and(|cid| check_cid(cid).is_ok()) {
            return Err(Violation::new(join(path, "ref"), "must be a cid-link"));
        }
        let size = map
            .get("size")
            .and_then(integral)
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(|| Violation::new(join(path, "size"), "must be a non-negative integer"))?;
        (map.get("mimeType"), Some(size))
    } else if let Some(cid) = map.get("cid") {
        if !cid.as_str().is_some_and(|c| check_cid(c).is_ok()) {
            return Err(Violation::new(join(path, "cid"), "must be a valid cid"));
        }
        (map.get("mimeType"), None)
    } else {
        return Err(Violation::new(path, "must be a blob"));
    };

    let mime_type = mime_type
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| Violation::new(join(path, "mimeType"), "must be a string"))?;

    if !def.accept.is_empty() && !def.accept.iter().any(|p| mime_matches(p, mime_type)) {
        return Err(Violation::new(
            join(path, "mimeType"),
            format!("must be one of ({})", def.accept.join("|")),
        ));
    }
    if let (Some(max), Some(size)) = (def.max_size, size) {
        if size > max {
            return Err(Violation::new(path, format!("must not be larger than {max} bytes")));
        }
    }
    Ok(())
}

/// An integer value. Integral floats (`1.0`) count; `1.5` does not.
fn integral(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// `*/*` matches anything, `type/*` matches the type prefix.
fn mime_matches(pattern: &str, mime_type: &str) -> bool {
    if pattern == "*/*" || pattern == mime_type {
        return true;
    }
    match pattern.strip_suffix('*') {
        Some(prefix) if prefix.ends_with('/') => mime_type.starts_with(prefix),
        _ => false,
    }
}

fn join(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{path}.{field}")
    }
}

/// Expand a local `#name` reference to `nsid#name`.
fn qualify(reference: &str, doc: &SchemaDocument) -> String {
    match reference.strip_prefix('#') {
        Some(name) => format!("{}#{}", doc.id, name),
        None => reference.to_string(),
    }
}

/// Compare two fully-qualified definition names, treating `nsid#main`
/// and `nsid` as the same.
fn same_definition(a: &str, b: &str) -> bool {
    a.strip_suffix("#main").unwrap_or(a) == b.strip_suffix("#main").unwrap_or(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry(docs: &[&str]) -> SchemaRegistry {
        SchemaRegistry::load(docs.iter().map(|d| SchemaDocument::from_json(d).unwrap()))
    }

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("payload must be an object, got {other}"),
        }
    }

    fn reason(outcome: ValidationOutcome) -> String {
        match outcome {
            ValidationOutcome::Invalid(reason) => reason,
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    const NOTE: &str = r##"{
        "lexicon": 1,
        "id": "com.example.note",
        "defs": {
            "main": {
                "type": "record",
                "key": "tid",
                "record": {
                    "type": "object",
                    "required": ["title", "createdAt"],
                    "nullable": ["summary"],
                    "properties": {
                        "title": {"type": "string", "maxLength": 20, "minLength": 1},
                        "summary": {"type": "string"},
                        "status": {"type": "string", "enum": ["draft", "final"]},
                        "kind": {"type": "string", "const": "note"},
                        "priority": {"type": "integer", "minimum": 1, "maximum": 5},
                        "pinned": {"type": "boolean"},
                        "emoji": {"type": "string", "maxGraphemes": 2},
                        "author": {"type": "string", "format": "did"},
                        "tags": {"type": "array", "maxLength": 2, "items": {"type": "string"}},
                        "location": {"type": "ref", "ref": "#point"},
                        "attachment": {"type": "union", "refs": ["#point", "#link"]},
                        "strictAttachment": {"type": "union", "refs": ["#link"], "closed": true},
                        "meta": {"type": "unknown"},
                        "digest": {"type": "bytes", "maxLength": 4},
                        "source": {"type": "cid-link"},
                        "image": {"type": "blob", "accept": ["image/*"], "maxSize": 100},
                        "level": {"type": "ref", "ref": "#important"},
                        "createdAt": {"type": "string", "format": "datetime"}
                    }
                }
            },
            "point": {
                "type": "object",
                "required": ["x", "y"],
                "properties": {
                    "x": {"type": "integer"},
                    "y": {"type": "integer"}
                }
            },
            "link": {
                "type": "object",
                "required": ["uri"],
                "additionalProperties": false,
                "properties": {
                    "uri": {"type": "string", "format": "uri"}
                }
            },
            "important": {"type": "token"}
        }
    }"##;

    const CID: &str = "bafyreie5737gdxlw5i64vzichcalba3z2v5n6icifvx5xytvske7mr3hpm";

    fn check(extra: Value) -> ValidationOutcome {
        let mut body = payload(json!({"title": "hi", "createdAt": "2024-01-01T00:00:00Z"}));
        body.extend(payload(extra));
        registry(&[NOTE]).validate("com.example.note", &body)
    }

    #[test]
    fn test_minimal_valid() {
        assert_eq!(check(json!({})), ValidationOutcome::Valid);
    }

    #[test]
    fn test_unknown_collection_short_circuits() {
        let reg = registry(&[NOTE]);
        let outcome = reg.validate("com.example.other", &payload(json!({"title": 5})));
        assert_eq!(outcome, ValidationOutcome::UnknownCollection);
    }

    #[test]
    fn test_empty_payload_short_circuits() {
        let reg = registry(&[NOTE]);
        assert_eq!(reg.validate("com.example.note", &Map::new()), ValidationOutcome::EmptyPayload);
    }

    #[test]
    fn test_required_checked_in_declared_order() {
        let reg = registry(&[NOTE]);
        let outcome = reg.validate("com.example.note", &payload(json!({"pinned": true})));
        assert_eq!(reason(outcome), "title is required");
    }

    #[test]
    fn test_type_mismatch_names_field() {
        assert_eq!(reason(check(json!({"pinned": "yes"}))), "pinned must be a boolean");
        assert_eq!(reason(check(json!({"priority": 2.5}))), "priority must be an integer");
        assert_eq!(reason(check(json!({"tags": "a"}))), "tags must be an array");
    }

    #[test]
    fn test_null_only_allowed_when_nullable() {
        assert_eq!(check(json!({"summary": null})), ValidationOutcome::Valid);
        assert_eq!(reason(check(json!({"status": null}))), "status must be a string");
    }

    #[test]
    fn test_required_null_is_present_but_mistyped() {
        let body = payload(json!({"title": "hi", "createdAt": null}));
        let outcome = registry(&[NOTE]).validate("com.example.note", &body);
        assert_eq!(reason(outcome), "createdAt must be a string");
    }

    #[test]
    fn test_string_constraints() {
        assert_eq!(
            reason(check(json!({"status": "gone"}))),
            "status must be one of (draft|final)"
        );
        assert_eq!(reason(check(json!({"kind": "memo"}))), "kind must be note");
        assert_eq!(
            reason(check(json!({"title": "x".repeat(21)}))),
            "title must not be longer than 20 characters"
        );
    }

    #[test]
    fn test_grapheme_limit_counts_clusters() {
        // Two flag emoji: eight bytes each, one grapheme each.
        assert_eq!(check(json!({"emoji": "🇫🇷🇯🇵"})), ValidationOutcome::Valid);
        assert_eq!(
            reason(check(json!({"emoji": "abc"}))),
            "emoji must not be longer than 2 graphemes"
        );
    }

    #[test]
    fn test_integer_bounds() {
        assert_eq!(check(json!({"priority": 3})), ValidationOutcome::Valid);
        assert_eq!(reason(check(json!({"priority": 0}))), "priority can not be less than 1");
        assert_eq!(reason(check(json!({"priority": 9}))), "priority can not be greater than 5");
    }

    #[test]
    fn test_integral_float_is_integer() {
        assert_eq!(check(json!({"priority": 2.0})), ValidationOutcome::Valid);
        assert_eq!(reason(check(json!({"priority": 9.0}))), "priority can not be greater than 5");
        assert_eq!(reason(check(json!({"priority": 1e300}))), "priority must be an integer");

        let blob = json!({"$type": "blob", "ref": {"$link": CID}, "mimeType": "image/png", "size": 50.0});
        assert_eq!(check(json!({"image": blob})), ValidationOutcome::Valid);
        let negative = json!({"$type": "blob", "ref": {"$link": CID}, "mimeType": "image/png", "size": -1.0});
        assert_eq!(
            reason(check(json!({"image": negative}))),
            "image.size must be a non-negative integer"
        );
    }

    #[test]
    fn test_integral_helper() {
        assert_eq!(integral(&json!(7)), Some(7));
        assert_eq!(integral(&json!(-3.0)), Some(-3));
        assert_eq!(integral(&json!(1.5)), None);
        assert_eq!(integral(&json!("1")), None);
        assert_eq!(integral(&json!(u64::MAX)), None);
    }

    #[test]
    fn test_format_violation() {
        assert_eq!(reason(check(json!({"author": "bob"}))), "author must be a valid did");
        let body = payload(json!({"title": "hi", "createdAt": "yesterday"}));
        let outcome = registry(&[NOTE]).validate("com.example.note", &body);
        assert_eq!(reason(outcome), "createdAt must be a valid datetime");
    }

    #[test]
    fn test_array_length_and_items() {
        assert_eq!(
            reason(check(json!({"tags": ["a", "b", "c"]}))),
            "tags must not have more than 2 elements"
        );
        assert_eq!(reason(check(json!({"tags": ["a", 1]}))), "tags[1] must be a string");
    }

    #[test]
    fn test_local_ref_recurses() {
        assert_eq!(check(json!({"location": {"x": 1, "y": 2}})), ValidationOutcome::Valid);
        assert_eq!(reason(check(json!({"location": {"x": 1}}))), "location.y is required");
    }

    #[test]
    fn test_union_selected_by_type_tag() {
        let outcome = check(json!({"attachment": {
            "$type": "com.example.note#link", "uri": "https://example.com"
        }}));
        assert_eq!(outcome, ValidationOutcome::Valid);

        let outcome = check(json!({"attachment": {"$type": "com.example.note#point", "x": "1", "y": 2}}));
        assert_eq!(reason(outcome), "attachment.x must be an integer");
    }

    #[test]
    fn test_union_structural_fit_without_type_tag() {
        assert_eq!(check(json!({"attachment": {"x": 1, "y": 2}})), ValidationOutcome::Valid);
        assert_eq!(
            check(json!({"attachment": {"uri": "https://example.com"}})),
            ValidationOutcome::Valid
        );
        assert_eq!(
            reason(check(json!({"attachment": {"nothing": true}}))),
            "attachment does not match any of (com.example.note#point|com.example.note#link)"
        );
    }

    #[test]
    fn test_open_union_tolerates_unlisted_type() {
        let outcome = check(json!({"attachment": {"$type": "com.example.video", "src": 1}}));
        assert_eq!(outcome, ValidationOutcome::Valid);
    }

    #[test]
    fn test_closed_union_rejects_unlisted_type() {
        let outcome = check(json!({"strictAttachment": {"$type": "com.example.video"}}));
        assert_eq!(
            reason(outcome),
            "strictAttachment.$type must be one of (com.example.note#link)"
        );
    }

    #[test]
    fn test_union_value_must_be_object() {
        assert_eq!(reason(check(json!({"attachment": 5}))), "attachment must be an object");
    }

    #[test]
    fn test_closed_object_rejects_undeclared_fields() {
        let outcome = check(json!({"strictAttachment": {
            "$type": "com.example.note#link", "uri": "https://example.com", "extra": 1
        }}));
        assert_eq!(reason(outcome), "strictAttachment.extra is not allowed");
    }

    #[test]
    fn test_open_object_tolerates_undeclared_fields() {
        assert_eq!(check(json!({"somethingElse": [1, 2, 3]})), ValidationOutcome::Valid);
    }

    #[test]
    fn test_unknown_requires_object() {
        assert_eq!(check(json!({"meta": {"anything": [1]}})), ValidationOutcome::Valid);
        assert_eq!(reason(check(json!({"meta": "text"}))), "meta must be an object");
    }

    #[test]
    fn test_bytes_shape_and_length() {
        assert_eq!(check(json!({"digest": {"$bytes": "AQID"}})), ValidationOutcome::Valid);
        assert_eq!(
            reason(check(json!({"digest": {"$bytes": "AQIDBAUG"}}))),
            "digest must not be larger than 4 bytes"
        );
        assert_eq!(reason(check(json!({"digest": "AQID"}))), "digest must be a byte array");
    }

    #[test]
    fn test_cid_link_shape() {
        assert_eq!(check(json!({"source": {"$link": CID}})), ValidationOutcome::Valid);
        assert_eq!(reason(check(json!({"source": CID}))), "source must be a cid-link");
    }

    #[test]
    fn test_blob_shapes() {
        let blob = json!({"$type": "blob", "ref": {"$link": CID}, "mimeType": "image/png", "size": 50});
        assert_eq!(check(json!({"image": blob})), ValidationOutcome::Valid);

        let legacy = json!({"cid": CID, "mimeType": "image/jpeg"});
        assert_eq!(check(json!({"image": legacy})), ValidationOutcome::Valid);

        let wrong_mime = json!({"$type": "blob", "ref": {"$link": CID}, "mimeType": "video/mp4", "size": 50});
        assert_eq!(
            reason(check(json!({"image": wrong_mime}))),
            "image.mimeType must be one of (image/*)"
        );

        let too_big = json!({"$type": "blob", "ref": {"$link": CID}, "mimeType": "image/png", "size": 500});
        assert_eq!(
            reason(check(json!({"image": too_big}))),
            "image must not be larger than 100 bytes"
        );

        assert_eq!(reason(check(json!({"image": {"size": 1}}))), "image must be a blob");
    }

    #[test]
    fn test_token_ref_requires_token_name() {
        assert_eq!(
            check(json!({"level": "com.example.note#important"})),
            ValidationOutcome::Valid
        );
        assert_eq!(
            reason(check(json!({"level": "urgent"}))),
            "level must be com.example.note#important"
        );
    }

    #[test]
    fn test_top_level_type_tag() {
        assert_eq!(check(json!({"$type": "com.example.note"})), ValidationOutcome::Valid);
        assert_eq!(check(json!({"$type": "com.example.note#main"})), ValidationOutcome::Valid);
        assert_eq!(
            reason(check(json!({"$type": "com.example.other"}))),
            "$type must be com.example.note"
        );
    }

    #[test]
    fn test_unresolvable_ref_is_invalid_not_fatal() {
        let reg = registry(&[r#"{"lexicon": 1, "id": "com.example.dangling", "defs": {"main": {
            "type": "record",
            "record": {"type": "object", "properties": {
                "target": {"type": "ref", "ref": "com.example.missing"}
            }}
        }}}"#]);
        let outcome = reg.validate("com.example.dangling", &payload(json!({"target": {}})));
        assert_eq!(
            reason(outcome),
            "target references unknown definition com.example.missing"
        );
    }

    #[test]
    fn test_ref_cycle_is_bounded() {
        let reg = registry(&[r##"{"lexicon": 1, "id": "com.example.loop", "defs": {
            "main": {"type": "record", "record": {"type": "object", "properties": {
                "spin": {"type": "ref", "ref": "#a"}
            }}},
            "a": {"type": "ref", "ref": "#b"},
            "b": {"type": "ref", "ref": "#a"}
        }}"##]);
        let outcome = reg.validate("com.example.loop", &payload(json!({"spin": 1})));
        assert_eq!(
            reason(outcome),
            format!("spin exceeds maximum nesting depth of {MAX_DEPTH}")
        );
    }

    #[test]
    fn test_cross_document_ref() {
        let reg = registry(&[
            r#"{"lexicon": 1, "id": "com.example.shared", "defs": {"main": {
                "type": "object", "required": ["name"],
                "properties": {"name": {"type": "string"}}
            }}}"#,
            r#"{"lexicon": 1, "id": "com.example.card", "defs": {"main": {
                "type": "record",
                "record": {"type": "object", "properties": {
                    "owner": {"type": "ref", "ref": "com.example.shared"}
                }}
            }}}"#,
        ]);
        assert!(!reg.contains("com.example.shared"));
        let ok = reg.validate("com.example.card", &payload(json!({"owner": {"name": "a"}})));
        assert_eq!(ok, ValidationOutcome::Valid);
        let bad = reg.validate("com.example.card", &payload(json!({"owner": {}})));
        assert_eq!(reason(bad), "owner.name is required");
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(ValidationOutcome::Valid.to_string(), "Record is Valid");
        assert_eq!(ValidationOutcome::UnknownCollection.to_string(), "Unknown Collection");
        assert_eq!(ValidationOutcome::EmptyPayload.to_string(), "Record is Empty");
        assert_eq!(
            ValidationOutcome::Invalid("x is required".into()).to_string(),
            "x is required"
        );
    }

    #[test]
    fn test_violation_display_root() {
        let v = Violation::new("", "is not a record lexicon");
        assert_eq!(v.to_string(), "record is not a record lexicon");
    }

    #[test]
    fn test_mime_matching() {
        assert!(mime_matches("*/*", "video/mp4"));
        assert!(mime_matches("image/*", "image/png"));
        assert!(mime_matches("image/png", "image/png"));
        assert!(!mime_matches("image/*", "imagex/png"));
        assert!(!mime_matches("image/png", "image/jpeg"));
    }

    #[test]
    fn test_same_definition_ignores_main_suffix() {
        assert!(same_definition("a.b.c#main", "a.b.c"));
        assert!(same_definition("a.b.c", "a.b.c"));
        assert!(!same_definition("a.b.c#x", "a.b.c"));
    }
}
