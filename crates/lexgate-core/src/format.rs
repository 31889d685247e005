//! # Lexicon String Formats
//!
//! A lexicon `string` definition may declare a `format`. Each format is a
//! syntactic check only: a `did` must look like a DID, it is never
//! resolved; a `cid` must look like a CID, it is never decoded.
//!
//! ## Datetimes
//!
//! `datetime` values must be RFC 3339 with an uppercase `T` separator and
//! an explicit timezone (`Z` or `±HH:MM`). The unknown-local-offset form
//! `-00:00` is rejected. Fractional seconds of any precision are allowed.

use std::sync::OnceLock;

use chrono::DateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FormatError;
use crate::nsid::Nsid;

/// Every string format a lexicon can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StringFormat {
    /// A DID or a handle.
    AtIdentifier,
    /// `at://authority[/collection[/rkey]]`.
    AtUri,
    /// Content identifier, loosely checked.
    Cid,
    /// RFC 3339 timestamp with timezone.
    Datetime,
    /// Decentralized identifier.
    Did,
    /// DNS-style account handle.
    Handle,
    /// Namespaced identifier.
    Nsid,
    /// Timestamp identifier (13 base32-sortable characters).
    Tid,
    /// Repository record key.
    RecordKey,
    /// Generic URI with a scheme.
    Uri,
    /// BCP 47 language tag.
    Language,
}

impl StringFormat {
    /// Returns the lexicon spelling of this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AtIdentifier => "at-identifier",
            Self::AtUri => "at-uri",
            Self::Cid => "cid",
            Self::Datetime => "datetime",
            Self::Did => "did",
            Self::Handle => "handle",
            Self::Nsid => "nsid",
            Self::Tid => "tid",
            Self::RecordKey => "record-key",
            Self::Uri => "uri",
            Self::Language => "language",
        }
    }

    /// Check `value` against this format.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] naming this format when the value does
    /// not conform.
    pub fn check(&self, value: &str) -> Result<(), FormatError> {
        match self {
            Self::AtIdentifier => check_at_identifier(value),
            Self::AtUri => check_at_uri(value),
            Self::Cid => check_cid(value),
            Self::Datetime => check_datetime(value),
            Self::Did => check_did(value),
            Self::Handle => check_handle(value),
            Self::Nsid => check_nsid(value),
            Self::Tid => check_tid(value),
            Self::RecordKey => check_record_key(value),
            Self::Uri => check_uri(value),
            Self::Language => check_language(value),
        }
    }
}

impl std::fmt::Display for StringFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("format pattern is a valid regex"))
}

fn did_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"^did:[a-z]+:[a-zA-Z0-9._:%-]*[a-zA-Z0-9._-]$")
}

fn handle_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(
        &RE,
        r"^([a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$",
    )
}

fn datetime_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(
        &RE,
        r"^[0-9]{4}-[01][0-9]-[0-3][0-9]T[0-2][0-9]:[0-6][0-9]:[0-6][0-9](\.[0-9]{1,20})?(Z|[+-][0-2][0-9]:[0-5][0-9])$",
    )
}

fn cid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"^[a-zA-Z0-9+=]{8,256}$")
}

fn tid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"^[234567abcdefghij][234567abcdefghijklmnopqrstuvwxyz]{12}$")
}

fn record_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"^[a-zA-Z0-9_~.:-]{1,512}$")
}

fn uri_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"^[a-zA-Z][a-zA-Z0-9+.-]*:(//)?[^\s/][^\s]*$")
}

fn language_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"^(i|x|[a-z]{2,3})(-[a-zA-Z0-9]{1,8})*$")
}

/// Check a DID (`did:method:identifier`).
pub fn check_did(value: &str) -> Result<(), FormatError> {
    if value.len() > 2048 {
        return Err(FormatError::new(StringFormat::Did, "longer than 2048 characters"));
    }
    if !did_regex().is_match(value) {
        return Err(FormatError::new(StringFormat::Did, "not did:method:identifier syntax"));
    }
    Ok(())
}

/// Check a handle (`alice.bsky.social`).
pub fn check_handle(value: &str) -> Result<(), FormatError> {
    if value.len() > 253 {
        return Err(FormatError::new(StringFormat::Handle, "longer than 253 characters"));
    }
    if !handle_regex().is_match(value) {
        return Err(FormatError::new(StringFormat::Handle, "not a DNS-style handle"));
    }
    Ok(())
}

/// Check an at-identifier: a DID when it starts with `did:`, otherwise a handle.
pub fn check_at_identifier(value: &str) -> Result<(), FormatError> {
    let inner = if value.starts_with("did:") {
        check_did(value)
    } else {
        check_handle(value)
    };
    inner.map_err(|e| FormatError::new(StringFormat::AtIdentifier, e.reason))
}

/// Check an NSID.
pub fn check_nsid(value: &str) -> Result<(), FormatError> {
    Nsid::new(value)
        .map(|_| ())
        .map_err(|e| FormatError::new(StringFormat::Nsid, e.to_string()))
}

/// Check an AT URI: `at://` authority, then optional collection and
/// record key path segments, then an optional `#/...` fragment.
pub fn check_at_uri(value: &str) -> Result<(), FormatError> {
    let fail = |reason: &str| FormatError::new(StringFormat::AtUri, reason);

    if value.len() > 8192 {
        return Err(fail("longer than 8192 characters"));
    }
    let rest = value
        .strip_prefix("at://")
        .ok_or_else(|| fail("must start with at://"))?;

    let (path, fragment) = match rest.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (rest, None),
    };
    if let Some(fragment) = fragment {
        if !fragment.starts_with('/') || fragment.contains(char::is_whitespace) {
            return Err(fail("fragment must start with / and contain no whitespace"));
        }
    }

    let mut parts = path.split('/');
    let authority = parts.next().unwrap_or_default();
    if check_at_identifier(authority).is_err() {
        return Err(fail("authority must be a DID or handle"));
    }
    if let Some(collection) = parts.next() {
        if check_nsid(collection).is_err() {
            return Err(fail("collection segment must be an NSID"));
        }
    }
    if let Some(rkey) = parts.next() {
        if rkey.is_empty() || rkey.contains(char::is_whitespace) {
            return Err(fail("record key segment must be non-empty"));
        }
    }
    if parts.next().is_some() {
        return Err(fail("too many path segments"));
    }
    Ok(())
}

/// Check a CID string. Only the character set and length are checked.
pub fn check_cid(value: &str) -> Result<(), FormatError> {
    if !cid_regex().is_match(value) {
        return Err(FormatError::new(StringFormat::Cid, "not a CID string"));
    }
    Ok(())
}

/// Check an RFC 3339 datetime with an explicit timezone.
pub fn check_datetime(value: &str) -> Result<(), FormatError> {
    if !datetime_regex().is_match(value) {
        return Err(FormatError::new(
            StringFormat::Datetime,
            "not RFC 3339 with uppercase T and explicit timezone",
        ));
    }
    if value.ends_with("-00:00") {
        return Err(FormatError::new(
            StringFormat::Datetime,
            "-00:00 is not a valid timezone",
        ));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|_| ())
        .map_err(|e| FormatError::new(StringFormat::Datetime, e.to_string()))
}

/// Check a TID.
pub fn check_tid(value: &str) -> Result<(), FormatError> {
    if !tid_regex().is_match(value) {
        return Err(FormatError::new(StringFormat::Tid, "not 13 base32-sortable characters"));
    }
    Ok(())
}

/// Check a record key. `.` and `..` are reserved.
pub fn check_record_key(value: &str) -> Result<(), FormatError> {
    if value == "." || value == ".." {
        return Err(FormatError::new(StringFormat::RecordKey, "reserved record key"));
    }
    if !record_key_regex().is_match(value) {
        return Err(FormatError::new(StringFormat::RecordKey, "invalid record key characters"));
    }
    Ok(())
}

/// Check a generic URI: a scheme followed by a non-empty, whitespace-free body.
pub fn check_uri(value: &str) -> Result<(), FormatError> {
    if value.len() > 8192 {
        return Err(FormatError::new(StringFormat::Uri, "longer than 8192 characters"));
    }
    if !uri_regex().is_match(value) {
        return Err(FormatError::new(StringFormat::Uri, "not scheme:body syntax"));
    }
    Ok(())
}

/// Check a BCP 47 language tag (simplified: primary subtag plus
/// alphanumeric subtags).
pub fn check_language(value: &str) -> Result<(), FormatError> {
    if !language_regex().is_match(value) {
        return Err(FormatError::new(StringFormat::Language, "not a BCP 47 language tag"));
    }
    Ok(())
}
