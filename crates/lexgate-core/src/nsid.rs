//! # Namespaced Identifiers
//!
//! [`Nsid`] names a lexicon document and, for record lexicons, the
//! collection its records live in (`app.bsky.feed.post`).
//!
//! ## Validation
//!
//! - ASCII only, at most 317 characters.
//! - At least three dot-separated segments.
//! - Authority segments (all but the last): 1-63 characters of
//!   `[A-Za-z0-9-]`, no leading or trailing hyphen. The first segment
//!   (the reversed TLD) must start with a letter.
//! - Name segment (the last): a letter followed by up to 62 letters or
//!   digits.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IdentifierError;

/// A validated namespaced identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Nsid(String);

impl Nsid {
    /// Maximum total length in characters.
    pub const MAX_LENGTH: usize = 317;

    /// Create an NSID from a string, validating its syntax.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidNsid`] describing the first rule
    /// the string breaks.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
        let s = value.into();
        if let Err(reason) = Self::validate(&s) {
            return Err(IdentifierError::InvalidNsid { value: s, reason });
        }
        Ok(Self(s))
    }

    fn validate(s: &str) -> Result<(), String> {
        if s.is_empty() {
            return Err("empty".to_string());
        }
        if !s.is_ascii() {
            return Err("contains non-ASCII characters".to_string());
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(format!("longer than {} characters", Self::MAX_LENGTH));
        }

        let segments: Vec<&str> = s.split('.').collect();
        if segments.len() < 3 {
            return Err("needs at least three segments".to_string());
        }

        let (name, authority) = match segments.split_last() {
            Some(parts) => parts,
            None => return Err("empty".to_string()),
        };

        for (i, segment) in authority.iter().enumerate() {
            if segment.is_empty() || segment.len() > 63 {
                return Err(format!("segment {} must be 1-63 characters", i + 1));
            }
            if !segment.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
                return Err(format!("segment {:?} has invalid characters", segment));
            }
            if segment.starts_with('-') || segment.ends_with('-') {
                return Err(format!("segment {:?} starts or ends with a hyphen", segment));
            }
        }
        if authority[0].starts_with(|c: char| c.is_ascii_digit()) {
            return Err("first segment must start with a letter".to_string());
        }

        if name.is_empty() || name.len() > 63 {
            return Err("name segment must be 1-63 characters".to_string());
        }
        if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err("name segment must start with a letter".to_string());
        }
        if !name.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(format!("name segment {:?} has invalid characters", name));
        }

        Ok(())
    }

    /// Access the NSID string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The domain authority, everything before the final segment
    /// (`app.bsky.feed` for `app.bsky.feed.post`).
    pub fn authority(&self) -> &str {
        match self.0.rfind('.') {
            Some(pos) => &self.0[..pos],
            None => &self.0,
        }
    }

    /// The final name segment (`post` for `app.bsky.feed.post`).
    pub fn name(&self) -> &str {
        match self.0.rfind('.') {
            Some(pos) => &self.0[pos + 1..],
            None => &self.0,
        }
    }
}

impl TryFrom<String> for Nsid {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Nsid> for String {
    fn from(nsid: Nsid) -> Self {
        nsid.0
    }
}

impl FromStr for Nsid {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Nsid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Nsid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
