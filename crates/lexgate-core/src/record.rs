//! # Raw Records
//!
//! The shape of a record as delivered by the repository event feed:
//! where it lives (repo, collection, rkey), where it came from in the
//! stream (seq, action), and the untyped payload itself.
//!
//! Every field defaults, so a partial feed message still deserializes. A
//! `null` payload is read as an empty mapping.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A record pulled from a repository, before any schema checking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    /// DID of the repository holding the record.
    pub repo: String,
    /// Collection identifier naming the record's schema. May be empty.
    pub collection: String,
    /// Record key within the collection.
    pub rkey: String,
    /// Sequence number of the feed event that carried the record.
    pub seq: i64,
    /// Feed action label (`create`, `update`, `delete`).
    pub action: String,
    /// The record payload.
    #[serde(deserialize_with = "null_as_empty")]
    pub raw: Map<String, Value>,
}

impl RawRecord {
    /// Build a record carrying only a collection and payload.
    pub fn new(collection: impl Into<String>, raw: Map<String, Value>) -> Self {
        Self {
            collection: collection.into(),
            raw,
            ..Self::default()
        }
    }

    /// Whether this record names a collection. An unselected record is the
    /// empty default.
    pub fn is_selected(&self) -> bool {
        !self.collection.is_empty()
    }

    /// The record's `at://repo/collection/rkey` address, or `None` when no
    /// collection is set.
    pub fn at_uri(&self) -> Option<String> {
        if !self.is_selected() {
            return None;
        }
        Some(format!("at://{}/{}/{}", self.repo, self.collection, self.rkey))
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}
