//! # Schema Registry
//!
//! Holds the loaded lexicon documents, indexed by collection identifier.
//!
//! Only documents whose `main` definition is a `record` become
//! collections. Every other document (queries, procedures, definition-only
//! documents like `com.atproto.repo.strongRef`) is excluded from collection
//! lookup but kept as a shared definition library, so that `ref` and
//! `union` targets inside record documents resolve.
//!
//! ## Thread Safety
//!
//! `SchemaRegistry` is `Send + Sync` and never mutated after construction.
//! Share one instance behind `&` or `Arc` for the life of the process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::lexicon::{LexDef, SchemaDocument};
use crate::validate::{RecordValidator, ValidationOutcome};

/// Registry of lexicon documents keyed by NSID.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    /// Record documents, keyed by collection id.
    collections: HashMap<String, SchemaDocument>,
    /// Non-record documents, available only for reference resolution.
    shared: HashMap<String, SchemaDocument>,
}

/// A definition found by following a `ref`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Resolved<'a> {
    /// Document holding the definition; local `#refs` inside it resolve here.
    pub document: &'a SchemaDocument,
    /// Definition name within the document.
    pub name: &'a str,
    pub def: &'a LexDef,
}

impl Resolved<'_> {
    /// Fully-qualified name: `nsid` for `main`, otherwise `nsid#name`.
    pub fn qualified_name(&self) -> String {
        if self.name == "main" {
            self.document.id.to_string()
        } else {
            format!("{}#{}", self.document.id, self.name)
        }
    }
}

impl SchemaRegistry {
    /// Build a registry from a set of parsed documents.
    ///
    /// Documents without a record-kind `main` are silently excluded from
    /// the collection index. When two documents share an id, the later one
    /// replaces the earlier.
    pub fn load(documents: impl IntoIterator<Item = SchemaDocument>) -> Self {
        let mut collections = HashMap::new();
        let mut shared = HashMap::new();

        for doc in documents {
            let id = doc.id.to_string();
            if collections.remove(&id).is_some() || shared.remove(&id).is_some() {
                tracing::warn!(id = %id, "duplicate lexicon id; later document replaces earlier");
            }

            if doc.is_record() {
                collections.insert(id, doc);
            } else {
                tracing::debug!(
                    id = %id,
                    main = doc.main().map(LexDef::kind).unwrap_or("none"),
                    "lexicon main is not a record; excluded from collections"
                );
                shared.insert(id, doc);
            }
        }

        tracing::info!(
            collections = collections.len(),
            shared = shared.len(),
            "loaded lexicon registry"
        );

        Self { collections, shared }
    }

    /// Load every `*.json` file under `dir` (recursively) as a lexicon.
    ///
    /// Files are read in sorted path order so duplicate-id resolution is
    /// deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Io`] if the directory or a file cannot be read,
    /// and any parse error from [`SchemaDocument::parse`]. One bad file
    /// fails the whole load.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        find_lexicon_files(dir, &mut paths)?;
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in &paths {
            let text = std::fs::read_to_string(path)?;
            let name = path.strip_prefix(dir).unwrap_or(path).display().to_string();
            documents.push(SchemaDocument::parse(&name, &text)?);
        }

        tracing::debug!(dir = %dir.display(), files = documents.len(), "read lexicon directory");
        Ok(Self::load(documents))
    }

    /// Build a registry from the lexicon set compiled into this crate.
    ///
    /// # Errors
    ///
    /// Only fails if a bundled document is malformed, which the test suite
    /// guards against.
    pub fn bundled() -> Result<Self, SchemaError> {
        crate::bundled::documents().map(Self::load)
    }

    /// Whether `collection` names a registered record schema. Exact match.
    pub fn contains(&self, collection: &str) -> bool {
        self.collections.contains_key(collection)
    }

    /// The record document for `collection`.
    pub fn get(&self, collection: &str) -> Option<&SchemaDocument> {
        self.collections.get(collection)
    }

    /// Registered collection ids, sorted.
    pub fn collections(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.collections.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered collections.
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// Returns true if no collections are registered.
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Number of non-record documents kept for reference resolution.
    pub fn shared_len(&self) -> usize {
        self.shared.len()
    }

    /// A validator borrowing this registry.
    pub fn validator(&self) -> RecordValidator<'_> {
        RecordValidator::new(self)
    }

    /// Validate `payload` as a record of `collection`.
    pub fn validate(&self, collection: &str, payload: &Map<String, Value>) -> ValidationOutcome {
        self.validator().validate(collection, payload)
    }

    /// Any document, record or shared, by id.
    fn document(&self, id: &str) -> Option<&SchemaDocument> {
        self.collections.get(id).or_else(|| self.shared.get(id))
    }

    /// Resolve `reference` as written inside `context`.
    ///
    /// `#name` is local to `context`, `nsid` means `nsid#main`, and
    /// `nsid#name` names a definition in another document.
    pub(crate) fn resolve<'a>(
        &'a self,
        reference: &str,
        context: &'a SchemaDocument,
    ) -> Option<Resolved<'a>> {
        let (doc_id, name) = match reference.split_once('#') {
            Some((doc_id, name)) => (doc_id, name),
            None => (reference, "main"),
        };

        let document = if doc_id.is_empty() || doc_id == context.id.as_str() {
            context
        } else {
            self.document(doc_id)?
        };
        let (name, def) = document.defs.get_key_value(name)?;

        Some(Resolved {
            document,
            name: name.as_str(),
            def,
        })
    }
}

/// Recursively collect `*.json` files under `dir`.
fn find_lexicon_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), SchemaError> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            find_lexicon_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            out.push(path);
        }
    }
    Ok(())
}
