//! # Bundled Lexicons
//!
//! A fixed lexicon set compiled into the crate, so a registry is available
//! without any files on disk. Paths mirror the NSID authority layout under
//! `lexicons/`.

use crate::error::SchemaError;
use crate::lexicon::SchemaDocument;

macro_rules! lexicon {
    ($path:literal) => {
        ($path, include_str!(concat!("../lexicons/", $path)))
    };
}

/// `(relative path, JSON text)` for every bundled lexicon document.
pub const BUNDLED_LEXICONS: &[(&str, &str)] = &[
    lexicon!("app/bsky/actor/profile.json"),
    lexicon!("app/bsky/embed/defs.json"),
    lexicon!("app/bsky/embed/external.json"),
    lexicon!("app/bsky/embed/images.json"),
    lexicon!("app/bsky/embed/record.json"),
    lexicon!("app/bsky/embed/recordWithMedia.json"),
    lexicon!("app/bsky/feed/getTimeline.json"),
    lexicon!("app/bsky/feed/like.json"),
    lexicon!("app/bsky/feed/post.json"),
    lexicon!("app/bsky/feed/repost.json"),
    lexicon!("app/bsky/graph/block.json"),
    lexicon!("app/bsky/graph/follow.json"),
    lexicon!("app/bsky/richtext/facet.json"),
    lexicon!("com/atproto/label/defs.json"),
    lexicon!("com/atproto/repo/strongRef.json"),
];

/// Parse every bundled document.
///
/// # Errors
///
/// Returns the first parse failure, labelled with the bundled path.
pub fn documents() -> Result<Vec<SchemaDocument>, SchemaError> {
    BUNDLED_LEXICONS
        .iter()
        .map(|(path, text)| SchemaDocument::parse(path, text))
        .collect()
}
