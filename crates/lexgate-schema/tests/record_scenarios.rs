//! Integration test: end-to-end classification of feed records against the
//! bundled lexicon set.
//!
//! Covers the record lifecycle a display sees: unknown collection, empty
//! payload, missing required field, conformant record, and the viewport
//! clamp on the formatted payload.

use lexgate_core::RawRecord;
use lexgate_schema::{
    classify, inspect, Classification, SchemaRegistry, Tier, ValidationOutcome,
};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn registry() -> SchemaRegistry {
    SchemaRegistry::bundled().expect("bundled lexicons load")
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn classified(collection: &str, payload: Value) -> Classification {
    classify(&registry().validate(collection, &object(payload)))
}

#[test]
fn test_unknown_collection_warns() {
    let c = classified("app.example.post", json!({"text": "hi"}));
    assert_eq!(c.tier, Tier::Warn);
    assert_eq!(c.message, "Unknown Collection");
}

#[test]
fn test_empty_payload_warns() {
    let c = classified("app.bsky.feed.post", json!({}));
    assert_eq!(c.tier, Tier::Warn);
    assert_eq!(c.message, "Record is Empty");
}

#[test]
fn test_missing_required_field_fails() {
    let outcome = registry().validate("app.bsky.feed.post", &object(json!({"text": "hello"})));
    assert_eq!(outcome, ValidationOutcome::Invalid("createdAt is required".into()));
    let c = classify(&outcome);
    assert_eq!(c.tier, Tier::Fail);
    assert_eq!(c.message, "createdAt is required");
}

#[test]
fn test_conformant_post_passes() {
    let c = classified(
        "app.bsky.feed.post",
        json!({"text": "hello", "createdAt": "2024-01-01T00:00:00Z"}),
    );
    assert_eq!(c.tier, Tier::Pass);
    assert_eq!(c.message, "Record is Valid");
}

#[test]
fn test_display_lines_clamped() {
    let registry = registry();

    // `{"a": 1}` pretty-prints to three lines.
    let short = RawRecord::new("app.bsky.feed.like", object(json!({"a": 1})));
    assert_eq!(inspect(&registry, Some(&short)).formatted_payload.lines().count(), 3);
    assert_eq!(inspect(&registry, Some(&short)).display_lines, 5);

    // Thirty-eight fields pretty-print to forty lines.
    let long_payload: Map<String, Value> = (0..38).map(|i| (format!("k{i:02}"), json!(i))).collect();
    let long = RawRecord::new("app.bsky.feed.like", long_payload);
    let view = inspect(&registry, Some(&long));
    assert_eq!(view.formatted_payload.lines().count(), 40);
    assert_eq!(view.display_lines, 25);
}

#[test]
fn test_feed_message_inspection() {
    let record: RawRecord = serde_json::from_value(json!({
        "repo": "did:plc:ewvi7nxzyoun6zhxrhs64oiz",
        "collection": "app.bsky.feed.like",
        "rkey": "3l3qo2vuowo2b",
        "seq": 7,
        "action": "create",
        "raw": {
            "subject": {
                "uri": "at://did:plc:ewvi7nxzyoun6zhxrhs64oiz/app.bsky.feed.post/3l3qo2vutsw2b",
                "cid": "bafyreig2fjxi3rptqdgylg7e5hmjl6mcke7rn2b6cugzlqq3i4zu6rq52q"
            },
            "createdAt": "2024-09-09T19:46:02.102Z"
        }
    }))
    .unwrap();

    let view = inspect(&registry(), Some(&record));
    assert_eq!(view.classification.tier, Tier::Pass);
    assert_eq!(
        view.uri.as_deref(),
        Some("at://did:plc:ewvi7nxzyoun6zhxrhs64oiz/app.bsky.feed.like/3l3qo2vuowo2b")
    );
    // Fields print in feed order, not sorted.
    assert!(view.formatted_payload.starts_with("{\n  \"subject\""));
}

#[test]
fn test_null_payload_is_empty() {
    let record: RawRecord =
        serde_json::from_value(json!({"collection": "app.bsky.feed.post", "raw": null})).unwrap();
    let view = inspect(&registry(), Some(&record));
    assert_eq!(view.classification.message, "Record is Empty");
    assert_eq!(view.formatted_payload, "{}");
}

#[test]
fn test_query_collection_is_unknown() {
    let c = classified("app.bsky.feed.getTimeline", json!({"limit": 10}));
    assert_eq!(c.tier, Tier::Warn);
    assert_eq!(c.message, "Unknown Collection");
}

#[test]
fn test_shared_definitions_are_not_collections() {
    let c = classified(
        "com.atproto.repo.strongRef",
        json!({"uri": "at://did:plc:abc", "cid": "bafyreig2fjxi3rptqdgylg7e5hmjl6mcke7rn2b6cugzlqq3i4zu6rq52q"}),
    );
    assert_eq!(c.message, "Unknown Collection");
}

fn arbitrary_payload() -> impl Strategy<Value = Map<String, Value>> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 :.-]{0,24}".prop_map(Value::from),
    ];
    let value = leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map("[a-zA-Z$]{1,8}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    });
    prop::collection::btree_map("[a-zA-Z$]{1,10}", value, 0..6)
        .prop_map(|m| m.into_iter().collect::<Map<String, Value>>())
}

proptest! {
    #[test]
    fn unregistered_collection_is_always_unknown(
        collection in "[a-z]{2,8}\\.[a-z]{2,8}\\.[a-z]{2,8}",
        payload in arbitrary_payload(),
    ) {
        let registry = registry();
        prop_assume!(!registry.contains(&collection));
        prop_assert_eq!(
            registry.validate(&collection, &payload),
            ValidationOutcome::UnknownCollection
        );
    }

    #[test]
    fn validation_is_idempotent(payload in arbitrary_payload()) {
        let registry = registry();
        for collection in registry.collections() {
            let first = registry.validate(collection, &payload);
            let second = registry.validate(collection, &payload);
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn known_collection_never_reports_unknown(payload in arbitrary_payload()) {
        let registry = registry();
        let outcome = registry.validate("app.bsky.feed.post", &payload);
        prop_assert_ne!(outcome.clone(), ValidationOutcome::UnknownCollection);
        if payload.is_empty() {
            prop_assert_eq!(outcome, ValidationOutcome::EmptyPayload);
        }
    }
}
