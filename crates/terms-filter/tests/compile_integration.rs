//! Integration tests for compiling and evaluating terms filters.
//!
//! These tests drive the public API the way a query pipeline would: mappings
//! from TOML, documents indexed through the same mappings, filters parsed
//! from JSON and evaluated against the documents.

use serde_json::json;
use terms_filter_rs::{
    index_document, Document, FilterError, FilterEvaluator, FilterNode, FilterParserRegistry,
    InMemoryFilterCache, MappingConfig, MappingResolver, ParseContext,
};

const MAPPING: &str = r#"
doc_types = ["post", "comment"]

[fields.status]
type = "lowercase"

[fields.published]
type = "date"

[fields.votes]
type = "long"

[fields.pinned]
type = "boolean"
"#;

fn resolver() -> MappingResolver {
    let config: MappingConfig = toml::from_str(MAPPING).expect("mapping should parse");
    MappingResolver::new(config)
}

fn corpus(resolver: &MappingResolver) -> Vec<Document> {
    [
        json!({"_type": "post", "status": "Active", "published": "2024-03-01", "votes": 10, "pinned": true}),
        json!({"_type": "post", "status": "Draft", "published": "2024-03-02T00:00:00Z", "votes": 3}),
        json!({"_type": "comment", "status": "ACTIVE", "votes": "10"}),
        json!({"_type": "comment", "status": ["active", "flagged"], "pinned": false}),
    ]
    .iter()
    .map(|source| index_document(resolver, source).expect("document should index"))
    .collect()
}

fn matching_indices(filter: &FilterNode, docs: &[Document]) -> Vec<usize> {
    let evaluator = FilterEvaluator::new(filter);
    docs.iter()
        .enumerate()
        .filter(|(_, d)| evaluator.matches(d))
        .map(|(i, _)| i)
        .collect()
}

#[test]
fn test_terms_match_across_types() {
    let resolver = resolver();
    let docs = corpus(&resolver);
    let cache = InMemoryFilterCache::new();
    let registry = FilterParserRegistry::default();
    let mut ctx = ParseContext::new(&resolver, &cache);

    let filter = registry
        .parse_filter(&mut ctx, &json!({"terms": {"status": ["ACTIVE"]}}))
        .unwrap();

    assert_eq!(matching_indices(&filter, &docs), vec![0, 2, 3]);
}

#[test]
fn test_doc_type_prefix_restricts_matches() {
    let resolver = resolver();
    let docs = corpus(&resolver);
    let cache = InMemoryFilterCache::new();
    let registry = FilterParserRegistry::default();
    let mut ctx = ParseContext::new(&resolver, &cache);

    let filter = registry
        .parse_filter(&mut ctx, &json!({"in": {"comment.status": ["active"]}}))
        .unwrap();

    assert_eq!(matching_indices(&filter, &docs), vec![2, 3]);
}

#[test]
fn test_dates_and_numbers_match_after_encoding() {
    let resolver = resolver();
    let docs = corpus(&resolver);
    let cache = InMemoryFilterCache::new();
    let registry = FilterParserRegistry::default();
    let mut ctx = ParseContext::new(&resolver, &cache);

    let by_date = registry
        .parse_filter(
            &mut ctx,
            &json!({"terms": {"published": ["2024-03-02", "1709251200000"], "execution": "bool"}}),
        )
        .unwrap();
    assert_eq!(matching_indices(&by_date, &docs), vec![0, 1]);

    let by_votes = registry
        .parse_filter(&mut ctx, &json!({"terms": {"votes": ["010"]}}))
        .unwrap();
    assert_eq!(matching_indices(&by_votes, &docs), vec![0, 2]);

    let pinned = registry
        .parse_filter(&mut ctx, &json!({"terms": {"pinned": ["yes"]}}))
        .unwrap();
    assert_eq!(matching_indices(&pinned, &docs), vec![0]);
}

#[test]
fn test_and_requires_every_term() {
    let resolver = resolver();
    let docs = corpus(&resolver);
    let cache = InMemoryFilterCache::new();
    let registry = FilterParserRegistry::default();
    let mut ctx = ParseContext::new(&resolver, &cache);

    let filter = registry
        .parse_filter(
            &mut ctx,
            &json!({"terms": {"status": ["active", "flagged"], "execution": "and"}}),
        )
        .unwrap();
    assert_eq!(matching_indices(&filter, &docs), vec![3]);

    let nothing_required = registry
        .parse_filter(&mut ctx, &json!({"terms": {"status": [], "execution": "and"}}))
        .unwrap();
    assert_eq!(matching_indices(&nothing_required, &docs), vec![0, 1, 2, 3]);

    let nothing_allowed = registry
        .parse_filter(&mut ctx, &json!({"terms": {"status": [], "execution": "bool"}}))
        .unwrap();
    assert!(matching_indices(&nothing_allowed, &docs).is_empty());
}

#[test]
fn test_named_filters_collected_per_context() {
    let resolver = resolver();
    let cache = InMemoryFilterCache::new();
    let registry = FilterParserRegistry::default();
    let mut ctx = ParseContext::new(&resolver, &cache);

    registry
        .parse_filter(&mut ctx, &json!({"terms": {"status": ["a"], "_name": "first"}}))
        .unwrap();
    registry
        .parse_filter(&mut ctx, &json!({"in": {"votes": [1], "_name": "second"}}))
        .unwrap();

    let named = ctx.into_named_filters();
    assert_eq!(named.keys().collect::<Vec<_>>(), vec!["first", "second"]);
}

#[test]
fn test_error_messages_name_the_offender() {
    let resolver = resolver();
    let cache = InMemoryFilterCache::new();
    let registry = FilterParserRegistry::default();
    let mut ctx = ParseContext::new(&resolver, &cache);

    let cases = [
        (
            json!({"terms": {"execution": "bogus", "status": ["a"]}}),
            "[bogus]",
        ),
        (json!({"terms": {"status": ["a"], "weird": "x"}}), "[weird]"),
        (json!({"terms": {"status": ["a", null]}}), "[status]"),
        (json!({"terms": {"votes": ["many"]}}), "[many]"),
        (json!({"terms": {"execution": "plain"}}), "field name"),
    ];

    for (document, needle) in cases {
        let err = registry.parse_filter(&mut ctx, &document).unwrap_err();
        assert!(
            err.to_string().contains(needle),
            "error for {} should mention {}: {}",
            document,
            needle,
            err
        );
    }
    assert!(ctx.named_filters().is_empty());

    let err = registry
        .parse_filter(&mut ctx, &json!({"term": {"status": ["a"]}}))
        .unwrap_err();
    assert!(matches!(err, FilterError::UnknownFilter { .. }));
}
