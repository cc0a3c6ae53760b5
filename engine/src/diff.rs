//! Collection diffing.
//!
//! # Algorithm
//!
//! 1. Stable sort both collections by descending field count, so the most
//!    specific records are paired first
//! 2. Walk `items_a`, pairing each item with the first remaining item of
//!    `items_b` that matches it in an allowed direction
//! 3. A paired item of `items_b` is consumed and cannot be paired again
//! 4. Whatever is left on either side is reported as unmatched
//!
//! The pairing is greedy and not globally optimal. A record may consume a
//! counterpart that a later record needed, leaving both unmatched; callers
//! rely on this exact ordering, so it is kept as is.

use crate::{matcher::matches, Collection, CompareWay, MatchOptions, Record};
use serde::{Deserialize, Serialize};

/// Records from each side that found no counterpart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiffResult {
    /// Items of the first collection left unpaired
    pub unmatched_a: Collection,
    /// Items of the second collection left unpaired
    pub unmatched_b: Collection,
    /// `true` when both unmatched lists are empty
    pub matched: bool,
}

/// Diff plus its overall verdict, as returned by [`match_collections`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionMatch {
    pub diff: DiffResult,
    pub matched: bool,
}

fn sorted_by_field_count(items: &[Record]) -> Vec<&Record> {
    let mut sorted: Vec<&Record> = items.iter().collect();
    sorted.sort_by(|a, b| b.len().cmp(&a.len()));
    sorted
}

/// Diff two collections, pairing items one for one.
pub fn collection_diff(items_a: &[Record], items_b: &[Record], options: &MatchOptions) -> DiffResult {
    let compare_left = options.compare_way.compares_left();
    let compare_right = options.compare_way.compares_right();

    let mut remaining = sorted_by_field_count(items_b);
    let mut unmatched_a = Vec::new();

    for item_a in sorted_by_field_count(items_a) {
        let found = remaining.iter().position(|item_b| {
            (compare_left && matches(item_a, item_b, options))
                || (compare_right && matches(item_b, item_a, options))
        });

        match found {
            Some(index) => {
                remaining.remove(index);
            }
            None => unmatched_a.push(item_a.clone()),
        }
    }

    let unmatched_b: Collection = remaining.into_iter().cloned().collect();
    let matched = unmatched_a.is_empty() && unmatched_b.is_empty();

    DiffResult {
        unmatched_a,
        unmatched_b,
        matched,
    }
}

/// Check whether every record of `fragment` pairs with a record of `universe`.
///
/// When the options ask for equal sizes (`same_count`, or the legacy
/// `match_quantity`) a size difference fails before any pairing is tried, and
/// with equal sizes a fully paired fragment leaves nothing in the universe
/// either. Without the size check, extra universe records are allowed.
pub fn collection_match(fragment: &[Record], universe: &[Record], options: &MatchOptions) -> bool {
    if options.requires_same_count() && fragment.len() != universe.len() {
        return false;
    }
    collection_diff(fragment, universe, options)
        .unmatched_a
        .is_empty()
}

/// Diff two collections in both directions, ignoring `skip_keys`.
pub fn match_collections<K: AsRef<str>>(
    items_a: &[Record],
    items_b: &[Record],
    skip_keys: &[K],
) -> CollectionMatch {
    let options = MatchOptions::default()
        .with_skip_keys(skip_keys.iter().map(|k| k.as_ref().to_string()))
        .with_compare_way(CompareWay::Both);
    let diff = collection_diff(items_a, items_b, &options);
    let matched = diff.matched;
    CollectionMatch { diff, matched }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::to_collection;
    use serde_json::{json, Value};

    fn items(value: Value) -> Collection {
        to_collection(&value).unwrap()
    }

    fn universe() -> Collection {
        items(json!([
            {"a": 1, "b": 2, "c": "3", "d": ["d1", "d2"]},
            {"e": "5", "f": "7", "b": 2, "c": "3"}
        ]))
    }

    #[test]
    fn empty_collections_match() {
        let diff = collection_diff(&[], &[], &MatchOptions::default());
        assert!(diff.matched);
        assert!(diff.unmatched_a.is_empty());
        assert!(diff.unmatched_b.is_empty());
    }

    #[test]
    fn partial_match_within_items() {
        let expected = items(json!([
            {"b": 2, "c": "3"},
            {"e": "5", "b": 2, "c": "3"}
        ]));
        assert!(collection_match(&expected, &universe(), &MatchOptions::partial()));
    }

    #[test]
    fn partial_mismatch_when_value_differs() {
        let expected = items(json!([
            {"b": 2, "c": "4"},
            {"e": "5", "b": 2, "c": "3"}
        ]));
        assert!(!collection_match(&expected, &universe(), &MatchOptions::partial()));
    }

    #[test]
    fn exact_match_when_equal() {
        assert!(collection_match(&universe(), &universe(), &MatchOptions::default()));
    }

    #[test]
    fn exact_mismatch_reports_both_sides() {
        let expected = items(json!([
            {"a": 1, "b": 2, "c": "4", "d": ["d1", "d2"]},
            {"e": "5", "f": "7", "b": 2, "c": "3"}
        ]));
        let diff = collection_diff(&expected, &universe(), &MatchOptions::default());
        assert!(!diff.matched);
        assert_eq!(diff.unmatched_a, items(json!([{"a": 1, "b": 2, "c": "4", "d": ["d1", "d2"]}])));
        assert_eq!(diff.unmatched_b, items(json!([{"a": 1, "b": 2, "c": "3", "d": ["d1", "d2"]}])));
    }

    #[test]
    fn same_count_rejects_size_difference_both_ways() {
        let small = items(json!([{"a": 1}, {"b": 2}]));
        let large = items(json!([{"a": 1}, {"b": 2}, {"b": 2}]));
        let opts = MatchOptions::default();
        assert!(!collection_match(&large, &small, &opts));
        assert!(!collection_match(&small, &large, &opts));
    }

    #[test]
    fn duplicates_are_consumed_one_for_one() {
        let small = items(json!([{"a": 1}, {"b": 2}]));
        let large = items(json!([{"a": 1}, {"b": 2}, {"b": 2}]));
        let opts = MatchOptions::default().with_same_count(false);

        let diff = collection_diff(&small, &large, &opts);
        assert!(!diff.matched);
        assert!(diff.unmatched_a.is_empty());
        assert_eq!(diff.unmatched_b, items(json!([{"b": 2}])));
    }

    #[test]
    fn fragment_of_larger_universe_with_partial_direction() {
        let universe = items(json!([{"a": 1}, {"b": 2}, {"c": 3}]));
        let fragment = items(json!([{"a": 1}, {"b": 2}]));
        let opts = MatchOptions::default()
            .with_same_count(false)
            .with_compare_way(CompareWay::Right);

        let diff = collection_diff(&fragment, &universe, &opts);
        assert!(diff.unmatched_a.is_empty());
        assert_eq!(diff.unmatched_b, items(json!([{"c": 3}])));
    }

    #[test]
    fn fragment_match_ignores_extra_universe_items_without_same_count() {
        let universe = items(json!([{"a": 1}, {"b": 2}, {"c": 3}]));
        let fragment = items(json!([{"a": 1}, {"b": 2}]));
        let opts = MatchOptions::default().with_same_count(false);
        assert!(collection_match(&fragment, &universe, &opts));

        let missing = items(json!([{"a": 1}, {"d": 4}]));
        assert!(!collection_match(&missing, &universe, &opts));
    }

    #[test]
    fn compare_way_selects_containment_direction() {
        let full = items(json!([{"a": 1, "b": 2}]));
        let part = items(json!([{"a": 1}]));
        let partial = MatchOptions::partial();

        // full[0] contains part[0]
        let left = partial.clone().with_compare_way(CompareWay::Left);
        assert!(collection_diff(&full, &part, &left).matched);
        assert!(!collection_diff(&part, &full, &left).matched);

        let right = partial.with_compare_way(CompareWay::Right);
        assert!(!collection_diff(&full, &part, &right).matched);
        assert!(collection_diff(&part, &full, &right).matched);
    }

    #[test]
    fn most_specific_records_pair_first() {
        let a = items(json!([{"x": 1}, {"x": 1, "y": 2}]));
        let b = items(json!([{"x": 1, "y": 2}, {"x": 1}]));
        let opts = MatchOptions::partial().with_compare_way(CompareWay::Left);
        assert!(collection_diff(&a, &b, &opts).matched);
    }

    #[test]
    fn greedy_pairing_is_not_optimal() {
        // {x:1,y:2} is tried first and takes {x:1}, leaving {x:1,z:3}
        // without a counterpart although {x:1,y:2}-{y:2} and {x:1,z:3}-{x:1}
        // would pair everything.
        let a = items(json!([{"x": 1, "y": 2}, {"x": 1, "z": 3}]));
        let b = items(json!([{"x": 1}, {"y": 2}]));
        let opts = MatchOptions::partial().with_compare_way(CompareWay::Left);

        let diff = collection_diff(&a, &b, &opts);
        assert!(!diff.matched);
        assert_eq!(diff.unmatched_a, items(json!([{"x": 1, "z": 3}])));
        assert_eq!(diff.unmatched_b, items(json!([{"y": 2}])));
    }

    #[test]
    fn match_collections_skips_volatile_keys() {
        let saved = items(json!([{"_gid": "g1", "_id": "o1", "title": "A"}]));
        let expected = items(json!([{"_gid": "g2", "_id": "o1", "title": "A"}]));

        let result = match_collections(&saved, &expected, &["_gid"]);
        assert!(result.matched);
        assert!(result.diff.matched);

        let result = match_collections::<&str>(&saved, &expected, &[]);
        assert!(!result.matched);
        assert_eq!(result.diff.unmatched_a, saved);
        assert_eq!(result.diff.unmatched_b, expected);
    }

    mod property_tests {
        use super::*;
        use crate::Record;
        use proptest::prelude::*;

        fn arb_value() -> impl Strategy<Value = Value> {
            prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::from),
                (-5i64..5).prop_map(Value::from),
                "[a-c]{0,2}".prop_map(Value::from),
            ]
        }

        fn arb_record() -> impl Strategy<Value = Record> {
            prop::collection::btree_map("[a-d]", arb_value(), 0..4)
                .prop_map(|fields| fields.into_iter().collect())
        }

        fn arb_collection() -> impl Strategy<Value = Collection> {
            prop::collection::vec(arb_record(), 0..6)
        }

        proptest! {
            #[test]
            fn prop_empty_filter_matches_partially(element in arb_record()) {
                prop_assert!(matches(&element, &Record::new(), &MatchOptions::partial()));
            }

            #[test]
            fn prop_record_matches_itself_exactly(element in arb_record()) {
                prop_assert!(matches(&element, &element, &MatchOptions::default()));
            }

            #[test]
            fn prop_sanitize_is_idempotent(
                element in arb_record(),
                skip in prop::collection::vec("[a-d]", 0..3),
            ) {
                let once = crate::sanitize(&element, &skip);
                let twice = crate::sanitize(&once, &skip);
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn prop_diff_is_symmetric(a in arb_collection(), b in arb_collection()) {
                let opts = MatchOptions::default();
                let forward = collection_diff(&a, &b, &opts);
                let backward = collection_diff(&b, &a, &opts);
                prop_assert_eq!(&forward.unmatched_a, &backward.unmatched_b);
                prop_assert_eq!(&forward.unmatched_b, &backward.unmatched_a);
                prop_assert_eq!(forward.matched, backward.matched);
            }

            #[test]
            fn prop_same_count_fails_on_size_difference(
                a in arb_collection(),
                b in arb_collection(),
            ) {
                prop_assume!(a.len() != b.len());
                prop_assert!(!collection_match(&a, &b, &MatchOptions::default()));
            }

            #[test]
            fn prop_collection_matches_itself(a in arb_collection()) {
                prop_assert!(collection_match(&a, &a, &MatchOptions::default()));
            }
        }
    }
}
