//! Matching configuration.

use serde::{Deserialize, Serialize};

/// Direction of containment checks when diffing two collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareWay {
    /// Items of `b` must be contained in items of `a`
    Left,
    /// Items of `a` must be contained in items of `b`
    Right,
    /// Either direction is enough (default)
    #[default]
    Both,
}

impl CompareWay {
    /// Whether `matches(item_a, item_b)` is tried.
    pub fn compares_left(self) -> bool {
        matches!(self, CompareWay::Left | CompareWay::Both)
    }

    /// Whether `matches(item_b, item_a)` is tried.
    pub fn compares_right(self) -> bool {
        matches!(self, CompareWay::Right | CompareWay::Both)
    }
}

/// Options shared by every matching operation.
///
/// `Default` yields the documented defaults; deserializing a partial JSON
/// object fills the missing fields with the same defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Require identical field sets (default `true`)
    pub exact_match: bool,
    /// Require equal collection sizes in `collection_match` (default `true`)
    pub same_count: bool,
    /// Legacy spelling of `same_count` (default `false`)
    pub match_quantity: bool,
    /// Sanitize both operands before matching (default `true`)
    pub sanitize: bool,
    /// Fields removed from both operands when sanitizing
    pub skip_keys: Vec<String>,
    /// Containment direction for collection diffs (default `both`)
    pub compare_way: CompareWay,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            exact_match: true,
            same_count: true,
            match_quantity: false,
            sanitize: true,
            skip_keys: Vec::new(),
            compare_way: CompareWay::Both,
        }
    }
}

impl MatchOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for partial matching (`exact_match = false`).
    pub fn partial() -> Self {
        Self::default().with_exact_match(false)
    }

    pub fn with_exact_match(mut self, exact_match: bool) -> Self {
        self.exact_match = exact_match;
        self
    }

    pub fn with_same_count(mut self, same_count: bool) -> Self {
        self.same_count = same_count;
        self
    }

    pub fn with_sanitize(mut self, sanitize: bool) -> Self {
        self.sanitize = sanitize;
        self
    }

    pub fn with_skip_keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.skip_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_compare_way(mut self, compare_way: CompareWay) -> Self {
        self.compare_way = compare_way;
        self
    }

    /// Whether collection sizes must agree before diffing.
    pub fn requires_same_count(&self) -> bool {
        self.same_count || self.match_quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = MatchOptions::default();
        assert!(opts.exact_match);
        assert!(opts.same_count);
        assert!(!opts.match_quantity);
        assert!(opts.sanitize);
        assert!(opts.skip_keys.is_empty());
        assert_eq!(opts.compare_way, CompareWay::Both);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let opts: MatchOptions =
            serde_json::from_str(r#"{"exact_match": false, "compare_way": "left"}"#).unwrap();
        assert!(!opts.exact_match);
        assert!(opts.same_count);
        assert_eq!(opts.compare_way, CompareWay::Left);
    }

    #[test]
    fn legacy_quantity_flag_requests_size_check() {
        let opts = MatchOptions::default().with_same_count(false);
        assert!(!opts.requires_same_count());

        let opts = MatchOptions {
            match_quantity: true,
            ..opts
        };
        assert!(opts.requires_same_count());
    }

    #[test]
    fn compare_way_directions() {
        assert!(CompareWay::Left.compares_left());
        assert!(!CompareWay::Left.compares_right());
        assert!(CompareWay::Right.compares_right());
        assert!(!CompareWay::Right.compares_left());
        assert!(CompareWay::Both.compares_left() && CompareWay::Both.compares_right());
    }
}
