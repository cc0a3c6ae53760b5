//! # Replay Engine
//!
//! Structural matching and diffing of JSON records for scraper fixtures.
//!
//! This crate compares what a scraper produced against what a fixture says
//! it should have produced. It is the pure half of the toolkit: no files, no
//! network, no global state.
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! A [`Record`] is a JSON object. Any serializable value that serializes to
//! an object can be turned into one with [`to_record`]; keys of every depth
//! become text on the way.
//!
//! ### Matching
//!
//! [`matches`] checks one record against a filter record:
//! - exact (default): same field set, same values
//! - partial: the element agrees with every field of the filter
//!
//! Volatile fields (ids, timestamps) are dropped from both sides through
//! [`MatchOptions::skip_keys`].
//!
//! ### Collection diffs
//!
//! [`collection_diff`] pairs the records of two collections one for one and
//! reports what is left on each side. [`collection_match`] and
//! [`match_collections`] build on it.
//!
//! ### Reports
//!
//! The [`report`] module renders unmatched records as the lines printed when
//! a fixture comparison fails.
//!
//! ## Quick Start
//!
//! ```rust
//! use replay_engine::{collection_diff, to_collection, MatchOptions};
//! use serde_json::json;
//!
//! let saved = to_collection(&json!([{"title": "A"}, {"title": "B"}])).unwrap();
//! let expected = to_collection(&json!([{"title": "B"}, {"title": "C"}])).unwrap();
//!
//! let diff = collection_diff(&saved, &expected, &MatchOptions::default());
//! assert!(!diff.matched);
//! assert_eq!(diff.unmatched_a[0]["title"], "A");
//! assert_eq!(diff.unmatched_b[0]["title"], "C");
//! ```

pub mod diff;
pub mod error;
pub mod matcher;
pub mod options;
pub mod record;
pub mod report;
pub mod value;

// Re-export main types at crate root
pub use diff::{collection_diff, collection_match, match_collections, CollectionMatch, DiffResult};
pub use error::{Error, Result};
pub use matcher::matches;
pub use options::{CompareWay, MatchOptions};
pub use record::{delete_keys, field_count, sanitize, to_collection, to_record};
pub use report::{CallerLocation, MatchDiff};
pub use value::values_equal;

/// A single structured item: a JSON object keyed by field name.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// An ordered sequence of records.
pub type Collection = Vec<Record>;
