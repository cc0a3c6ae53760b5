//! Single record matching.

use crate::{record::sanitize, value::values_equal, MatchOptions, Record};
use serde_json::Value;
use std::borrow::Cow;

/// Check whether `element` satisfies `filter`.
///
/// With `exact_match` both records must carry the same number of fields and
/// every filter key must be present on the element. Without it the element
/// only needs to agree with the filter on the filter's fields; a field the
/// element lacks reads as `null`.
pub fn matches(element: &Record, filter: &Record, options: &MatchOptions) -> bool {
    let (element, filter) = prepare(element, filter, options);

    if options.exact_match && element.len() != filter.len() {
        return false;
    }

    filter.iter().all(|(key, expected)| match element.get(key) {
        Some(actual) => values_equal(actual, expected),
        None if options.exact_match => false,
        None => values_equal(&Value::Null, expected),
    })
}

fn prepare<'a>(
    element: &'a Record,
    filter: &'a Record,
    options: &MatchOptions,
) -> (Cow<'a, Record>, Cow<'a, Record>) {
    // Keys are already text once a value is a record, so only skip keys matter
    if options.sanitize && !options.skip_keys.is_empty() {
        (
            Cow::Owned(sanitize(element, &options.skip_keys)),
            Cow::Owned(sanitize(filter, &options.skip_keys)),
        )
    } else {
        (Cow::Borrowed(element), Cow::Borrowed(filter))
    }
}
