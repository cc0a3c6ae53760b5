//! Record and collection helpers.
//!
//! A record is a plain JSON object. Anything serializable into an object can
//! become a record; serialization turns every key into text at every depth,
//! which is the key normalization applied before matching.

use crate::{value::json_type_name, Collection, Error, Record, Result};
use serde::Serialize;
use serde_json::Value;

/// Convert a serializable value into a record.
pub fn to_record<T: Serialize + ?Sized>(value: &T) -> Result<Record> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::NotAnObject(json_type_name(&other))),
    }
}

/// Convert a serializable value into a collection of records.
pub fn to_collection<T: Serialize + ?Sized>(value: &T) -> Result<Collection> {
    match serde_json::to_value(value)? {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(map) => Ok(map),
                other => Err(Error::InvalidItem {
                    index,
                    got: json_type_name(&other),
                }),
            })
            .collect(),
        other => Err(Error::NotAnArray(json_type_name(&other))),
    }
}

/// Remove every listed key from a record in place.
pub fn delete_keys<'a, K: AsRef<str>>(record: &'a mut Record, keys: &[K]) -> &'a mut Record {
    for key in keys {
        record.shift_remove(key.as_ref());
    }
    record
}

/// Return a sanitized copy of a record with the skip keys removed.
pub fn sanitize<K: AsRef<str>>(record: &Record, skip_keys: &[K]) -> Record {
    let mut copy = record.clone();
    delete_keys(&mut copy, skip_keys);
    copy
}

/// Number of top level fields in a record.
pub fn field_count(record: &Record) -> usize {
    record.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn sample() -> Record {
        to_record(&json!({"a": 1, "b": 2, "c": "3", "d": ["d1", "d2"]})).unwrap()
    }

    #[test]
    fn delete_keys_removes_listed_fields() {
        let mut record = sample();
        delete_keys(&mut record, &["a", "d"]);
        assert_eq!(Value::Object(record), json!({"b": 2, "c": "3"}));
    }

    #[test]
    fn delete_keys_ignores_missing_fields() {
        let mut record = sample();
        delete_keys(&mut record, &["zzz"]);
        assert_eq!(record, sample());
    }

    #[test]
    fn sanitize_leaves_original_untouched() {
        let record = sample();
        let clean = sanitize(&record, &["b", "d"]);
        assert_eq!(Value::Object(clean), json!({"a": 1, "c": "3"}));
        assert_eq!(field_count(&record), 4);
    }

    #[test]
    fn non_text_keys_become_text() {
        let mut inner = BTreeMap::new();
        inner.insert(1u32, "one");
        inner.insert(2u32, "two");
        let mut outer = BTreeMap::new();
        outer.insert(7u8, inner);

        let record = to_record(&outer).unwrap();
        assert_eq!(
            Value::Object(record),
            json!({"7": {"1": "one", "2": "two"}})
        );
    }

    #[test]
    fn to_record_rejects_non_objects() {
        let err = to_record(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, Error::NotAnObject("Array")));
    }

    #[test]
    fn to_collection_requires_objects() {
        let items = to_collection(&json!([{"a": 1}, {"b": 2}])).unwrap();
        assert_eq!(items.len(), 2);

        let err = to_collection(&json!([{"a": 1}, 3])).unwrap_err();
        assert!(matches!(err, Error::InvalidItem { index: 1, got: "Int" }));

        let err = to_collection(&json!({"a": 1})).unwrap_err();
        assert!(matches!(err, Error::NotAnArray("Object")));
    }
}
