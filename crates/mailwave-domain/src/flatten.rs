//! Recursive flattening of a JSON record into a single-level key→value map.
//!
//! Nested objects and array-of-object members are merged into the top level
//! without path prefixes; on key collision the last-visited value wins.
//! Scalars inside arrays are skipped — there is no key to file them under.

use std::collections::BTreeMap;

use serde_json::Value;

/// Flatten `value` into a key→value map of string projections.
///
/// Null becomes the empty string; numbers and booleans are stringified.
pub fn flatten(value: &Value) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    walk(value, &mut out);
    out
}

fn walk(value: &Value, out: &mut BTreeMap<String, String>) {
    let Value::Object(map) = value else {
        return;
    };
    for (key, member) in map {
        match member {
            Value::Object(_) => walk(member, out),
            Value::Array(items) => {
                for item in items {
                    if item.is_object() {
                        walk(item, out);
                    }
                }
            }
            scalar => {
                out.insert(key.clone(), stringify(scalar));
            }
        }
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
