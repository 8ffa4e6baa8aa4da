//! core::json
//!
//! Nested lookups over loosely-typed JSON documents.
//!
//! Configuration and platform files are read as `serde_json::Value` so that
//! unknown keys survive a rewrite. These helpers resolve dotted key paths
//! with a default-substitution policy: a missing key, or an intermediate
//! value that is not an object, yields the default instead of an error.
//!
//! # Example
//!
//! ```
//! use regionforge::core::json::{get_nested, get_nested_or};
//! use serde_json::json;
//!
//! let doc = json!({"a": {"b": 1}});
//! assert_eq!(get_nested(&doc, &["a", "b"]), Some(&json!(1)));
//! assert_eq!(get_nested_or(&doc, &["a", "c"], json!("X")), json!("X"));
//! ```

use serde_json::{Map, Value};

/// Resolve `keys` inside `value`.
///
/// Returns `None` if any key is absent or any intermediate value is not an
/// object.
pub fn get_nested<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in keys {
        current = current.as_object()?.get(*key)?;
    }
    Some(current)
}

/// Resolve `keys` inside `value`, returning `default` when the path does
/// not resolve.
pub fn get_nested_or(value: &Value, keys: &[&str], default: Value) -> Value {
    get_nested(value, keys).cloned().unwrap_or(default)
}

/// Resolve `keys` to a string, falling back to `default` when the path does
/// not resolve or the value is not a string.
pub fn get_nested_str<'a>(value: &'a Value, keys: &[&str], default: &'a str) -> &'a str {
    get_nested(value, keys)
        .and_then(Value::as_str)
        .unwrap_or(default)
}

/// Get a mutable object at `keys`, creating (or replacing non-object values
/// with) empty objects along the way.
///
/// The root must already be an object; returns `None` otherwise.
pub fn ensure_object<'a>(
    value: &'a mut Value,
    keys: &[&str],
) -> Option<&'a mut Map<String, Value>> {
    let mut current = value.as_object_mut()?;
    for key in keys {
        let entry = current
            .entry((*key).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = entry.as_object_mut()?;
    }
    Some(current)
}

/// Format a key path for error messages (`a.b.c`).
pub fn dotted(keys: &[&str]) -> String {
    keys.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_lookup_resolves_existing_path() {
        let doc = json!({"a": {"b": 1}});
        assert_eq!(get_nested_or(&doc, &["a", "b"], json!("X")), json!(1));
    }

    #[test]
    fn nested_lookup_missing_leaf_yields_default() {
        let doc = json!({"a": {"b": 1}});
        assert_eq!(get_nested_or(&doc, &["a", "c"], json!("X")), json!("X"));
    }

    #[test]
    fn nested_lookup_through_non_object_yields_default() {
        let doc = json!({"a": {"b": 1}});
        assert_eq!(get_nested_or(&doc, &["a", "b", "c"], json!("X")), json!("X"));

        let doc = json!({"a": [1, 2]});
        assert!(get_nested(&doc, &["a", "0"]).is_none());
    }

    #[test]
    fn nested_lookup_empty_path_is_root() {
        let doc = json!({"a": 1});
        assert_eq!(get_nested(&doc, &[]), Some(&doc));
    }

    #[test]
    fn nested_lookup_keeps_explicit_null() {
        let doc = json!({"a": null});
        assert_eq!(get_nested(&doc, &["a"]), Some(&Value::Null));
    }

    #[test]
    fn nested_str_falls_back_on_wrong_type() {
        let doc = json!({"metadata": {"type": 5, "displayName": "Template"}});
        assert_eq!(get_nested_str(&doc, &["metadata", "type"], ""), "");
        assert_eq!(
            get_nested_str(&doc, &["metadata", "displayName"], ""),
            "Template"
        );
    }

    #[test]
    fn ensure_object_creates_missing_levels() {
        let mut doc = json!({"config": "oops"});
        ensure_object(&mut doc, &["config"])
            .unwrap()
            .insert("logicalId".into(), json!("x"));
        ensure_object(&mut doc, &["metadata"])
            .unwrap()
            .insert("displayName".into(), json!("y"));

        assert_eq!(
            doc,
            json!({"config": {"logicalId": "x"}, "metadata": {"displayName": "y"}})
        );
    }

    #[test]
    fn ensure_object_requires_object_root() {
        let mut doc = json!([1, 2]);
        assert!(ensure_object(&mut doc, &["config"]).is_none());
    }

    #[test]
    fn dotted_joins_keys() {
        assert_eq!(dotted(&["a", "b"]), "a.b");
    }
}
