//! Typed, non-panicking accessors over untyped Kubernetes object trees.
//!
//! Policy objects come back from the API as arbitrary JSON. Every field
//! read in this crate goes through these helpers so a malformed or absent
//! field reads as `None` instead of failing the request.

use serde_json::{Map, Value};

/// Nested-path getters for `serde_json::Value`.
pub trait ValueExt {
    /// Walk a path of object keys.
    fn nested(&self, path: &[&str]) -> Option<&Value>;

    /// String at `path`, if present and a string.
    fn nested_str(&self, path: &[&str]) -> Option<&str> {
        self.nested(path).and_then(Value::as_str)
    }

    /// Array at `path`; absent or non-array reads as empty.
    fn nested_slice(&self, path: &[&str]) -> &[Value] {
        self.nested(path)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Object at `path`, if present and an object.
    fn nested_map(&self, path: &[&str]) -> Option<&Map<String, Value>> {
        self.nested(path).and_then(Value::as_object)
    }

    /// `metadata.name`, empty when missing.
    fn object_name(&self) -> &str {
        self.nested_str(&["metadata", "name"]).unwrap_or_default()
    }

    /// `metadata.namespace`, empty when missing.
    fn object_namespace(&self) -> &str {
        self.nested_str(&["metadata", "namespace"]).unwrap_or_default()
    }
}

impl ValueExt for Value {
    fn nested(&self, path: &[&str]) -> Option<&Value> {
        path.iter().try_fold(self, |current, key| current.get(*key))
    }
}
