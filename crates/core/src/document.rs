//! Document type for the collection store.
//!
//! A `Document` is an ordered map from field names to `Value`s. Field order is
//! deterministic (sorted by name) so result sets and persisted snapshots are
//! stable across runs.

use crate::value::Value;
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::fmt;

/// An ordered field map. The unit of storage in a collection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    fields: BTreeMap<String, Value>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Builder-style `set`.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Returns the value of a field, if present.
    #[inline]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns true if the field is present.
    #[inline]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Removes a field, returning its previous value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Returns the number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the document has no fields.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns a new document with `patch`'s fields layered over this one.
    ///
    /// Fields present in the patch replace the existing value; a `Null` in
    /// the patch stores `Null`, it does not remove the field.
    pub fn merged(&self, patch: &Document) -> Document {
        let mut out = self.clone();
        for (k, v) in patch.iter() {
            out.set(k, v.clone());
        }
        out
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Builds a `Document` from `field => value` pairs.
///
/// ```rust
/// use ripple_core::{doc, Value};
///
/// let d = doc! { "id" => 1, "active" => true };
/// assert_eq!(d.get("active"), Some(&Value::Bool(true)));
/// ```
#[macro_export]
macro_rules! doc {
    ( $( $field:expr => $value:expr ),* $(,)? ) => {{
        #[allow(unused_mut)]
        let mut d = $crate::Document::new();
        $( d.set($field, $crate::Value::from($value)); )*
        d
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_document_set_get() {
        let mut d = Document::new();
        d.set("id", 1i64);
        d.set("name", "Alice");

        assert_eq!(d.get("id"), Some(&Value::Int(1)));
        assert_eq!(d.get("name"), Some(&Value::Str("Alice".into())));
        assert_eq!(d.get("missing"), None);
        assert_eq!(d.len(), 2);
    }

    #[test]
    fn test_document_builder() {
        let d = Document::new().with("id", 1i64).with("active", true);
        assert!(d.contains("active"));
        assert!(!d.is_empty());
    }

    #[test]
    fn test_document_macro() {
        let d = doc! { "id" => 7, "score" => 1.5 };
        assert_eq!(d.get("id"), Some(&Value::Int(7)));
        assert_eq!(d.get("score"), Some(&Value::Float(1.5)));

        let empty = doc! {};
        assert!(empty.is_empty());
    }

    #[test]
    fn test_document_merged() {
        let base = doc! { "id" => 1, "name" => "Alice", "age" => 30 };
        let patch = doc! { "age" => 31, "email" => "alice@example.com" };

        let merged = base.merged(&patch);

        assert_eq!(merged.get("id"), Some(&Value::Int(1)));
        assert_eq!(merged.get("age"), Some(&Value::Int(31)));
        assert_eq!(
            merged.get("email"),
            Some(&Value::Str("alice@example.com".into()))
        );
        // base is untouched
        assert_eq!(base.get("age"), Some(&Value::Int(30)));
        assert!(!base.contains("email"));
    }

    #[test]
    fn test_document_merged_null_keeps_field() {
        let base = doc! { "id" => 1, "nickname" => "Al" };
        let patch = doc! { "nickname" => Value::Null };

        let merged = base.merged(&patch);
        assert_eq!(merged.get("nickname"), Some(&Value::Null));
        assert!(merged.contains("nickname"));
    }

    #[test]
    fn test_document_equality_ignores_insertion_order() {
        let a = doc! { "x" => 1, "y" => 2 };
        let b = doc! { "y" => 2, "x" => 1 };
        assert_eq!(a, b);
    }

    #[test]
    fn test_document_display_is_sorted() {
        let d = doc! { "b" => 2, "a" => 1 };
        assert_eq!(d.to_string(), "{a: 1, b: 2}");
    }
}
