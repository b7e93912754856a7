//! Ordered member map for composites.
//!
//! [`Members`] wraps an [`IndexMap`] so members are written back in the order
//! they were read or inserted.
//!
//! ## Examples
//!
//! ```rust
//! use sigil::{Members, Value};
//!
//! let mut members = Members::new();
//! members.insert("width".to_string(), Value::from(3));
//! members.insert("height".to_string(), Value::from(4));
//!
//! let names: Vec<_> = members.keys().cloned().collect();
//! assert_eq!(names, vec!["width", "height"]);
//! assert_eq!(members.get("height").and_then(|v| v.as_numeric()).map(|n| n.as_str()), Some("4"));
//! ```

use crate::Value;
use indexmap::IndexMap;

/// An insertion-ordered map of member names to values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Members(IndexMap<String, Value>);

impl Members {
    /// Creates an empty `Members`.
    #[must_use]
    pub fn new() -> Self {
        Members(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Members(IndexMap::with_capacity(capacity))
    }

    /// Inserts a member, keeping the position of an existing member with the
    /// same name and returning its old value.
    ///
    /// ```rust
    /// use sigil::{Members, Value};
    ///
    /// let mut members = Members::new();
    /// assert!(members.insert("key".to_string(), Value::from(1)).is_none());
    /// assert!(members.insert("key".to_string(), Value::from(2)).is_some());
    /// assert_eq!(members.len(), 1);
    /// ```
    pub fn insert(&mut self, name: String, value: Value) -> Option<Value> {
        self.0.insert(name, value)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.0.get_mut(name)
    }

    /// Returns the member at `index` in insertion order.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<(&String, &Value)> {
        self.0.get_index(index)
    }

    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Removes a member, shifting later members down to keep their order.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.shift_remove(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the member names, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    /// Returns an iterator over the member values, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    /// Returns an iterator over the members, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, String, Value> {
        self.0.iter_mut()
    }
}

impl IntoIterator for Members {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Members {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for Members {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Members(IndexMap::from_iter(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_keeps_order() {
        let mut members: Members = ["a", "b", "c"]
            .iter()
            .map(|name| (name.to_string(), Value::text(*name)))
            .collect();
        assert_eq!(members.remove("b").and_then(|v| v.as_str().map(String::from)), Some("b".to_string()));
        let names: Vec<_> = members.keys().map(String::as_str).collect();
        assert_eq!(names, ["a", "c"]);
        assert_eq!(members.get_index(1).map(|(k, _)| k.as_str()), Some("c"));
    }
}
