//! Parsed documents and reference resolution.
//!
//! A [`Document`] owns the top-level values of one input together with an
//! index from every anchor name to the place of the value declaring it.
//! Aliases (`#name`) stay in the tree as [`ValueKind::Reference`] values and
//! are resolved through the document on demand, so a document can describe
//! shared and cyclic structures while its tree stays plainly owned.
//!
//! ```rust
//! use sigil::parse;
//!
//! let doc = parse(r#"
//!     { Node
//!         name "a"
//!         next { Node
//!             name "b"
//!             next #head
//!         }
//!     } @head
//! "#).unwrap();
//!
//! let head = &doc[0];
//! let b = head.as_composite().unwrap().get("next").unwrap();
//! let back = doc.resolve(b.as_composite().unwrap().get("next").unwrap()).unwrap();
//! assert!(std::ptr::eq(back, head));
//! ```

use crate::value::{Value, ValueKind};
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::ops::Index;
use std::sync::Arc;

/// One step from a value to one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// The member at this index of a composite.
    Member(usize),
    /// The element at this index of an array.
    Element(usize),
    /// The value behind a shared handle.
    Shared,
}

/// Location of an anchored value: a top-level index and the steps below it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AnchorPath {
    root: usize,
    steps: Vec<Step>,
}

/// The values of one input and the anchors they declare.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    values: Vec<Value>,
    anchors: IndexMap<String, AnchorPath>,
}

impl Document {
    /// Builds a document, indexing anchors and checking every reference.
    ///
    /// Fails if an anchor name is declared twice or a reference names an
    /// anchor that no value declares.
    pub fn new(values: Vec<Value>) -> Result<Self> {
        let mut indexer = Indexer::default();
        for (root, value) in values.iter().enumerate() {
            indexer.visit(value, root, &mut Vec::new())?;
        }
        if let Some(name) = indexer
            .references
            .iter()
            .find(|name| !indexer.anchors.contains_key(*name))
        {
            return Err(Error::undeclared_reference(name, None));
        }

        Ok(Document {
            values,
            anchors: indexer.anchors,
        })
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// Anchor names in the order they appear in the document.
    pub fn anchor_names(&self) -> impl Iterator<Item = &str> {
        self.anchors.keys().map(String::as_str)
    }

    /// The value declared under `name`.
    #[must_use]
    pub fn anchored(&self, name: &str) -> Option<&Value> {
        let path = self.anchors.get(name)?;
        let mut current = self.values.get(path.root)?;
        for step in &path.steps {
            current = match (step, current.payload()) {
                (Step::Member(i), ValueKind::Composite(c)) => c.members().get_index(*i)?.1,
                (Step::Element(i), ValueKind::Array(items)) => items.get(*i)?,
                (Step::Shared, ValueKind::Shared(inner)) => inner.as_ref(),
                _ => return None,
            };
        }
        Some(current)
    }

    /// Follows references and shared handles to the value they denote.
    ///
    /// Any other value resolves to itself. Fails if a reference chain ends at
    /// an undeclared name or never leaves references.
    ///
    /// ```rust
    /// use sigil::parse;
    ///
    /// let doc = parse("[ #b #a ] =1 @a #a @b").unwrap();
    /// let list = doc[0].as_array().unwrap();
    /// assert_eq!(doc.resolve(&list[0]).unwrap().as_numeric().unwrap().as_str(), "1");
    ///
    /// let doc = parse("#x @y #y @x").unwrap();
    /// assert!(doc.resolve(&doc[0]).unwrap_err().is_reference());
    /// ```
    pub fn resolve<'a>(&'a self, value: &'a Value) -> Result<&'a Value> {
        let mut current = value.unshared();
        let mut seen: Vec<&str> = Vec::new();
        while let ValueKind::Reference(name) = current.payload() {
            if seen.contains(&name.as_str()) {
                return Err(Error::ReferenceCycle(name.clone()));
            }
            seen.push(name.as_str());
            current = self
                .anchored(name)
                .ok_or_else(|| Error::undeclared_reference(name, None))?
                .unshared();
        }
        Ok(current)
    }

    /// Deserializes the value at `index`, resolving references through this
    /// document.
    pub fn deserialize<T: DeserializeOwned>(&self, index: usize) -> Result<T> {
        let value = self
            .get(index)
            .ok_or_else(|| Error::custom(format!("document has no value at index {}", index)))?;
        T::deserialize(crate::de::ValueDeserializer::with_document(value, self))
    }
}

impl Index<usize> for Document {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.values[index]
    }
}

impl IntoIterator for Document {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[derive(Default)]
struct Indexer {
    anchors: IndexMap<String, AnchorPath>,
    references: Vec<String>,
    visited: HashSet<usize>,
}

impl Indexer {
    fn visit(&mut self, value: &Value, root: usize, steps: &mut Vec<Step>) -> Result<()> {
        for name in value.anchors() {
            if self.anchors.contains_key(name) {
                return Err(Error::ambiguous_reference(name, None));
            }
            let path = AnchorPath {
                root,
                steps: steps.clone(),
            };
            self.anchors.insert(name.clone(), path);
        }

        match value.payload() {
            ValueKind::Composite(c) => {
                for (i, (_, member)) in c.iter().enumerate() {
                    steps.push(Step::Member(i));
                    self.visit(member, root, steps)?;
                    steps.pop();
                }
            }
            ValueKind::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    steps.push(Step::Element(i));
                    self.visit(item, root, steps)?;
                    steps.pop();
                }
            }
            ValueKind::Shared(inner) => {
                if self.visited.insert(Arc::as_ptr(inner) as usize) {
                    steps.push(Step::Shared);
                    self.visit(inner, root, steps)?;
                    steps.pop();
                }
            }
            ValueKind::Reference(name) => self.references.push(name.clone()),
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Composite;

    #[test]
    fn test_anchor_paths() {
        let doc = Document::new(vec![
            Value::from(1),
            Value::from(
                Composite::new("Box")
                    .with("a", Value::from(2))
                    .with("b", Value::array(vec![Value::from(3), Value::from(4).with_anchor("four")])),
            ),
        ])
        .unwrap();
        assert_eq!(doc.anchored("four").unwrap().to::<i32>().unwrap(), 4);
        assert!(doc.anchored("five").is_none());
    }

    #[test]
    fn test_undeclared_reference_rejected() {
        let err = Document::new(vec![Value::reference("nowhere")]).unwrap_err();
        assert!(matches!(err, Error::UndeclaredReference { .. }));
    }

    #[test]
    fn test_duplicate_anchor_rejected() {
        let err = Document::new(vec![
            Value::from(1).with_anchor("x"),
            Value::from(2).with_anchor("x"),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::AmbiguousReference { .. }));
    }

    #[test]
    fn test_shared_value_indexed_once() {
        let shared = Value::share(Value::from("s").with_anchor("s"));
        let doc = Document::new(vec![Value::array(vec![shared.clone(), shared])]).unwrap();
        assert_eq!(doc.anchored("s").unwrap().as_str(), Some("s"));
    }

    #[test]
    fn test_resolve_follows_chains() {
        let doc = Document::new(vec![
            Value::reference("b").with_anchor("a"),
            Value::reference("c").with_anchor("b"),
            Value::from("end").with_anchor("c"),
        ])
        .unwrap();
        assert_eq!(doc.resolve(&doc[0]).unwrap().as_str(), Some("end"));
        assert_eq!(doc.resolve(&doc[2]).unwrap().as_str(), Some("end"));
    }

    #[test]
    fn test_resolve_detects_cycles() {
        let doc = Document::new(vec![Value::reference("self").with_anchor("self")]).unwrap();
        assert!(matches!(doc.resolve(&doc[0]), Err(Error::ReferenceCycle(_))));
    }
}
