//! Anchor and alias bookkeeping.
//!
//! Parsing and composing each keep their own table for one session:
//!
//! - [`ReferenceTable`] records, while parsing, every anchor declared with
//!   ` @name` and every alias read as `#name`. Aliases may come before their
//!   anchor; [`ReferenceTable::check`] runs once the whole document is read
//!   and reports aliases whose anchor never appeared.
//! - `SharedAnchors` decides, while composing, which shared handles get an
//!   anchor. It counts handle identities in a pre-pass, then names each
//!   handle that occurs more than once on its first emission. Counts cover
//!   one compose call; anchor names stay reserved for the whole session so
//!   that consecutive calls never declare the same name twice.
//!
//! ```rust
//! use sigil::{Position, ReferenceTable};
//!
//! let mut table = ReferenceTable::new();
//! table.alias("later", Position::new(1, 3));
//! table.declare("later", Position::new(2, 9)).unwrap();
//! assert!(table.check().is_ok());
//!
//! assert!(table.declare("later", Position::new(3, 1)).is_err());
//! ```

use crate::reader::Position;
use crate::syntax::check_identifier;
use crate::value::{Value, ValueKind};
use crate::{Error, Result};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::trace;

/// Anchors and aliases seen by one parser.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    declared: IndexMap<String, Position>,
    aliases: Vec<(String, Position)>,
}

impl ReferenceTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an anchor declaration.
    ///
    /// A name can be declared once per document; a second declaration is an
    /// ambiguous reference.
    pub fn declare(&mut self, name: &str, position: Position) -> Result<()> {
        if self.declared.contains_key(name) {
            return Err(Error::ambiguous_reference(name, Some(position)));
        }
        trace!(anchor = name, %position, "declared anchor");
        self.declared.insert(name.to_string(), position);
        Ok(())
    }

    /// Records a use of an anchor name.
    pub fn alias(&mut self, name: &str, position: Position) {
        self.aliases.push((name.to_string(), position));
    }

    #[must_use]
    pub fn is_declared(&self, name: &str) -> bool {
        self.declared.contains_key(name)
    }

    /// Where `name` was declared.
    #[must_use]
    pub fn declaration(&self, name: &str) -> Option<Position> {
        self.declared.get(name).copied()
    }

    /// Declared anchor names, in declaration order.
    pub fn declared(&self) -> impl Iterator<Item = &str> {
        self.declared.keys().map(String::as_str)
    }

    /// Aliases whose anchor has not been declared so far.
    pub fn unresolved(&self) -> impl Iterator<Item = (&str, Position)> {
        self.aliases
            .iter()
            .filter(|(name, _)| !self.declared.contains_key(name))
            .map(|(name, position)| (name.as_str(), *position))
    }

    /// Fails with the first alias that has no anchor.
    pub fn check(&self) -> Result<()> {
        match self.unresolved().next() {
            Some((name, position)) => Err(Error::undeclared_reference(name, Some(position))),
            None => Ok(()),
        }
    }
}

/// How a shared handle is emitted at one place in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Occurrence {
    /// The handle occurs once; no anchor is needed.
    Single,
    /// First of several occurrences. Carries the generated anchor name, if
    /// the value did not already have an anchor of its own.
    First(Option<String>),
    /// Any later occurrence: emit an alias to this name.
    Repeat(String),
}

/// Writer-side anchor assignment for shared handles.
#[derive(Debug, Default)]
pub(crate) struct SharedAnchors {
    counts: HashMap<usize, usize>,
    names: HashMap<usize, String>,
    reserved: HashSet<String>,
    prefix: String,
    next: usize,
}

fn identity(handle: &Arc<Value>) -> usize {
    Arc::as_ptr(handle) as usize
}

impl SharedAnchors {
    pub(crate) fn new(prefix: &str) -> Self {
        SharedAnchors {
            prefix: prefix.to_string(),
            ..Default::default()
        }
    }

    /// Forgets the handle counts of the previous compose call.
    ///
    /// Reserved names are kept, so generated names keep counting upwards.
    pub(crate) fn reset(&mut self) {
        self.counts.clear();
        self.names.clear();
    }

    /// Counts shared handles below `value` and reserves its explicit anchors.
    ///
    /// The body behind a handle, and the anchors on the handle's wrapper, are
    /// visited only on its first encounter.
    pub(crate) fn count(&mut self, value: &Value) -> Result<()> {
        if let ValueKind::Shared(handle) = value.payload() {
            let count = self.counts.entry(identity(handle)).or_insert(0);
            *count += 1;
            if *count > 1 {
                return Ok(());
            }
        }

        for anchor in value.anchors() {
            check_identifier(anchor)?;
            if !self.reserved.insert(anchor.clone()) {
                return Err(Error::ambiguous_reference(anchor, None));
            }
        }

        match value.payload() {
            ValueKind::Composite(c) => c.iter().try_for_each(|(_, v)| self.count(v)),
            ValueKind::Array(items) => items.iter().try_for_each(|v| self.count(v)),
            ValueKind::Shared(handle) => self.count(handle),
            _ => Ok(()),
        }
    }

    /// Decides how `handle` is written here. `pending` holds the anchors
    /// already due at this place, which name the handle before its own.
    pub(crate) fn occurrence(
        &mut self,
        handle: &Arc<Value>,
        pending: &[String],
    ) -> Result<Occurrence> {
        let id = identity(handle);
        if let Some(name) = self.names.get(&id) {
            return Ok(Occurrence::Repeat(name.clone()));
        }
        if self.counts.get(&id).copied().unwrap_or(0) <= 1 {
            return Ok(Occurrence::Single);
        }

        let (name, generated) = match pending.first().or_else(|| handle.anchors().first()) {
            Some(own) => (own.clone(), None),
            None => {
                let name = self.fresh_name()?;
                (name.clone(), Some(name))
            }
        };
        trace!(anchor = %name, "assigned anchor to shared value");
        self.names.insert(id, name);
        Ok(Occurrence::First(generated))
    }

    fn fresh_name(&mut self) -> Result<String> {
        loop {
            self.next += 1;
            let name = format!("{}{}", self.prefix, self.next);
            check_identifier(&name)?;
            if self.reserved.insert(name.clone()) {
                return Ok(name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_alias_resolves() {
        let mut table = ReferenceTable::new();
        table.alias("a", Position::new(1, 1));
        assert_eq!(table.unresolved().count(), 1);
        table.declare("a", Position::new(5, 1)).unwrap();
        assert_eq!(table.unresolved().count(), 0);
        assert_eq!(table.declaration("a"), Some(Position::new(5, 1)));
    }

    #[test]
    fn test_undeclared_alias_reported_with_position() {
        let mut table = ReferenceTable::new();
        table.declare("known", Position::new(1, 1)).unwrap();
        table.alias("known", Position::new(1, 10));
        table.alias("missing", Position::new(2, 4));
        let err = table.check().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Undeclared reference 'missing' at line 2, column 4"
        );
    }

    #[test]
    fn test_duplicate_declaration_is_ambiguous() {
        let mut table = ReferenceTable::new();
        table.declare("x", Position::new(1, 1)).unwrap();
        let err = table.declare("x", Position::new(3, 2)).unwrap_err();
        assert!(matches!(err, Error::AmbiguousReference { .. }));
    }

    #[test]
    fn test_shared_anchor_assignment() {
        let shared = Arc::new(Value::from(1));
        let tree = Value::array(vec![
            Value::from(shared.clone()),
            Value::from(Arc::new(Value::from(2))),
            Value::from(shared.clone()),
        ]);

        let mut anchors = SharedAnchors::new("ref");
        anchors.count(&tree).unwrap();
        assert_eq!(
            anchors.occurrence(&shared, &[]).unwrap(),
            Occurrence::First(Some("ref1".to_string()))
        );
        assert_eq!(
            anchors.occurrence(&shared, &[]).unwrap(),
            Occurrence::Repeat("ref1".to_string())
        );
    }

    #[test]
    fn test_generated_names_avoid_explicit_anchors() {
        let shared = Arc::new(Value::from(1));
        let tree = Value::array(vec![
            Value::from("taken").with_anchor("ref1"),
            Value::from(shared.clone()),
            Value::from(shared.clone()),
        ]);

        let mut anchors = SharedAnchors::new("ref");
        anchors.count(&tree).unwrap();
        assert_eq!(
            anchors.occurrence(&shared, &[]).unwrap(),
            Occurrence::First(Some("ref2".to_string()))
        );
    }

    #[test]
    fn test_own_anchor_is_reused() {
        let shared = Arc::new(Value::from(1).with_anchor("one"));
        let tree = Value::array(vec![Value::from(shared.clone()), Value::from(shared.clone())]);

        let mut anchors = SharedAnchors::new("ref");
        anchors.count(&tree).unwrap();
        assert_eq!(anchors.occurrence(&shared, &[]).unwrap(), Occurrence::First(None));
        assert_eq!(
            anchors.occurrence(&shared, &[]).unwrap(),
            Occurrence::Repeat("one".to_string())
        );
    }

    #[test]
    fn test_duplicate_explicit_anchor_rejected() {
        let tree = Value::array(vec![
            Value::from(1).with_anchor("a"),
            Value::from(2).with_anchor("a"),
        ]);
        let mut anchors = SharedAnchors::new("ref");
        assert!(anchors.count(&tree).unwrap_err().is_reference());
    }

    #[test]
    fn test_wrapper_anchor_names_the_handle() {
        let shared = Arc::new(Value::from(1));
        let wrapper = Value::from(shared.clone()).with_anchor("w");
        let tree = Value::array(vec![wrapper.clone(), wrapper]);

        let mut anchors = SharedAnchors::new("ref");
        anchors.count(&tree).unwrap();
        let pending = ["w".to_string()];
        assert_eq!(anchors.occurrence(&shared, &pending).unwrap(), Occurrence::First(None));
        assert_eq!(
            anchors.occurrence(&shared, &pending).unwrap(),
            Occurrence::Repeat("w".to_string())
        );
    }

    #[test]
    fn test_reset_keeps_reserved_names() {
        let shared = Arc::new(Value::from(1));
        let tree = Value::array(vec![Value::from(shared.clone()), Value::from(shared.clone())]);

        let mut anchors = SharedAnchors::new("ref");
        anchors.count(&tree).unwrap();
        anchors.occurrence(&shared, &[]).unwrap();

        anchors.reset();
        assert_eq!(anchors.occurrence(&shared, &[]).unwrap(), Occurrence::Single);
        anchors.count(&tree).unwrap();
        assert_eq!(
            anchors.occurrence(&shared, &[]).unwrap(),
            Occurrence::First(Some("ref2".to_string()))
        );
    }
}
