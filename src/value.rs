//! The value tree.
//!
//! This module provides [`Value`], the node type produced by factories and
//! consumed by the [`Writer`]. Every value carries a payload ([`ValueKind`])
//! and the anchor names it is declared under.
//!
//! ## Core Types
//!
//! - [`Value`]: a payload plus its anchors
//! - [`ValueKind`]: composite, array, numeric, text, reference, shared handle
//!   or extension
//! - [`Composite`]: a class name with ordered, uniquely named members
//! - [`Extension`] and [`ExtensionValue`]: payloads defined outside this crate
//!
//! ## Ownership
//!
//! Composites and arrays own their children. A [`ValueKind::Reference`] holds
//! only a name, resolved through the [`Document`](crate::Document) that
//! produced it, so a parsed tree can describe a cyclic graph without owning
//! one. Trees built in code share a value by cloning one
//! [`ValueKind::Shared`] handle into several places; the writer anchors it
//! once and aliases the rest.
//!
//! ## Usage Patterns
//!
//! ### Creating Values
//!
//! ```rust
//! use sigil::{Composite, Value};
//!
//! let number = Value::from(42);
//! let text = Value::from("hello");
//! let point = Value::from(
//!     Composite::new("Point").with("x", 1).with("y", 2),
//! );
//! assert_eq!(point.kind(), "composite");
//!
//! // Or with the value! macro
//! use sigil::value;
//! let same = value!({ Point x: 1, y: 2 });
//! assert_eq!(point, same);
//! ```
//!
//! ### Extracting Values
//!
//! ```rust
//! use sigil::Value;
//!
//! let value = Value::from(300);
//! assert_eq!(value.to::<i64>().unwrap(), 300);
//! assert!(value.to::<u8>().is_err());
//! assert!(Value::from("x").to::<i64>().is_err());
//! ```

use crate::map::Members;
use crate::numeric::{Decimal, Numeric};
use crate::writer::Writer;
use crate::{Error, Result};
use num_bigint::BigInt;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Kind tag of composites.
pub const COMPOSITE: &str = "composite";
/// Kind tag of arrays.
pub const ARRAY: &str = "array";
/// Kind tag of numerics.
pub const NUMERIC: &str = "numeric";
/// Kind tag of texts.
pub const TEXT: &str = "text";
/// Kind tag of references.
pub const REFERENCE: &str = "reference";

/// A node of the value tree.
///
/// The payload is fixed at construction; anchors can be added later.
#[derive(Clone, Debug, PartialEq)]
pub struct Value {
    kind: ValueKind,
    anchors: Vec<String>,
}

/// The payload of a [`Value`].
#[derive(Clone, Debug, PartialEq)]
pub enum ValueKind {
    Composite(Composite),
    Array(Vec<Value>),
    Numeric(Numeric),
    Text(String),
    /// The value anchored under this name.
    Reference(String),
    /// A handle that may appear in several places of one tree.
    Shared(Arc<Value>),
    Extension(Extension),
}

impl Value {
    #[must_use]
    pub fn new(kind: ValueKind) -> Self {
        Value {
            kind,
            anchors: Vec::new(),
        }
    }

    /// Creates an empty composite of the given class.
    #[must_use]
    pub fn composite(class: impl Into<String>) -> Self {
        Value::new(ValueKind::Composite(Composite::new(class)))
    }

    #[must_use]
    pub fn array(items: Vec<Value>) -> Self {
        Value::new(ValueKind::Array(items))
    }

    #[must_use]
    pub fn numeric(numeric: Numeric) -> Self {
        Value::new(ValueKind::Numeric(numeric))
    }

    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Value::new(ValueKind::Text(text.into()))
    }

    /// Creates a reference to the value anchored under `name`.
    #[must_use]
    pub fn reference(name: impl Into<String>) -> Self {
        Value::new(ValueKind::Reference(name.into()))
    }

    /// Wraps `value` in a new shared handle.
    ///
    /// Clones of the returned value point at the same allocation, and the
    /// writer emits it once with an anchor and aliases every other place.
    ///
    /// ```rust
    /// use sigil::Value;
    ///
    /// let shared = Value::share(Value::from("common"));
    /// let list = Value::array(vec![shared.clone(), shared]);
    /// assert_eq!(list.to_string(), "[\n\t\"common\" @ref1\n\t#ref1\n]\n");
    /// ```
    #[must_use]
    pub fn share(value: Value) -> Self {
        Value::new(ValueKind::Shared(Arc::new(value)))
    }

    /// Wraps a dialect-defined payload.
    #[must_use]
    pub fn extension<T: ExtensionValue>(value: T) -> Self {
        Value::new(ValueKind::Extension(Extension::new(value)))
    }

    /// The kind tag of this value.
    ///
    /// Shared handles report the kind of the value they point at.
    #[must_use]
    pub fn kind(&self) -> &str {
        match &self.kind {
            ValueKind::Composite(_) => COMPOSITE,
            ValueKind::Array(_) => ARRAY,
            ValueKind::Numeric(_) => NUMERIC,
            ValueKind::Text(_) => TEXT,
            ValueKind::Reference(_) => REFERENCE,
            ValueKind::Shared(inner) => inner.kind(),
            ValueKind::Extension(ext) => ext.kind(),
        }
    }

    #[inline]
    #[must_use]
    pub fn payload(&self) -> &ValueKind {
        &self.kind
    }

    #[must_use]
    pub fn into_payload(self) -> ValueKind {
        self.kind
    }

    /// Anchor names this value is declared under, in declaration order.
    #[inline]
    #[must_use]
    pub fn anchors(&self) -> &[String] {
        &self.anchors
    }

    #[must_use]
    pub fn with_anchor(mut self, name: impl Into<String>) -> Self {
        self.add_anchor(name);
        self
    }

    pub fn add_anchor(&mut self, name: impl Into<String>) {
        self.anchors.push(name.into());
    }

    /// Follows shared handles to the value they point at.
    #[must_use]
    pub fn unshared(&self) -> &Value {
        match &self.kind {
            ValueKind::Shared(inner) => inner.unshared(),
            _ => self,
        }
    }

    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(self.unshared().kind, ValueKind::Composite(_))
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self.unshared().kind, ValueKind::Array(_))
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self.unshared().kind, ValueKind::Numeric(_))
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self.unshared().kind, ValueKind::Text(_))
    }

    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self.unshared().kind, ValueKind::Reference(_))
    }

    #[must_use]
    pub fn is_shared(&self) -> bool {
        matches!(self.kind, ValueKind::Shared(_))
    }

    /// Returns the composite payload, looking through shared handles.
    #[must_use]
    pub fn as_composite(&self) -> Option<&Composite> {
        match &self.unshared().kind {
            ValueKind::Composite(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_composite_mut(&mut self) -> Option<&mut Composite> {
        match &mut self.kind {
            ValueKind::Composite(c) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match &self.unshared().kind {
            ValueKind::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match &mut self.kind {
            ValueKind::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_numeric(&self) -> Option<&Numeric> {
        match &self.unshared().kind {
            ValueKind::Numeric(n) => Some(n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match &self.unshared().kind {
            ValueKind::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the anchor name a reference points at.
    #[must_use]
    pub fn as_reference(&self) -> Option<&str> {
        match &self.unshared().kind {
            ValueKind::Reference(name) => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_shared(&self) -> Option<&Arc<Value>> {
        match &self.kind {
            ValueKind::Shared(inner) => Some(inner),
            _ => None,
        }
    }

    /// Downcasts an extension payload to its concrete type.
    #[must_use]
    pub fn as_extension<T: ExtensionValue>(&self) -> Option<&T> {
        match &self.unshared().kind {
            ValueKind::Extension(ext) => ext.downcast_ref(),
            _ => None,
        }
    }

    /// Converts this value to `T`.
    ///
    /// This is the generic form of the `TryFrom<&Value>` conversions.
    pub fn to<'a, T>(&'a self) -> Result<T>
    where
        T: TryFrom<&'a Value, Error = Error>,
    {
        T::try_from(self)
    }

    pub(crate) fn conversion_error(&self, target: &str) -> Error {
        Error::conversion(
            self.kind(),
            target,
            &format!("a {} value has no {} representation", self.kind(), target),
        )
    }
}

impl fmt::Display for Value {
    /// Composes the value with default options.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = crate::compose(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

/// A class name with ordered, uniquely named members.
///
/// # Examples
///
/// ```rust
/// use sigil::{Composite, Value};
///
/// let ship = Composite::new("Ship")
///     .with("name", "Argo")
///     .with("crew", 50);
///
/// assert_eq!(ship.class(), "Ship");
/// assert_eq!(ship.len(), 2);
/// assert_eq!(ship.get("crew").unwrap().to::<u32>().unwrap(), 50);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Composite {
    class: String,
    members: Members,
}

impl Composite {
    #[must_use]
    pub fn new(class: impl Into<String>) -> Self {
        Composite {
            class: class.into(),
            members: Members::new(),
        }
    }

    #[must_use]
    pub fn with_members(class: impl Into<String>, members: Members) -> Self {
        Composite {
            class: class.into(),
            members,
        }
    }

    #[inline]
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    #[must_use]
    pub fn members(&self) -> &Members {
        &self.members
    }

    pub fn members_mut(&mut self) -> &mut Members {
        &mut self.members
    }

    #[must_use]
    pub fn into_members(self) -> Members {
        self.members
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.members.get(name)
    }

    /// Sets a member, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.members.insert(name.into(), value.into())
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.members.iter()
    }
}

/// A payload kind defined outside this crate.
///
/// Implementors supply the kind tag and know how to compose themselves; a
/// matching [`ValueFactory`](crate::ValueFactory) reads them back.
///
/// ```rust
/// use sigil::{ExtensionValue, Result, Value, Writer};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Flag(bool);
///
/// impl ExtensionValue for Flag {
///     fn kind(&self) -> &str {
///         "flag"
///     }
///
///     fn compose(&self, writer: &mut Writer<'_>) -> Result<()> {
///         writer.write(if self.0 { "?yes" } else { "?no" });
///         Ok(())
///     }
/// }
///
/// let value = Value::extension(Flag(true));
/// assert_eq!(value.kind(), "flag");
/// assert_eq!(value.as_extension::<Flag>(), Some(&Flag(true)));
/// assert_eq!(value.to_string(), "?yes\n");
/// ```
pub trait ExtensionValue: fmt::Debug + Clone + PartialEq + Send + Sync + 'static {
    /// The kind tag reported by [`Value::kind`].
    fn kind(&self) -> &str;

    /// Writes the value's text form. Anchors are appended by the writer.
    fn compose(&self, writer: &mut Writer<'_>) -> Result<()>;
}

trait ErasedExtension: fmt::Debug + Send + Sync {
    fn kind(&self) -> &str;
    fn compose(&self, writer: &mut Writer<'_>) -> Result<()>;
    fn clone_box(&self) -> Box<dyn ErasedExtension>;
    fn eq_dyn(&self, other: &dyn ErasedExtension) -> bool;
    fn as_any(&self) -> &dyn Any;
}

impl<T: ExtensionValue> ErasedExtension for T {
    fn kind(&self) -> &str {
        ExtensionValue::kind(self)
    }

    fn compose(&self, writer: &mut Writer<'_>) -> Result<()> {
        ExtensionValue::compose(self, writer)
    }

    fn clone_box(&self) -> Box<dyn ErasedExtension> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn ErasedExtension) -> bool {
        other.as_any().downcast_ref::<T>() == Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Type-erased [`ExtensionValue`].
#[derive(Debug)]
pub struct Extension(Box<dyn ErasedExtension>);

impl Extension {
    #[must_use]
    pub fn new<T: ExtensionValue>(value: T) -> Self {
        Extension(Box::new(value))
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        self.0.kind()
    }

    pub fn compose(&self, writer: &mut Writer<'_>) -> Result<()> {
        self.0.compose(writer)
    }

    #[must_use]
    pub fn downcast_ref<T: ExtensionValue>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref()
    }
}

impl Clone for Extension {
    fn clone(&self) -> Self {
        Extension(self.0.clone_box())
    }
}

impl PartialEq for Extension {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_dyn(other.0.as_ref())
    }
}

macro_rules! value_from_numeric {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::numeric(Numeric::from(n))
                }
            }
        )*
    };
}

value_from_numeric!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, BigInt, Decimal
);

impl From<Numeric> for Value {
    fn from(n: Numeric) -> Self {
        Value::numeric(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::text(s)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::text(c.to_string())
    }
}

impl From<Composite> for Value {
    fn from(c: Composite) -> Self {
        Value::new(ValueKind::Composite(c))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}

impl From<Arc<Value>> for Value {
    fn from(shared: Arc<Value>) -> Self {
        Value::new(ValueKind::Shared(shared))
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Value::array(iter.into_iter().collect())
    }
}

macro_rules! numeric_try_from {
    ($($ty:ty => $method:ident),* $(,)?) => {
        $(
            impl TryFrom<&Value> for $ty {
                type Error = Error;

                fn try_from(value: &Value) -> Result<Self> {
                    value
                        .as_numeric()
                        .ok_or_else(|| value.conversion_error(stringify!($ty)))?
                        .$method()
                }
            }
        )*
    };
}

numeric_try_from! {
    i8 => to_i8,
    i16 => to_i16,
    i32 => to_i32,
    i64 => to_i64,
    i128 => to_i128,
    isize => to_isize,
    u8 => to_u8,
    u16 => to_u16,
    u32 => to_u32,
    u64 => to_u64,
    u128 => to_u128,
    usize => to_usize,
    f32 => to_f32,
    f64 => to_f64,
    Decimal => to_decimal,
    BigInt => to_bigint,
}

impl TryFrom<&Value> for String {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        value
            .as_str()
            .map(String::from)
            .ok_or_else(|| value.conversion_error("string"))
    }
}

impl<'a> TryFrom<&'a Value> for &'a str {
    type Error = Error;

    fn try_from(value: &'a Value) -> Result<Self> {
        value.as_str().ok_or_else(|| value.conversion_error("string"))
    }
}

impl<'a> TryFrom<&'a Value> for &'a Composite {
    type Error = Error;

    fn try_from(value: &'a Value) -> Result<Self> {
        value
            .as_composite()
            .ok_or_else(|| value.conversion_error(COMPOSITE))
    }
}

impl<'a> TryFrom<&'a Value> for &'a [Value] {
    type Error = Error;

    fn try_from(value: &'a Value) -> Result<Self> {
        value.as_array().ok_or_else(|| value.conversion_error(ARRAY))
    }
}

impl<'a> TryFrom<&'a Value> for &'a Numeric {
    type Error = Error;

    fn try_from(value: &'a Value) -> Result<Self> {
        value.as_numeric().ok_or_else(|| value.conversion_error(NUMERIC))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(Value::composite("A").kind(), "composite");
        assert_eq!(Value::array(vec![]).kind(), "array");
        assert_eq!(Value::from(1.5).kind(), "numeric");
        assert_eq!(Value::from("s").kind(), "text");
        assert_eq!(Value::reference("a").kind(), "reference");
        assert_eq!(Value::share(Value::from("s")).kind(), "text");
    }

    #[test]
    fn test_anchors() {
        let mut value = Value::from(1).with_anchor("one");
        value.add_anchor("uno");
        assert_eq!(value.anchors(), ["one", "uno"]);
        assert_ne!(value, Value::from(1));
    }

    #[test]
    fn test_accessors_look_through_shared() {
        let shared = Value::share(Value::from(Composite::new("P").with("x", 1)));
        assert!(shared.is_shared());
        assert!(shared.is_composite());
        assert_eq!(shared.as_composite().map(Composite::class), Some("P"));
        assert_eq!(shared.unshared().kind(), "composite");
    }

    #[test]
    fn test_shared_clones_are_one_allocation() {
        let a = Value::share(Value::from(1));
        let b = a.clone();
        assert!(Arc::ptr_eq(a.as_shared().unwrap(), b.as_shared().unwrap()));
    }

    #[test]
    fn test_conversions() {
        let n = Value::from(42u8);
        assert_eq!(n.to::<i128>().unwrap(), 42);
        assert_eq!(n.to::<f32>().unwrap(), 42.0);
        assert_eq!(n.to::<BigInt>().unwrap(), BigInt::from(42));

        let text = Value::from("hi");
        assert_eq!(text.to::<String>().unwrap(), "hi");
        assert_eq!(text.to::<&str>().unwrap(), "hi");

        let err = text.to::<u32>().unwrap_err();
        assert!(matches!(err, Error::Conversion { ref kind, .. } if kind == "text"));

        let list = Value::from(vec![Value::from(1)]);
        assert_eq!(list.to::<&[Value]>().unwrap().len(), 1);
        assert!(list.to::<&Composite>().is_err());
    }

    #[test]
    fn test_composite_member_order() {
        let mut c = Composite::new("Order").with("z", 1).with("a", 2);
        assert!(c.insert("z", 3).is_some());
        let names: Vec<_> = c.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["z", "a"]);
        assert_eq!(c.get("z").unwrap().to::<i32>().unwrap(), 3);
    }

    #[test]
    fn test_collect_into_array() {
        let value: Value = (1..=3).map(Value::from).collect();
        assert_eq!(value.as_array().unwrap().len(), 3);
    }
}
