//! Deserialization of value trees into Rust data.
//!
//! [`ValueDeserializer`] drives any `Deserialize` type from a borrowed
//! [`Value`], following the mapping documented in [`ser`](crate::ser) in
//! reverse. Text is lent out without copying, so `&str` fields borrow from
//! the tree.
//!
//! References are resolved through the [`Document`] the value came from;
//! deserializing a reference without a document fails.
//!
//! ```rust
//! use sigil::from_str;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Pair { left: Vec<u8>, right: Vec<u8> }
//!
//! let pair: Pair = from_str("{ Pair left [ =1 =2 ] @shared right #shared }").unwrap();
//! assert_eq!(pair, Pair { left: vec![1, 2], right: vec![1, 2] });
//! ```

use crate::document::Document;
use crate::ser::{NONE_CLASS, UNIT_CLASS, VARIANT_VALUE};
use crate::value::{Composite, Value, ValueKind};
use crate::{Error, Result};
use serde::de::{self, IntoDeserializer};
use serde::{forward_to_deserialize_any, Deserialize};

/// Nesting at which deserialization gives up, which stops cyclic documents.
const MAX_DEPTH: usize = 128;

/// Deserializes `T` from a value that contains no references.
pub fn from_value<'de, T>(value: &'de Value) -> Result<T>
where
    T: Deserialize<'de>,
{
    T::deserialize(ValueDeserializer::new(value))
}

#[derive(Clone, Copy)]
struct Context<'de> {
    document: Option<&'de Document>,
    depth: usize,
}

/// A `serde` deserializer reading from a borrowed value.
pub struct ValueDeserializer<'de> {
    value: &'de Value,
    cx: Context<'de>,
}

impl<'de> ValueDeserializer<'de> {
    #[must_use]
    pub fn new(value: &'de Value) -> Self {
        ValueDeserializer {
            value,
            cx: Context {
                document: None,
                depth: 0,
            },
        }
    }

    /// Creates a deserializer that resolves references through `document`.
    #[must_use]
    pub fn with_document(value: &'de Value, document: &'de Document) -> Self {
        ValueDeserializer {
            value,
            cx: Context {
                document: Some(document),
                depth: 0,
            },
        }
    }

    fn child(cx: Context<'de>, value: &'de Value) -> Self {
        ValueDeserializer {
            value,
            cx: Context {
                depth: cx.depth + 1,
                ..cx
            },
        }
    }

    /// The value to read, after shared handles and references.
    fn target(&self) -> Result<&'de Value> {
        if self.cx.depth > MAX_DEPTH {
            return Err(Error::custom(format!(
                "values nested deeper than {} levels; the document may be cyclic",
                MAX_DEPTH
            )));
        }
        let value = self.value.unshared();
        match (value.payload(), self.cx.document) {
            (ValueKind::Reference(_), Some(document)) => document.resolve(value),
            (ValueKind::Reference(name), None) => Err(Error::undeclared_reference(name, None)),
            _ => Ok(value),
        }
    }

    fn composite(&self, target: &str) -> Result<&'de Composite> {
        let value = self.target()?;
        value
            .as_composite()
            .ok_or_else(|| value.conversion_error(target))
    }

    fn array(&self, target: &str) -> Result<&'de [Value]> {
        let value = self.target()?;
        value.as_array().ok_or_else(|| value.conversion_error(target))
    }

    fn text(&self, target: &str) -> Result<&'de str> {
        let value = self.target()?;
        value.as_str().ok_or_else(|| value.conversion_error(target))
    }
}

fn is_unit(composite: &Composite) -> bool {
    composite.is_empty() && matches!(composite.class(), NONE_CLASS | UNIT_CLASS)
}

macro_rules! deserialize_numeric {
    ($($method:ident => $visit:ident($to:ident)),* $(,)?) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                let value = self.target()?;
                let numeric = value
                    .as_numeric()
                    .ok_or_else(|| value.conversion_error(stringify!($to)))?;
                visitor.$visit(numeric.$to()?)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for ValueDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let value = self.target()?;
        match value.payload() {
            ValueKind::Composite(c) if is_unit(c) => visitor.visit_unit(),
            ValueKind::Composite(c) => visitor.visit_map(MapDeserializer::new(c, self.cx)),
            ValueKind::Array(items) => visitor.visit_seq(SeqDeserializer::new(items.iter(), self.cx)),
            ValueKind::Numeric(n) => {
                if let Ok(i) = n.to_i64() {
                    visitor.visit_i64(i)
                } else if let Ok(u) = n.to_u64() {
                    visitor.visit_u64(u)
                } else if let Ok(i) = n.to_i128() {
                    visitor.visit_i128(i)
                } else if let Ok(u) = n.to_u128() {
                    visitor.visit_u128(u)
                } else {
                    visitor.visit_f64(n.to_f64()?)
                }
            }
            ValueKind::Text(s) => visitor.visit_borrowed_str(s),
            _ => Err(value.conversion_error("serde data")),
        }
    }

    deserialize_numeric! {
        deserialize_i8 => visit_i8(to_i8),
        deserialize_i16 => visit_i16(to_i16),
        deserialize_i32 => visit_i32(to_i32),
        deserialize_i64 => visit_i64(to_i64),
        deserialize_i128 => visit_i128(to_i128),
        deserialize_u8 => visit_u8(to_u8),
        deserialize_u16 => visit_u16(to_u16),
        deserialize_u32 => visit_u32(to_u32),
        deserialize_u64 => visit_u64(to_u64),
        deserialize_u128 => visit_u128(to_u128),
        deserialize_f32 => visit_f32(to_f32),
        deserialize_f64 => visit_f64(to_f64),
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.text("bool")? {
            "true" => visitor.visit_bool(true),
            "false" => visitor.visit_bool(false),
            other => Err(Error::conversion(
                "text",
                "bool",
                &format!("{:?} is neither \"true\" nor \"false\"", other),
            )),
        }
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let text = self.text("char")?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(Error::conversion(
                "text",
                "char",
                &format!("{:?} is not a single character", text),
            )),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.text("string")?)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let value = self.target()?;
        match value.payload() {
            ValueKind::Text(s) => visitor.visit_borrowed_bytes(s.as_bytes()),
            ValueKind::Array(items) => {
                let bytes = items
                    .iter()
                    .map(|item| ValueDeserializer::child(self.cx, item).target()?.to::<u8>())
                    .collect::<Result<Vec<u8>>>()?;
                visitor.visit_byte_buf(bytes)
            }
            _ => Err(value.conversion_error("bytes")),
        }
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.target()?.as_composite() {
            Some(c) if c.is_empty() && c.class() == NONE_CLASS => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let composite = self.composite("unit")?;
        if composite.is_empty() {
            visitor.visit_unit()
        } else {
            Err(Error::conversion(
                "composite",
                "unit",
                &format!("{} has members", composite.class()),
            ))
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let items = self.array("sequence")?;
        visitor.visit_seq(SeqDeserializer::new(items.iter(), self.cx))
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let composite = self.composite("map")?;
        visitor.visit_map(MapDeserializer::new(composite, self.cx))
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let composite = self.composite(name)?;
        visitor.visit_map(MapDeserializer::new(composite, self.cx))
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let value = self.target()?;
        match value.payload() {
            ValueKind::Composite(c) => visitor.visit_enum(EnumDeserializer {
                composite: c,
                cx: self.cx,
            }),
            ValueKind::Text(s) => {
                let variant: de::value::StrDeserializer<'_, Error> = s.as_str().into_deserializer();
                visitor.visit_enum(variant)
            }
            _ => Err(value.conversion_error("enum")),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

struct SeqDeserializer<'de, I> {
    iter: I,
    cx: Context<'de>,
}

impl<'de, I> SeqDeserializer<'de, I>
where
    I: Iterator<Item = &'de Value>,
{
    fn new(iter: I, cx: Context<'de>) -> Self {
        SeqDeserializer { iter, cx }
    }
}

impl<'de, I> de::SeqAccess<'de> for SeqDeserializer<'de, I>
where
    I: Iterator<Item = &'de Value>,
{
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed
                .deserialize(ValueDeserializer::child(self.cx, value))
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer<'de> {
    iter: indexmap::map::Iter<'de, String, Value>,
    value: Option<&'de Value>,
    cx: Context<'de>,
}

impl<'de> MapDeserializer<'de> {
    fn new(composite: &'de Composite, cx: Context<'de>) -> Self {
        MapDeserializer {
            iter: composite.iter(),
            value: None,
            cx,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer<'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(KeyDeserializer(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        let value = self
            .value
            .take()
            .ok_or_else(|| Error::custom("next_value_seed called before next_key_seed"))?;
        seed.deserialize(ValueDeserializer::child(self.cx, value))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// Member names as map keys; integer keys are parsed from the name.
struct KeyDeserializer<'de>(&'de str);

macro_rules! deserialize_key_integer {
    ($($method:ident => $visit:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                let n: $ty = self.0.parse().map_err(|_| {
                    Error::conversion("member name", stringify!($ty), self.0)
                })?;
                visitor.$visit(n)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for KeyDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.0)
    }

    deserialize_key_integer! {
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let variant: de::value::StrDeserializer<'_, Error> = self.0.into_deserializer();
        visitor.visit_enum(variant)
    }

    forward_to_deserialize_any! {
        bool i128 u128 f32 f64 char str string bytes byte_buf option unit
        unit_struct seq tuple tuple_struct map struct identifier ignored_any
    }
}

struct EnumDeserializer<'de> {
    composite: &'de Composite,
    cx: Context<'de>,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer<'de> {
    type Error = Error;
    type Variant = VariantDeserializer<'de>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(KeyDeserializer(self.composite.class()))?;
        let access = VariantDeserializer {
            composite: self.composite,
            cx: self.cx,
        };
        Ok((variant, access))
    }
}

struct VariantDeserializer<'de> {
    composite: &'de Composite,
    cx: Context<'de>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer<'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Ok(())
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        let value = self.composite.get(VARIANT_VALUE).ok_or_else(|| {
            Error::custom(format!(
                "variant {} has no member {}",
                self.composite.class(),
                VARIANT_VALUE
            ))
        })?;
        seed.deserialize(ValueDeserializer::child(self.cx, value))
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(SeqDeserializer::new(self.composite.members().values(), self.cx))
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(MapDeserializer::new(self.composite, self.cx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Deserialize, Debug, PartialEq)]
    enum Shape {
        Empty,
        Circle(f64),
        Rect(u32, u32),
        Named { label: String },
    }

    #[test]
    fn test_primitives() {
        assert_eq!(from_value::<u16>(&Value::from(7)).unwrap(), 7);
        assert!(from_value::<u8>(&Value::from(700)).is_err());
        assert_eq!(from_value::<f64>(&Value::from(2)).unwrap(), 2.0);
        assert!(from_value::<bool>(&Value::text("true")).unwrap());
        assert!(from_value::<bool>(&Value::text("yes")).is_err());
        assert_eq!(from_value::<char>(&Value::text("x")).unwrap(), 'x');
        assert_eq!(from_value::<&str>(&Value::text("borrowed")).unwrap(), "borrowed");
    }

    #[test]
    fn test_option_and_unit() {
        assert_eq!(from_value::<Option<u8>>(&Value::composite("None")).unwrap(), None);
        assert_eq!(from_value::<Option<u8>>(&Value::from(4)).unwrap(), Some(4));
        assert!(from_value::<()>(&Value::composite("Unit")).is_ok());
    }

    #[test]
    fn test_enums() {
        assert_eq!(from_value::<Shape>(&Value::composite("Empty")).unwrap(), Shape::Empty);
        assert_eq!(from_value::<Shape>(&Value::text("Empty")).unwrap(), Shape::Empty);
        assert_eq!(
            from_value::<Shape>(&Value::from(Composite::new("Circle").with("value", 0.5))).unwrap(),
            Shape::Circle(0.5)
        );
        assert_eq!(
            from_value::<Shape>(&Value::from(Composite::new("Rect").with("_0", 1).with("_1", 2))).unwrap(),
            Shape::Rect(1, 2)
        );
        assert_eq!(
            from_value::<Shape>(&Value::from(Composite::new("Named").with("label", "n"))).unwrap(),
            Shape::Named { label: "n".to_string() }
        );
        assert!(from_value::<Shape>(&Value::composite("Hexagon")).is_err());
    }

    #[test]
    fn test_integer_map_keys() {
        let value = Value::from(Composite::new("Map").with("1", "one").with("2", "two"));
        let map: HashMap<u32, String> = from_value(&value).unwrap();
        assert_eq!(map[&2], "two");
    }

    #[test]
    fn test_reference_without_document() {
        let err = from_value::<u8>(&Value::reference("r")).unwrap_err();
        assert!(err.is_reference());
    }

    #[test]
    fn test_cyclic_document_stops() {
        #[derive(Deserialize, Debug)]
        #[allow(dead_code)]
        struct Node {
            next: Box<Node>,
        }

        let doc = crate::parse("{ Node next #n } @n").unwrap();
        assert!(doc.deserialize::<Node>(0).is_err());
    }
}
