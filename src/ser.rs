//! Serialization of Rust data into value trees.
//!
//! [`ValueSerializer`] turns any `Serialize` type into a [`Value`]. The
//! mapping keeps the Rust type names visible in the output:
//!
//! | Rust                         | Value                                        |
//! |------------------------------|----------------------------------------------|
//! | struct `S { a, b }`          | composite `{ S a .. b .. }`                  |
//! | map                          | composite `{ Map key .. }`, keys must be identifiers |
//! | `Vec`, slice, tuple          | array                                        |
//! | integers, floats             | numeric                                      |
//! | `String`, `&str`, `char`     | text                                         |
//! | `bool`                       | text `"true"` / `"false"`                    |
//! | `None`, `()`                 | empty composite `None` / `Unit`              |
//! | unit struct `U`              | empty composite `U`                          |
//! | enum variant `V`             | composite `V`; newtype payload in `value`, tuple payload in `_0`, `_1`, ... |
//!
//! ```rust
//! use sigil::{to_string, to_value};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Point { x: i32, y: i32 }
//!
//! let value = to_value(&Point { x: 1, y: -2 }).unwrap();
//! assert_eq!(value.as_composite().unwrap().class(), "Point");
//! assert_eq!(to_string(&Point { x: 1, y: -2 }).unwrap(), "{ Point\n\tx =1\n\ty =-2\n}\n");
//! ```

use crate::map::Members;
use crate::syntax::is_identifier;
use crate::value::{Composite, Value, ValueKind};
use crate::{Error, Result};
use serde::ser::{self, Serialize};

/// Class of composites produced from maps.
pub const MAP_CLASS: &str = "Map";
/// Class of the composite produced from `None`.
pub const NONE_CLASS: &str = "None";
/// Class of the composite produced from `()`.
pub const UNIT_CLASS: &str = "Unit";
/// Member holding the payload of a newtype variant.
pub const VARIANT_VALUE: &str = "value";

/// Serializes Rust data into a [`Value`].
pub struct ValueSerializer;

/// Collects sequence and tuple elements into an array.
pub struct SerializeVec {
    vec: Vec<Value>,
}

/// Collects struct fields, map entries and variant payloads into a composite.
pub struct SerializeComposite {
    class: String,
    members: Members,
    current_key: Option<String>,
}

/// Serializes `value` into a value tree.
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer)
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeComposite;
    type SerializeMap = SerializeComposite;
    type SerializeStruct = SerializeComposite;
    type SerializeStructVariant = SerializeComposite;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::text(if v { "true" } else { "false" }))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::text(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(v.iter().map(|&b| Value::from(b)).collect())
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::composite(NONE_CLASS))
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::composite(UNIT_CLASS))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value> {
        Ok(Value::composite(name))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::composite(variant))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Ok(Value::from(
            Composite::new(variant).with(VARIANT_VALUE, to_value(value)?),
        ))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeComposite> {
        Ok(SerializeComposite::new(variant))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeComposite> {
        Ok(SerializeComposite::new(MAP_CLASS))
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<SerializeComposite> {
        Ok(SerializeComposite::new(name))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeComposite> {
        Ok(SerializeComposite::new(variant))
    }
}

impl SerializeVec {
    fn new(capacity: usize) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(capacity),
        }
    }
}

impl SerializeComposite {
    fn new(class: &str) -> Self {
        SerializeComposite {
            class: class.to_string(),
            members: Members::new(),
            current_key: None,
        }
    }

    fn push_positional<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let name = format!("_{}", self.members.len());
        self.members.insert(name, to_value(value)?);
        Ok(())
    }

    fn finish(self) -> Value {
        Value::from(Composite::with_members(self.class, self.members))
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::array(self.vec))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleVariant for SerializeComposite {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push_positional(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeMap for SerializeComposite {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = to_value(key)?;
        let name = match key.payload() {
            ValueKind::Text(s) => s.clone(),
            ValueKind::Numeric(n) => n.as_str().to_string(),
            _ => return Err(Error::custom("map keys must be strings or integers")),
        };
        if !is_identifier(&name) {
            return Err(Error::invalid_identifier(&name));
        }
        self.current_key = Some(name);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.members.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for SerializeComposite {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.members.insert(key.to_string(), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeComposite {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeStruct::serialize_field(self, key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    enum Shape {
        Empty,
        Circle(f64),
        Rect(u32, u32),
        Named { label: String },
    }

    #[derive(Serialize)]
    struct Marker;

    #[test]
    fn test_primitives() {
        assert_eq!(to_value(&true).unwrap(), Value::text("true"));
        assert_eq!(to_value(&'c').unwrap(), Value::text("c"));
        assert_eq!(to_value(&u128::MAX).unwrap().as_numeric().unwrap().as_str(), u128::MAX.to_string());
        assert_eq!(to_value(&f64::NAN).unwrap().as_numeric().unwrap().as_str(), "NaN");
    }

    #[test]
    fn test_unit_like_values() {
        assert_eq!(to_value(&Option::<u8>::None).unwrap(), Value::composite("None"));
        assert_eq!(to_value(&Some(3u8)).unwrap(), Value::from(3u8));
        assert_eq!(to_value(&()).unwrap(), Value::composite("Unit"));
        assert_eq!(to_value(&Marker).unwrap(), Value::composite("Marker"));
    }

    #[test]
    fn test_enum_variants() {
        assert_eq!(to_value(&Shape::Empty).unwrap(), Value::composite("Empty"));
        assert_eq!(
            to_value(&Shape::Circle(1.5)).unwrap(),
            Value::from(Composite::new("Circle").with("value", 1.5))
        );
        assert_eq!(
            to_value(&Shape::Rect(2, 3)).unwrap(),
            Value::from(Composite::new("Rect").with("_0", 2u32).with("_1", 3u32))
        );
        assert_eq!(
            to_value(&Shape::Named { label: "l".into() }).unwrap(),
            Value::from(Composite::new("Named").with("label", "l"))
        );
    }

    #[test]
    fn test_map_keys() {
        let mut map = BTreeMap::new();
        map.insert("alpha", 1);
        map.insert("beta", 2);
        let value = to_value(&map).unwrap();
        let composite = value.as_composite().unwrap();
        assert_eq!(composite.class(), "Map");
        assert_eq!(composite.len(), 2);

        let mut numbered = BTreeMap::new();
        numbered.insert(7u32, "seven");
        assert!(to_value(&numbered).unwrap().as_composite().unwrap().get("7").is_some());

        let mut bad = BTreeMap::new();
        bad.insert("two words", 1);
        assert!(matches!(to_value(&bad), Err(Error::InvalidIdentifier(_))));
    }

    #[test]
    fn test_sequences() {
        let value = to_value(&(1u8, "two", [3.0f32])).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].as_array().unwrap()[0].as_numeric().unwrap().as_str(), "3");
    }
}
