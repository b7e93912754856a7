//! # sigil
//!
//! An extensible text notation where the first character of every value, its
//! *sign*, selects the factory that parses it.
//!
//! ## The notation
//!
//! ```text
//! ; a comment runs to the end of the line
//! { Ship                       ; composite: class name, then members
//!     name "Argo"              ; text
//!     crew =50                 ; numeric, kept as written
//!     ports [ "Iolcus" "Colchis" ] @route
//!     return #route            ; alias of the value anchored as `route`
//! }
//! ```
//!
//! - `{ Class name value ... }` is a composite with ordered, unique members
//! - `[ value ... ]` is an array
//! - `=literal` is a number whose literal text survives a round trip
//! - `"text"` is text with backslash escapes
//! - `#name` is an alias; ` @name` after a value declares an anchor
//!
//! Aliases may point forward or backward, and may form cycles.
//!
//! ## Key Features
//!
//! - **Extensible**: bind a new sign to a [`ValueFactory`] and the parser
//!   dispatches to it like to the built-in kinds
//! - **Shared values**: the writer anchors a [`Value::share`] handle once and
//!   aliases every further occurrence
//! - **Exact numbers**: [`Numeric`] keeps the literal; conversions to Rust
//!   integers, floats, [`Decimal`] and `BigInt` check for loss
//! - **Serde compatible**: derive `Serialize` and `Deserialize` and go
//!   through [`to_string`] and [`from_str`]
//! - **Positioned errors**: format errors name line and column
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use sigil::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     active: bool,
//! }
//!
//! let user = User { id: 123, name: "Alice".to_string(), active: true };
//!
//! let text = to_string(&user).unwrap();
//! assert_eq!(text, "{ User\n\tid =123\n\tname \"Alice\"\n\tactive \"true\"\n}\n");
//!
//! let back: User = from_str(&text).unwrap();
//! assert_eq!(user, back);
//! ```
//!
//! ### Working with value trees
//!
//! ```rust
//! use sigil::parse;
//!
//! let doc = parse("[ =2 \"dfgfdg\" [] { nothing } ]").unwrap();
//! let kinds: Vec<&str> = doc[0].as_array().unwrap().iter().map(|v| v.kind()).collect();
//! assert_eq!(kinds, ["numeric", "text", "array", "composite"]);
//! ```
//!
//! ## Examples
//!
//! The `demos/` directory holds runnable examples:
//!
//! - **`simple.rs`** - serde round trip of a plain struct
//! - **`macro.rs`** - building values with the `value!` macro
//! - **`dynamic_values.rs`** - walking a parsed document, aliases included
//! - **`custom_factory.rs`** - registering a new sign
//! - **`custom_options.rs`** - indentation and anchor naming
//!
//! Run any example with: `cargo run --example <name>`

pub mod de;
pub mod document;
pub mod error;
pub mod escape;
pub mod factory;
pub mod macros;
pub mod map;
pub mod numeric;
pub mod options;
pub mod parser;
pub mod reader;
pub mod reference;
pub mod ser;
pub mod syntax;
pub mod value;
pub mod writer;

pub use de::{from_value, ValueDeserializer};
pub use document::Document;
pub use error::{Error, Result};
pub use factory::{
    ArrayFactory, CompositeFactory, Factories, NumericFactory, ReferenceFactory, TextFactory,
    ValueFactory,
};
pub use map::Members;
pub use numeric::{Decimal, Numeric};
pub use options::{ComposeOptions, Indent, ParseOptions};
pub use parser::Parser;
pub use reader::{Position, Reader, Skip};
pub use reference::ReferenceTable;
pub use ser::{to_value, ValueSerializer};
pub use value::{Composite, Extension, ExtensionValue, Value, ValueKind};
pub use writer::{Indentation, Writer};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Parses every value of `input` with the standard factories.
///
/// # Examples
///
/// ```rust
/// use sigil::parse;
///
/// let doc = parse("=1 \"two\" [ =3 ]").unwrap();
/// assert_eq!(doc.len(), 3);
/// ```
///
/// # Errors
///
/// Returns a format error with the offending position if the input breaks
/// the grammar, and a reference error if an alias names no anchor.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse(input: &str) -> Result<Document> {
    Parser::new(input).parse_all()
}

/// Parses every value of `input` with a custom factory registry.
///
/// # Errors
///
/// As [`parse`], plus whatever the registered factories report.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_with(input: &str, factories: Factories) -> Result<Document> {
    Parser::with_factories(input, factories).parse_all()
}

/// Parses every value of `input` under the given limits.
///
/// # Errors
///
/// As [`parse`], plus a format error for values nested beyond
/// [`ParseOptions::max_depth`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_with_options(input: &str, options: ParseOptions) -> Result<Document> {
    Parser::new(input).with_options(options).parse_all()
}

/// Reads an I/O stream to the end and parses it.
///
/// # Errors
///
/// Returns [`Error::Io`] if reading fails, otherwise as [`parse`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_reader<R: io::Read>(mut reader: R) -> Result<Document> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    parse(&input)
}

/// Composes one value to a string with default options.
///
/// # Examples
///
/// ```rust
/// use sigil::{compose, Value};
///
/// let list = Value::array(vec![Value::from(1), Value::from("a")]);
/// assert_eq!(compose(&list).unwrap(), "[\n\t=1\n\t\"a\"\n]\n");
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidIdentifier`] if a class, member or anchor name
/// cannot be written.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn compose(value: &Value) -> Result<String> {
    compose_with_options(value, ComposeOptions::default())
}

/// Composes one value to a string.
///
/// # Errors
///
/// As [`compose`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn compose_with_options(value: &Value, options: ComposeOptions) -> Result<String> {
    compose_all_with_options(std::slice::from_ref(value), options)
}

/// Composes several top-level values, sharing anchors between them.
///
/// # Examples
///
/// ```rust
/// use sigil::{compose_all, parse, Value};
///
/// let shared = Value::share(Value::from("s"));
/// let text = compose_all(&[shared.clone(), shared]).unwrap();
/// assert_eq!(text, "\"s\" @ref1\n#ref1\n");
/// assert_eq!(parse(&text).unwrap().len(), 2);
/// ```
///
/// # Errors
///
/// As [`compose`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn compose_all(values: &[Value]) -> Result<String> {
    compose_all_with_options(values, ComposeOptions::default())
}

fn compose_all_with_options(values: &[Value], options: ComposeOptions) -> Result<String> {
    let mut out = Vec::new();
    Writer::with_options(&mut out, options).compose_all(values)?;
    String::from_utf8(out).map_err(|e| Error::custom(e.to_string()))
}

/// Serializes any `T: Serialize` to a string.
///
/// # Examples
///
/// ```rust
/// use sigil::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// assert_eq!(to_string(&Point { x: 1, y: 2 }).unwrap(), "{ Point\n\tx =1\n\ty =2\n}\n");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be represented, for example a map
/// whose keys are not identifiers.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, ComposeOptions::default())
}

/// Serializes any `T: Serialize` to a string with custom options.
///
/// # Examples
///
/// ```rust
/// use sigil::{to_string_with_options, ComposeOptions, Indent};
///
/// let options = ComposeOptions::new().with_indent(Indent::Spaces(4));
/// assert_eq!(to_string_with_options(&vec![1, 2], options).unwrap(), "[\n    =1\n    =2\n]\n");
/// ```
///
/// # Errors
///
/// As [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: ComposeOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    compose_with_options(&to_value(value)?, options)
}

/// Serializes any `T: Serialize` to an I/O stream.
///
/// # Examples
///
/// ```rust
/// use sigil::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &("a", 1)).unwrap();
/// assert_eq!(buffer, b"[\n\t\"a\"\n\t=1\n]\n");
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the stream fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, ComposeOptions::default())
}

/// Serializes any `T: Serialize` to an I/O stream with custom options.
///
/// # Errors
///
/// As [`to_writer`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: ComposeOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let value = to_value(value)?;
    Writer::with_options(&mut writer, options).compose(&value)
}

/// Deserializes an instance of `T` from text holding exactly one value.
///
/// Aliases in the text are resolved, so one anchored value may fill several
/// fields.
///
/// # Examples
///
/// ```rust
/// use sigil::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("{ Point x =1 y =2 }").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the text does not parse, holds no value or more than
/// one, or does not match `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let document = parse(s)?;
    match document.len() {
        1 => document.deserialize(0),
        0 => Err(Error::unexpected_eof(
            Position::default(),
            "a value to deserialize",
        )),
        n => Err(Error::custom(format!(
            "expected a single value to deserialize, found {}",
            n
        ))),
    }
}

/// Deserializes an instance of `T` from UTF-8 bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not UTF-8, otherwise as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}

/// Deserializes an instance of `T` from an I/O stream.
///
/// # Examples
///
/// ```rust
/// use sigil::from_reader;
/// use std::io::Cursor;
///
/// let numbers: Vec<u8> = from_reader(Cursor::new(b"[ =1 =2 ]")).unwrap();
/// assert_eq!(numbers, [1, 2]);
/// ```
///
/// # Errors
///
/// Returns [`Error::Io`] if reading fails, otherwise as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut string = String::new();
    reader.read_to_string(&mut string)?;
    from_str(&string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Crew {
        ship: String,
        members: Vec<String>,
        captain: Option<String>,
    }

    #[test]
    fn test_round_trip() {
        let crew = Crew {
            ship: "Argo".to_string(),
            members: vec!["Jason".to_string(), "Medea".to_string()],
            captain: None,
        };
        let text = to_string(&crew).unwrap();
        assert_eq!(from_str::<Crew>(&text).unwrap(), crew);
    }

    #[test]
    fn test_from_str_requires_one_value() {
        assert!(from_str::<u8>("").unwrap_err().is_eof());
        assert!(from_str::<u8>("=1 =2").is_err());
        assert_eq!(from_str::<u8>("  =1 ; one\n").unwrap(), 1);
    }

    #[test]
    fn test_from_slice_rejects_invalid_utf8() {
        assert!(from_slice::<u8>(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_parse_reader() {
        let doc = parse_reader(std::io::Cursor::new("[ ] { Unit }")).unwrap();
        assert_eq!(doc.len(), 2);
    }
}
