//! Factory registry and the standard factories.
//!
//! A factory parses one kind of value. The [`Parser`] has already consumed the
//! sign character when it calls [`ValueFactory::parse`]; the factory reads
//! the rest of the value from [`Parser::reader_mut`] and may ask the parser for
//! nested values with [`Parser::has_next`] and [`Parser::parse_next`].
//!
//! ## Registering a factory
//!
//! ```rust
//! use sigil::{Factories, Parser, Result, Value};
//!
//! let mut factories = Factories::standard();
//! // `?yes` and `?no` read as the numbers 1 and 0
//! factories.register('?', |parser: &mut Parser<'_>| -> Result<Value> {
//!     let word = parser.reader_mut().read_identifier()?;
//!     Ok(Value::from(if word == "yes" { 1 } else { 0 }))
//! });
//!
//! let doc = sigil::parse_with("[ ?yes ?no ]", factories).unwrap();
//! let items = doc[0].as_array().unwrap();
//! assert_eq!(items[0].as_numeric().unwrap().as_str(), "1");
//! ```

use crate::numeric::Numeric;
use crate::parser::Parser;
use crate::syntax::{
    is_identifier_char, ARRAY_CLOSE, ARRAY_OPEN, COMPOSITE_CLOSE, COMPOSITE_OPEN, NUMERIC_SIGN,
    REFERENCE_SIGN, TEXT_QUOTE,
};
use crate::value::{Composite, Value};
use crate::{escape, Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Parses the value that follows a sign character.
pub trait ValueFactory: Send + Sync {
    fn parse(&self, parser: &mut Parser<'_>) -> Result<Value>;
}

impl<F> ValueFactory for F
where
    F: Fn(&mut Parser<'_>) -> Result<Value> + Send + Sync,
{
    fn parse(&self, parser: &mut Parser<'_>) -> Result<Value> {
        self(parser)
    }
}

/// Maps sign characters to factories.
#[derive(Clone, Default)]
pub struct Factories {
    table: HashMap<char, Arc<dyn ValueFactory>>,
}

impl Factories {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the composite, array, numeric, text and
    /// reference factories.
    #[must_use]
    pub fn standard() -> Self {
        let mut factories = Factories::new();
        factories.register(COMPOSITE_OPEN, CompositeFactory);
        factories.register(ARRAY_OPEN, ArrayFactory);
        factories.register(NUMERIC_SIGN, NumericFactory);
        factories.register(TEXT_QUOTE, TextFactory);
        factories.register(REFERENCE_SIGN, ReferenceFactory);
        factories
    }

    /// Binds `sign` to `factory`, returning the factory it replaces.
    ///
    /// The last registration for a sign wins.
    pub fn register<F>(&mut self, sign: char, factory: F) -> Option<Arc<dyn ValueFactory>>
    where
        F: ValueFactory + 'static,
    {
        let previous = self.table.insert(sign, Arc::new(factory));
        if previous.is_some() {
            trace!(%sign, "replaced factory");
        }
        previous
    }

    /// Looks up the factory for `sign`.
    #[must_use]
    pub fn get(&self, sign: char) -> Option<Arc<dyn ValueFactory>> {
        self.table.get(&sign).cloned()
    }

    #[must_use]
    pub fn contains(&self, sign: char) -> bool {
        self.table.contains_key(&sign)
    }

    /// Registered signs, sorted.
    #[must_use]
    pub fn signs(&self) -> Vec<char> {
        let mut signs: Vec<char> = self.table.keys().copied().collect();
        signs.sort_unstable();
        signs
    }
}

impl fmt::Debug for Factories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factories")
            .field("signs", &self.signs())
            .finish()
    }
}

/// Parses `{ Class member value ... }`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeFactory;

impl ValueFactory for CompositeFactory {
    fn parse(&self, parser: &mut Parser<'_>) -> Result<Value> {
        let start = parser.value_start();
        let class = parser.reader_mut().read_identifier()?;
        let mut composite = Composite::new(class);

        loop {
            match parser.reader_mut().peek_next_nonwhite() {
                Some(COMPOSITE_CLOSE) => break,
                None => {
                    return Err(Error::format(
                        start,
                        parser.reader().position(),
                        &format!("composite {} is not closed", class),
                    ))
                }
                Some(_) => {}
            }

            let name_start = parser.reader().position();
            let name = parser.reader_mut().read_identifier()?;
            let missing = matches!(
                parser.reader_mut().peek_next_nonwhite(),
                None | Some(COMPOSITE_CLOSE)
            );
            if missing || !parser.has_next()? {
                return Err(Error::format(
                    name_start,
                    parser.reader().position(),
                    &format!("member {} of {} has no value", name, class),
                ));
            }
            let value = parser.parse_next()?;

            if composite.get(name).is_some() {
                return Err(Error::format(
                    name_start,
                    parser.reader().position(),
                    &format!("member {} of {} is defined twice", name, class),
                ));
            }
            composite.insert(name, value);
        }

        parser.reader_mut().expect(COMPOSITE_CLOSE)?;
        Ok(Value::from(composite))
    }
}

/// Parses `[ value ... ]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayFactory;

impl ValueFactory for ArrayFactory {
    fn parse(&self, parser: &mut Parser<'_>) -> Result<Value> {
        let start = parser.value_start();
        let mut items = Vec::new();

        loop {
            match parser.reader_mut().peek_next_nonwhite() {
                Some(ARRAY_CLOSE) => break,
                None => {
                    return Err(Error::format(
                        start,
                        parser.reader().position(),
                        "array is not closed",
                    ))
                }
                Some(_) => items.push(parser.parse_next()?),
            }
        }

        parser.reader_mut().expect(ARRAY_CLOSE)?;
        Ok(Value::array(items))
    }
}

/// Parses `=literal`, keeping the literal text.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericFactory;

impl ValueFactory for NumericFactory {
    fn parse(&self, parser: &mut Parser<'_>) -> Result<Value> {
        let start = parser.value_start();
        let literal = parser
            .reader_mut()
            .read_while(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        Numeric::new(literal).map(Value::from).map_err(|_| {
            Error::format(
                start,
                parser.reader().position(),
                &format!("invalid numeric literal {:?}", literal),
            )
        })
    }
}

/// Parses quoted text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFactory;

impl ValueFactory for TextFactory {
    fn parse(&self, parser: &mut Parser<'_>) -> Result<Value> {
        escape::read_quoted(parser.reader_mut()).map(Value::text)
    }
}

/// Parses `#name` and records the alias with the parser's reference table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceFactory;

impl ValueFactory for ReferenceFactory {
    fn parse(&self, parser: &mut Parser<'_>) -> Result<Value> {
        let start = parser.value_start();
        let name = parser.reader_mut().read_while(is_identifier_char);
        if name.is_empty() {
            return Err(Error::format(
                start,
                parser.reader().position(),
                "reference has no name",
            ));
        }
        parser.references_mut().alias(name, start);
        Ok(Value::reference(name))
    }
}
