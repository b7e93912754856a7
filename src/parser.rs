//! The sign-dispatch parser.
//!
//! A [`Parser`] is one parse session: it owns the [`Reader`], the
//! [`Factories`] it dispatches to and the [`ReferenceTable`] of anchors and
//! aliases seen so far.
//!
//! ## Lookahead
//!
//! The parser holds at most one value that was parsed but not yet handed out.
//! [`Parser::has_next`] fills that slot if it is empty and reports whether a
//! value exists; [`Parser::parse_next`] empties it, parsing a fresh value
//! when nothing is cached. Calling `has_next` repeatedly is idempotent.
//!
//! ```rust
//! use sigil::Parser;
//!
//! let mut parser = Parser::new("=1 \"two\"");
//! assert!(parser.has_next().unwrap());
//! assert!(parser.has_next().unwrap());
//! assert_eq!(parser.parse_next().unwrap().kind(), "numeric");
//! assert_eq!(parser.parse_next().unwrap().kind(), "text");
//! assert!(!parser.has_next().unwrap());
//! assert!(parser.parse_next().unwrap_err().is_eof());
//! ```

use crate::document::Document;
use crate::factory::{Factories, ValueFactory};
use crate::options::ParseOptions;
use crate::reader::{Position, Reader, Skip};
use crate::reference::ReferenceTable;
use crate::syntax::ANCHOR_SIGN;
use crate::value::Value;
use crate::{Error, Result};
use tracing::{debug, trace};

/// One parse session over borrowed input.
pub struct Parser<'a> {
    reader: Reader<'a>,
    factories: Factories,
    references: ReferenceTable,
    lookahead: Option<Value>,
    value_start: Position,
    depth: usize,
    options: ParseOptions,
}

impl<'a> Parser<'a> {
    /// Creates a parser with the standard factories.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Parser::with_factories(input, Factories::standard())
    }

    #[must_use]
    pub fn with_factories(input: &'a str, factories: Factories) -> Self {
        Parser {
            reader: Reader::new(input),
            factories,
            references: ReferenceTable::new(),
            lookahead: None,
            value_start: Position::default(),
            depth: 0,
            options: ParseOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Binds `sign` to `factory` for the rest of this session.
    pub fn register<F>(&mut self, sign: char, factory: F)
    where
        F: ValueFactory + 'static,
    {
        self.factories.register(sign, factory);
    }

    #[must_use]
    pub fn factories(&self) -> &Factories {
        &self.factories
    }

    #[must_use]
    pub fn reader(&self) -> &Reader<'a> {
        &self.reader
    }

    pub fn reader_mut(&mut self) -> &mut Reader<'a> {
        &mut self.reader
    }

    #[must_use]
    pub fn references(&self) -> &ReferenceTable {
        &self.references
    }

    pub fn references_mut(&mut self) -> &mut ReferenceTable {
        &mut self.references
    }

    /// Position of the sign of the value most recently dispatched.
    ///
    /// Factories read this first thing to report errors spanning their value.
    #[must_use]
    pub fn value_start(&self) -> Position {
        self.value_start
    }

    /// Returns `true` if another value follows.
    ///
    /// Parses that value into the lookahead slot if the slot is empty.
    /// Reaching the end of the input is not an error here.
    pub fn has_next(&mut self) -> Result<bool> {
        if self.lookahead.is_none() {
            self.lookahead = self.try_parse_next()?;
        }
        Ok(self.lookahead.is_some())
    }

    /// Returns the next value.
    ///
    /// Fails with an end-of-stream error if the input holds no further value.
    pub fn parse_next(&mut self) -> Result<Value> {
        if let Some(value) = self.lookahead.take() {
            return Ok(value);
        }
        match self.try_parse_next()? {
            Some(value) => Ok(value),
            None => Err(Error::unexpected_eof(
                self.reader.position(),
                "a value; trying to read beyond the end of the input",
            )),
        }
    }

    fn try_parse_next(&mut self) -> Result<Option<Value>> {
        let sign = match self.reader.skip_whitespace() {
            Skip::EndOfStream => return Ok(None),
            Skip::NonWhite(c) => c,
        };
        let start = self.reader.position();
        let factory = self
            .factories
            .get(sign)
            .ok_or_else(|| Error::unknown_sign(sign, start))?;

        if self.depth >= self.options.max_depth {
            return Err(Error::format_at(
                start,
                &format!(
                    "values are nested deeper than {} levels",
                    self.options.max_depth
                ),
            ));
        }

        self.reader.read()?;
        self.value_start = start;
        trace!(%sign, position = %start, "dispatching value");

        self.depth += 1;
        let parsed = factory.parse(self);
        self.depth -= 1;
        let mut value = parsed?;

        self.read_anchors(&mut value)?;
        Ok(Some(value))
    }

    /// Reads ` @name` declarations following a value.
    fn read_anchors(&mut self, value: &mut Value) -> Result<()> {
        while self.reader.peek_next_nonwhite() == Some(ANCHOR_SIGN) {
            let position = self.reader.position();
            self.reader.read()?;
            let name = self.reader.read_identifier()?;
            self.references.declare(name, position)?;
            value.add_anchor(name);
        }
        Ok(())
    }

    /// Reads every remaining value into a [`Document`].
    ///
    /// Fails if an alias names an anchor that the document never declares.
    pub fn parse_all(mut self) -> Result<Document> {
        let mut values = Vec::new();
        while self.has_next()? {
            values.push(self.parse_next()?);
        }
        self.references.check()?;

        let document = Document::new(values)?;
        debug!(
            values = document.len(),
            anchors = document.anchor_names().count(),
            "parsed document"
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    #[test]
    fn test_empty_input() {
        let mut parser = Parser::new("  \n ; only a comment\n");
        assert!(!parser.has_next().unwrap());
        let err = parser.parse_next().unwrap_err();
        assert!(err.is_eof());
        assert!(err.to_string().contains("beyond the end"));
    }

    #[test]
    fn test_has_next_does_not_advance() {
        let mut parser = Parser::new("[ =1 ] =2");
        for _ in 0..5 {
            assert!(parser.has_next().unwrap());
        }
        assert_eq!(parser.parse_next().unwrap().kind(), "array");
        assert_eq!(parser.parse_next().unwrap().as_numeric().unwrap().as_str(), "2");
    }

    #[test]
    fn test_unknown_sign_is_format_error() {
        let mut parser = Parser::new("  !oops");
        let err = parser.has_next().unwrap_err();
        assert!(err.is_format());
        assert!(!err.is_eof());
        assert_eq!(err.position(), Some(Position::new(1, 3)));
    }

    #[test]
    fn test_anchors_are_declared() {
        let mut parser = Parser::new("=1 @one @uno \"x\"");
        let value = parser.parse_next().unwrap();
        assert_eq!(value.anchors(), ["one", "uno"]);
        assert!(parser.references().is_declared("uno"));
        assert!(parser.parse_next().unwrap().anchors().is_empty());
    }

    #[test]
    fn test_reference_alias_recorded() {
        let mut parser = Parser::new("#target");
        let value = parser.parse_next().unwrap();
        assert_eq!(value.payload(), &ValueKind::Reference("target".to_string()));
        assert_eq!(parser.references().unresolved().count(), 1);
    }

    #[test]
    fn test_max_depth() {
        let parser = Parser::new("[[[]]]").with_options(ParseOptions::new().with_max_depth(2));
        let err = parser.parse_all().unwrap_err();
        assert!(err.is_format());
        assert_eq!(err.position(), Some(Position::new(1, 3)));

        let parser = Parser::new("[[[]]]").with_options(ParseOptions::new().with_max_depth(3));
        assert!(parser.parse_all().is_ok());
    }

    #[test]
    fn test_register_on_session() {
        let mut parser = Parser::new("~");
        parser.register('~', |_: &mut Parser<'_>| -> Result<Value> { Ok(Value::text("tilde")) });
        assert_eq!(parser.parse_next().unwrap().as_str(), Some("tilde"));
    }
}
