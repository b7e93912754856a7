//! Character-level cursor over the input text.
//!
//! [`Reader`] hands out one character at a time, tracks the line and column of
//! everything it consumes, and knows how to skip whitespace and `;` comments.
//! Factories use it to read the body of the value they parse.
//!
//! ```rust
//! use sigil::{Reader, Skip};
//!
//! let mut reader = Reader::new("  ; comment\n  { Point }");
//! assert_eq!(reader.skip_whitespace(), Skip::NonWhite('{'));
//! assert_eq!(reader.position().to_string(), "line 2, column 3");
//! assert_eq!(reader.read().unwrap(), '{');
//! assert_eq!(reader.read_identifier().unwrap(), "Point");
//! ```

use crate::syntax::{is_identifier_char, COMMENT_SIGN};
use crate::{Error, Result};
use std::fmt;

/// Line and column of a character in the input, both starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new(1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Outcome of [`Reader::skip_whitespace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// The input is exhausted.
    EndOfStream,
    /// Stopped in front of this character, which is not consumed.
    NonWhite(char),
}

/// A cursor over borrowed input text.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    input: &'a str,
    offset: usize,
    position: Position,
}

impl<'a> Reader<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Reader {
            input,
            offset: 0,
            position: Position::default(),
        }
    }

    /// Position of the next character to be read.
    #[inline]
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Renders the current position for diagnostics.
    #[must_use]
    pub fn position_description(&self) -> String {
        self.position.to_string()
    }

    /// Byte offset of the next character to be read.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.input.len()
    }

    /// Returns the next character without consuming it.
    #[inline]
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.input[self.offset..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.position.line += 1;
            self.position.column = 1;
        } else {
            self.position.column += 1;
        }
        Some(ch)
    }

    /// Consumes and returns one character.
    ///
    /// Fails with an end-of-stream error if the input is exhausted.
    pub fn read(&mut self) -> Result<char> {
        let position = self.position;
        self.advance()
            .ok_or_else(|| Error::unexpected_eof(position, "a character"))
    }

    /// Consumes the next character if it equals `expected`.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes `expected` or fails with a format error.
    pub fn expect(&mut self, expected: char) -> Result<()> {
        let position = self.position;
        match self.advance() {
            Some(ch) if ch == expected => Ok(()),
            Some(ch) => Err(Error::format(
                position,
                self.position,
                &format!("expected '{}', found '{}'", expected, ch),
            )),
            None => Err(Error::format_at(
                position,
                &format!("expected '{}', found end of input", expected),
            )),
        }
    }

    /// Advances past whitespace and comments.
    ///
    /// Reports whether it stopped at the end of the input or in front of a
    /// character that is neither whitespace nor part of a comment.
    pub fn skip_whitespace(&mut self) -> Skip {
        loop {
            match self.peek() {
                None => return Skip::EndOfStream,
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some(COMMENT_SIGN) => {
                    while let Some(c) = self.advance() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                Some(c) => return Skip::NonWhite(c),
            }
        }
    }

    /// Skips whitespace and returns the following character without consuming it.
    pub fn peek_next_nonwhite(&mut self) -> Option<char> {
        match self.skip_whitespace() {
            Skip::EndOfStream => None,
            Skip::NonWhite(c) => Some(c),
        }
    }

    /// Consumes characters while `pred` holds and returns them.
    pub fn read_while<F>(&mut self, mut pred: F) -> &'a str
    where
        F: FnMut(char) -> bool,
    {
        let start = self.offset;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.advance();
        }
        let input = self.input;
        &input[start..self.offset]
    }

    /// Skips whitespace and reads an identifier.
    pub fn read_identifier(&mut self) -> Result<&'a str> {
        let start = match self.skip_whitespace() {
            Skip::EndOfStream => {
                return Err(Error::unexpected_eof(self.position, "an identifier"))
            }
            Skip::NonWhite(_) => self.position,
        };
        let ident = self.read_while(is_identifier_char);
        if ident.is_empty() {
            let found = self.peek().map(|c| format!("'{}'", c)).unwrap_or_default();
            return Err(Error::format(
                start,
                self.position,
                &format!("expected an identifier, found {}", found),
            ));
        }
        Ok(ident)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_tracking() {
        let mut reader = Reader::new("ab\ncd");
        assert_eq!(reader.position(), Position::new(1, 1));
        reader.read().unwrap();
        reader.read().unwrap();
        assert_eq!(reader.position(), Position::new(1, 3));
        assert_eq!(reader.read().unwrap(), '\n');
        assert_eq!(reader.position(), Position::new(2, 1));
        assert_eq!(reader.position_description(), "line 2, column 1");
    }

    #[test]
    fn test_read_past_end() {
        let mut reader = Reader::new("x");
        assert_eq!(reader.read().unwrap(), 'x');
        let err = reader.read().unwrap_err();
        assert!(err.is_eof());
    }

    #[test]
    fn test_skip_whitespace_and_comments() {
        let mut reader = Reader::new(" \t\n ; note [\n\r\n  ]");
        assert_eq!(reader.skip_whitespace(), Skip::NonWhite(']'));
        assert_eq!(reader.position(), Position::new(4, 3));

        let mut reader = Reader::new("   ; trailing comment");
        assert_eq!(reader.skip_whitespace(), Skip::EndOfStream);
        assert!(reader.is_at_end());
    }

    #[test]
    fn test_peek_next_nonwhite_does_not_consume() {
        let mut reader = Reader::new("   }");
        assert_eq!(reader.peek_next_nonwhite(), Some('}'));
        assert_eq!(reader.peek_next_nonwhite(), Some('}'));
        assert_eq!(reader.read().unwrap(), '}');
        assert_eq!(reader.peek_next_nonwhite(), None);
    }

    #[test]
    fn test_read_identifier() {
        let mut reader = Reader::new("  member_1 =2");
        assert_eq!(reader.read_identifier().unwrap(), "member_1");
        assert_eq!(reader.peek(), Some(' '));

        let mut reader = Reader::new("  =2");
        let err = reader.read_identifier().unwrap_err();
        assert!(err.is_format());

        let mut reader = Reader::new("   ");
        assert!(reader.read_identifier().unwrap_err().is_eof());
    }

    #[test]
    fn test_expect() {
        let mut reader = Reader::new("}x");
        assert!(reader.expect('}').is_ok());
        assert!(reader.expect('}').unwrap_err().is_format());
        assert!(reader.expect('}').unwrap_err().is_format());
    }
}
