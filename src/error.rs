//! Error types for parsing and composing sigil documents.
//!
//! Every failure the crate can report is a variant of [`Error`]. Errors raised
//! while reading text carry the [`Position`] (line and column) of the offending
//! input so the caller can locate it.
//!
//! ## Error Categories
//!
//! - **End of stream**: [`Error::UnexpectedEof`], raised only when a value was
//!   demanded and none remains
//! - **Format errors**: [`Error::Format`], [`Error::UnknownSign`] and
//!   [`Error::InvalidLiteral`]; the input violates the grammar
//! - **Reference errors**: an alias names an anchor that is never declared, a
//!   name is declared twice, or aliases only point at each other
//! - **Conversion errors**: a typed accessor cannot represent the value
//!
//! ## Examples
//!
//! ```rust
//! use sigil::parse;
//!
//! let err = parse("[ =1 ").unwrap_err();
//! assert!(err.is_format());
//! assert!(err.to_string().contains("line 1"));
//! ```

use crate::reader::Position;
use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while parsing or composing.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// A value was demanded but the input holds no further value
    #[error("Unexpected end of input at {position}: expected {expected}")]
    UnexpectedEof { position: Position, expected: String },

    /// The input between two positions violates the grammar
    #[error("Format error from {start} to {end}: {msg}")]
    Format {
        start: Position,
        end: Position,
        msg: String,
    },

    /// A dispatch character has no registered factory
    #[error("No factory registered for a value starting with '{sign}' at {position}")]
    UnknownSign { sign: char, position: Position },

    /// A numeric literal does not match the numeric grammar
    #[error("Invalid numeric literal {0:?}")]
    InvalidLiteral(String),

    /// An alias names an anchor that is not declared in the document
    #[error("Undeclared reference '{name}'{location}")]
    UndeclaredReference { name: String, location: String },

    /// The same anchor name is declared more than once
    #[error("Ambiguous reference: anchor '{name}' is declared more than once{location}")]
    AmbiguousReference { name: String, location: String },

    /// Aliases only lead to other aliases
    #[error("Reference '{0}' never resolves to a value")]
    ReferenceCycle(String),

    /// A value cannot be represented as the requested target
    #[error("Cannot convert {kind} value to {target}: {msg}")]
    Conversion {
        kind: String,
        target: String,
        msg: String,
    },

    /// A class, member or anchor name is not an identifier
    #[error("Invalid identifier {0:?}")]
    InvalidIdentifier(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates an end-of-stream error.
    pub fn unexpected_eof(position: Position, expected: &str) -> Self {
        Error::UnexpectedEof {
            position,
            expected: expected.to_string(),
        }
    }

    /// Creates a format error spanning the input from `start` to `end`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sigil::{Error, Position};
    ///
    /// let err = Error::format(Position::new(1, 3), Position::new(2, 1), "unterminated array");
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Format error from line 1, column 3 to line 2, column 1: unterminated array"
    /// );
    /// ```
    pub fn format(start: Position, end: Position, msg: &str) -> Self {
        Error::Format {
            start,
            end,
            msg: msg.to_string(),
        }
    }

    /// Creates a format error at a single position.
    pub fn format_at(position: Position, msg: &str) -> Self {
        Self::format(position, position, msg)
    }

    /// Creates an error for a dispatch character without a factory.
    pub fn unknown_sign(sign: char, position: Position) -> Self {
        Error::UnknownSign { sign, position }
    }

    /// Creates an invalid numeric literal error.
    pub fn invalid_literal(literal: &str) -> Self {
        Error::InvalidLiteral(literal.to_string())
    }

    /// Creates an undeclared reference error, with the alias position when known.
    pub fn undeclared_reference(name: &str, position: Option<Position>) -> Self {
        Error::UndeclaredReference {
            name: name.to_string(),
            location: describe(position),
        }
    }

    /// Creates an ambiguous reference error, with the second declaration when known.
    pub fn ambiguous_reference(name: &str, position: Option<Position>) -> Self {
        Error::AmbiguousReference {
            name: name.to_string(),
            location: describe(position),
        }
    }

    /// Creates a conversion error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sigil::Error;
    ///
    /// let err = Error::conversion("numeric", "i8", "300 is out of range");
    /// assert!(err.to_string().contains("to i8"));
    /// ```
    pub fn conversion(kind: &str, target: &str, msg: &str) -> Self {
        Error::Conversion {
            kind: kind.to_string(),
            target: target.to_string(),
            msg: msg.to_string(),
        }
    }

    /// Creates an invalid identifier error.
    pub fn invalid_identifier(name: &str) -> Self {
        Error::InvalidIdentifier(name.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for stream reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` for the end-of-stream condition raised by
    /// [`Parser::parse_next`](crate::Parser::parse_next).
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self, Error::UnexpectedEof { .. })
    }

    /// Returns `true` if the input violates the grammar.
    #[must_use]
    pub fn is_format(&self) -> bool {
        matches!(
            self,
            Error::Format { .. } | Error::UnknownSign { .. } | Error::InvalidLiteral(_)
        )
    }

    /// Returns `true` for undeclared, ambiguous and cyclic references.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Error::UndeclaredReference { .. }
                | Error::AmbiguousReference { .. }
                | Error::ReferenceCycle(_)
        )
    }

    /// The position where the error was detected, if it came from the reader.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::UnexpectedEof { position, .. } | Error::UnknownSign { position, .. } => {
                Some(*position)
            }
            Error::Format { end, .. } => Some(*end),
            _ => None,
        }
    }
}

fn describe(position: Option<Position>) -> String {
    position.map(|p| format!(" at {}", p)).unwrap_or_default()
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::io(&err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let eof = Error::unexpected_eof(Position::new(3, 1), "a value");
        assert!(eof.is_eof());
        assert!(!eof.is_format());

        let sign = Error::unknown_sign('!', Position::new(1, 2));
        assert!(sign.is_format());
        assert!(!sign.is_eof());
        assert_eq!(sign.position(), Some(Position::new(1, 2)));

        assert!(Error::undeclared_reference("a", None).is_reference());
        assert!(Error::ReferenceCycle("a".to_string()).is_reference());
    }

    #[test]
    fn test_reference_location() {
        let err = Error::undeclared_reference("node", Some(Position::new(4, 7)));
        assert_eq!(
            err.to_string(),
            "Undeclared reference 'node' at line 4, column 7"
        );

        let err = Error::undeclared_reference("node", None);
        assert_eq!(err.to_string(), "Undeclared reference 'node'");
    }
}
