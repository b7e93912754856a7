//! Notation syntax reference.
//!
//! This module documents the text form read by the standard factories and
//! written by [`Writer`](crate::Writer), and holds the sign characters and
//! identifier rules shared by both directions.
//!
//! # Overview
//!
//! A document is a whitespace-separated sequence of top-level values. Every
//! value starts with a single *sign* character that selects the factory
//! parsing the rest of it:
//!
//! | Sign | Kind       | Text form                        |
//! |------|------------|----------------------------------|
//! | `{`  | composite  | `{ Class member value ... }`     |
//! | `[`  | array      | `[ value ... ]`                  |
//! | `=`  | numeric    | `=42`, `=-0.500`, `=1e9`, `=NaN` |
//! | `"`  | text       | `"line\nbreak"`                  |
//! | `#`  | reference  | `#name`                          |
//!
//! The sign table is open. Any other character can be bound to a custom
//! factory with [`Factories::register`](crate::Factories::register).
//!
//! # Anchors
//!
//! Any value may be followed by one or more anchor declarations ` @name`.
//! A reference `#name` denotes the value anchored under `name`. References
//! may appear before their anchor anywhere in the same document, which makes
//! cyclic structures expressible:
//!
//! ```text
//! { Node
//!     name "a"
//!     next { Node
//!         name "b"
//!         next #first
//!     }
//! } @first
//! ```
//!
//! # Numeric Literals
//!
//! ```text
//! literal  = [+-]? digits ('.' digits)? ([eE] [+-]? digits)?
//!          | "Infinity" | "-Infinity" | "NaN"
//! ```
//!
//! The literal text is kept verbatim, so `=0.500` is written back as `=0.500`.
//!
//! # Text Escapes
//!
//! ```text
//! \\  - backslash
//! \"  - quote
//! \n  - newline
//! \r  - carriage return
//! \t  - tab
//! \0  - null character
//! \u{1F600} - Unicode scalar value (1 to 6 hex digits)
//! ```
//!
//! # Comments
//!
//! A `;` outside of text starts a comment running to the end of the line.
//! Comments are skipped together with whitespace.
//!
//! # Identifiers
//!
//! Class names, member names and anchor names are non-empty runs of
//! alphanumeric characters and `_`.
//!
//! ```rust
//! use sigil::syntax::is_identifier;
//!
//! assert!(is_identifier("Point"));
//! assert!(is_identifier("_0"));
//! assert!(!is_identifier("two words"));
//! assert!(!is_identifier(""));
//! ```

/// Opens a composite.
pub const COMPOSITE_OPEN: char = '{';
/// Closes a composite.
pub const COMPOSITE_CLOSE: char = '}';
/// Opens an array.
pub const ARRAY_OPEN: char = '[';
/// Closes an array.
pub const ARRAY_CLOSE: char = ']';
/// Starts a numeric literal.
pub const NUMERIC_SIGN: char = '=';
/// Delimits text.
pub const TEXT_QUOTE: char = '"';
/// Starts a reference to an anchored value.
pub const REFERENCE_SIGN: char = '#';
/// Starts an anchor declaration after a value.
pub const ANCHOR_SIGN: char = '@';
/// Starts a comment running to the end of the line.
pub const COMMENT_SIGN: char = ';';

/// Literal for positive infinity.
pub const INFINITY: &str = "Infinity";
/// Literal for negative infinity.
pub const NEG_INFINITY: &str = "-Infinity";
/// Literal for not-a-number.
pub const NAN: &str = "NaN";

/// Returns `true` if `c` may appear in an identifier.
#[inline]
#[must_use]
pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Returns `true` if `s` is a valid class, member or anchor name.
#[must_use]
pub fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_identifier_char)
}

/// Validates an identifier for output.
pub(crate) fn check_identifier(s: &str) -> crate::Result<&str> {
    if is_identifier(s) {
        Ok(s)
    } else {
        Err(crate::Error::invalid_identifier(s))
    }
}
