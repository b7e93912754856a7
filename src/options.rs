//! Configuration options for composing and parsing.
//!
//! - [`ComposeOptions`]: indentation and the prefix of generated anchor names
//! - [`Indent`]: one level of indentation, a tab or a number of spaces
//! - [`ParseOptions`]: limits applied while parsing
//!
//! ## Examples
//!
//! ```rust
//! use sigil::{compose_with_options, ComposeOptions, Indent, Value};
//!
//! let list = Value::array(vec![Value::from(1)]);
//!
//! let options = ComposeOptions::new().with_indent(Indent::Spaces(2));
//! assert_eq!(compose_with_options(&list, options).unwrap(), "[\n  =1\n]\n");
//! ```

/// One level of indentation.
///
/// # Examples
///
/// ```rust
/// use sigil::Indent;
///
/// assert_eq!(Indent::Tab.unit(), "\t");
/// assert_eq!(Indent::Spaces(4).unit(), "    ");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Indent {
    #[default]
    Tab,
    Spaces(usize),
}

impl Indent {
    /// Returns the text of one indentation level.
    #[must_use]
    pub fn unit(&self) -> String {
        match self {
            Indent::Tab => "\t".to_string(),
            Indent::Spaces(n) => " ".repeat(*n),
        }
    }
}

/// Configuration options for the [`Writer`](crate::Writer).
///
/// # Examples
///
/// ```rust
/// use sigil::{ComposeOptions, Indent};
///
/// let options = ComposeOptions::new()
///     .with_indent(Indent::Spaces(4))
///     .with_anchor_prefix("node");
/// assert_eq!(options.anchor_prefix, "node");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ComposeOptions {
    pub indent: Indent,
    /// Generated anchor names are this prefix followed by a counter.
    pub anchor_prefix: String,
    /// Deepest nesting the writer produces; deeper trees fail to compose.
    pub max_depth: usize,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        ComposeOptions {
            indent: Indent::default(),
            anchor_prefix: "ref".to_string(),
            max_depth: 256,
        }
    }
}

impl ComposeOptions {
    /// Creates default options (tab indentation, anchor prefix `ref`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the prefix of generated anchor names.
    ///
    /// The prefix must be an identifier, or composing shared values fails.
    #[must_use]
    pub fn with_anchor_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.anchor_prefix = prefix.into();
        self
    }

    /// Sets the nesting limit, matching [`ParseOptions::max_depth`] so that
    /// composed output parses back with the same limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Configuration options for the [`Parser`](crate::Parser).
///
/// # Examples
///
/// ```rust
/// use sigil::{parse_with_options, ParseOptions};
///
/// let options = ParseOptions::new().with_max_depth(2);
/// assert!(parse_with_options("[ [ ] ]", options.clone()).is_ok());
/// assert!(parse_with_options("[ [ [ ] ] ]", options).unwrap_err().is_format());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Values nested deeper than this are rejected.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions { max_depth: 256 }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
