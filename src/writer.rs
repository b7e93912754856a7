//! Indentation-aware composition of value trees.
//!
//! The [`Writer`] collects fragments into a pending line and writes the line,
//! prefixed by the current [`Indentation`], on [`Writer::end_line`]. Values are
//! laid out one per line, with the children of composites and arrays one
//! level deeper than their parent:
//!
//! ```text
//! { Ship
//!     name "Argo"
//!     crew =50
//!     cargo [
//!         =1.5
//!         "wool"
//!     ]
//! }
//! ```
//!
//! Shared handles that occur more than once are written in full the first
//! time with an anchor ` @name` and as an alias `#name` everywhere else.
//! Sharing is detected within one [`Writer::compose`] or
//! [`Writer::compose_all`] call; a handle repeated across calls is written
//! in full each time. Anchor names are never reused within one writer.
//!
//! ```rust
//! use sigil::{Composite, Value, Writer};
//!
//! let mut out = Vec::new();
//! let mut writer = Writer::new(&mut out);
//! writer.compose(&Value::from(Composite::new("Empty"))).unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), "{ Empty\n}\n");
//! ```

use crate::escape::escape_text;
use crate::options::ComposeOptions;
use crate::reference::{Occurrence, SharedAnchors};
use crate::syntax::{
    check_identifier, ANCHOR_SIGN, ARRAY_CLOSE, ARRAY_OPEN, COMPOSITE_CLOSE, COMPOSITE_OPEN,
    NUMERIC_SIGN, REFERENCE_SIGN,
};
use crate::value::{Value, ValueKind};
use crate::{Error, Result};
use std::fmt;
use std::io;

/// Current nesting level and the text of one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indentation {
    level: usize,
    unit: String,
}

impl Indentation {
    #[must_use]
    pub fn new(unit: impl Into<String>) -> Self {
        Indentation {
            level: 0,
            unit: unit.into(),
        }
    }

    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn increase(&mut self) {
        self.level += 1;
    }

    /// Steps one level out; does nothing at the outermost level.
    pub fn decrease(&mut self) {
        self.level = self.level.saturating_sub(1);
    }
}

impl fmt::Display for Indentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.level {
            f.write_str(&self.unit)?;
        }
        Ok(())
    }
}

/// One compose session over an output stream.
pub struct Writer<'w> {
    out: &'w mut dyn io::Write,
    line: String,
    indentation: Indentation,
    anchors: SharedAnchors,
    depth: usize,
    max_depth: usize,
}

impl<'w> Writer<'w> {
    pub fn new(out: &'w mut dyn io::Write) -> Self {
        Writer::with_options(out, ComposeOptions::default())
    }

    pub fn with_options(out: &'w mut dyn io::Write, options: ComposeOptions) -> Self {
        Writer {
            out,
            line: String::new(),
            indentation: Indentation::new(options.indent.unit()),
            anchors: SharedAnchors::new(&options.anchor_prefix),
            depth: 0,
            max_depth: options.max_depth,
        }
    }

    /// Appends text to the pending line.
    pub fn write(&mut self, text: &str) {
        self.line.push_str(text);
    }

    /// Appends text to the pending line and ends it.
    pub fn write_line(&mut self, text: &str) -> Result<()> {
        self.write(text);
        self.end_line()
    }

    /// Writes the pending line with the current indentation.
    ///
    /// An empty pending line writes nothing.
    pub fn end_line(&mut self) -> Result<()> {
        if !self.line.is_empty() {
            writeln!(self.out, "{}{}", self.indentation, self.line)?;
            self.line.clear();
        }
        Ok(())
    }

    pub fn indentation(&self) -> &Indentation {
        &self.indentation
    }

    pub fn indentation_mut(&mut self) -> &mut Indentation {
        &mut self.indentation
    }

    /// Appends ` @name` for each anchor.
    pub fn write_anchors<S: AsRef<str>>(&mut self, anchors: &[S]) -> Result<()> {
        for anchor in anchors {
            let anchor = check_identifier(anchor.as_ref())?;
            self.line.push(' ');
            self.line.push(ANCHOR_SIGN);
            self.line.push_str(anchor);
        }
        Ok(())
    }

    /// Writes one top-level value.
    pub fn compose(&mut self, value: &Value) -> Result<()> {
        self.compose_all(std::slice::from_ref(value))
    }

    /// Writes several top-level values.
    ///
    /// A shared handle occurring in more than one of them is written in full
    /// once and aliased elsewhere.
    pub fn compose_all(&mut self, values: &[Value]) -> Result<()> {
        self.anchors.reset();
        self.depth = 0;
        for value in values {
            self.anchors.count(value)?;
        }
        for value in values {
            self.compose_value(value)?;
        }
        self.flush()
    }

    /// Writes a nested value at the current position.
    ///
    /// Extension values call this to write their children.
    pub fn compose_value(&mut self, value: &Value) -> Result<()> {
        self.write_value(value, &[])
    }

    /// Ends the pending line and flushes the output stream.
    pub fn flush(&mut self) -> Result<()> {
        self.end_line()?;
        self.out.flush()?;
        Ok(())
    }

    fn write_value(&mut self, value: &Value, outer_anchors: &[String]) -> Result<()> {
        let mut anchors: Vec<String> = outer_anchors.to_vec();
        anchors.extend(value.anchors().iter().cloned());

        if self.depth >= self.max_depth {
            return Err(Error::custom(format!(
                "values are nested deeper than {} levels",
                self.max_depth
            )));
        }

        if let ValueKind::Shared(handle) = value.payload() {
            return match self.anchors.occurrence(handle, &anchors)? {
                Occurrence::Single | Occurrence::First(None) => self.write_value(handle, &anchors),
                Occurrence::First(Some(generated)) => {
                    anchors.push(generated);
                    self.write_value(handle, &anchors)
                }
                Occurrence::Repeat(name) => {
                    self.write(&REFERENCE_SIGN.to_string());
                    self.write(check_identifier(&name)?);
                    self.end_line()
                }
            };
        }

        self.depth += 1;
        let written = self.write_payload(value.payload());
        self.depth -= 1;
        written?;

        self.write_anchors(&anchors)?;
        self.end_line()
    }

    fn write_payload(&mut self, payload: &ValueKind) -> Result<()> {
        match payload {
            ValueKind::Composite(composite) => {
                let class = check_identifier(composite.class())?;
                self.write_line(&format!("{} {}", COMPOSITE_OPEN, class))?;
                self.indentation.increase();
                for (name, member) in composite.iter() {
                    self.write(check_identifier(name)?);
                    self.write(" ");
                    self.write_value(member, &[])?;
                }
                self.indentation.decrease();
                self.write(&COMPOSITE_CLOSE.to_string());
            }
            ValueKind::Array(items) => {
                self.write_line(&ARRAY_OPEN.to_string())?;
                self.indentation.increase();
                for item in items {
                    self.write_value(item, &[])?;
                }
                self.indentation.decrease();
                self.write(&ARRAY_CLOSE.to_string());
            }
            ValueKind::Numeric(numeric) => {
                self.write(&NUMERIC_SIGN.to_string());
                self.write(numeric.as_str());
            }
            ValueKind::Text(text) => self.write(&escape_text(text)),
            ValueKind::Reference(name) => {
                self.write(&REFERENCE_SIGN.to_string());
                self.write(check_identifier(name)?);
            }
            ValueKind::Extension(extension) => extension.compose(self)?,
            ValueKind::Shared(handle) => self.write_value(handle, &[])?,
        }
        Ok(())
    }
}

impl fmt::Debug for Writer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer")
            .field("line", &self.line)
            .field("indentation", &self.indentation)
            .finish_non_exhaustive()
    }
}
