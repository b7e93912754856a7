//! Quoting and escaping of text values.
//!
//! [`escape_text`] and [`read_quoted`] are inverses: any string written by the
//! first is read back unchanged by the second.

use crate::reader::Reader;
use crate::syntax::TEXT_QUOTE;
use crate::{Error, Result};
use std::fmt::Write;

/// Wraps `text` in quotes, escaping quotes, backslashes and control characters.
///
/// ```rust
/// use sigil::escape::escape_text;
///
/// assert_eq!(escape_text("plain"), r#""plain""#);
/// assert_eq!(escape_text("say \"hi\"\n"), r#""say \"hi\"\n""#);
/// assert_eq!(escape_text("\u{7}"), r#""\u{7}""#);
/// ```
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut output = String::with_capacity(text.len() + 2);
    output.push(TEXT_QUOTE);

    for c in text.chars() {
        match c {
            '\\' => output.push_str(r"\\"),
            '"' => output.push_str(r#"\""#),
            '\n' => output.push_str(r"\n"),
            '\r' => output.push_str(r"\r"),
            '\t' => output.push_str(r"\t"),
            '\0' => output.push_str(r"\0"),
            c if c.is_control() => {
                let _ = write!(output, "\\u{{{:x}}}", c as u32);
            }
            c => output.push(c),
        }
    }

    output.push(TEXT_QUOTE);
    output
}

/// Reads the body of a quoted text after its opening quote, consuming the
/// closing quote.
pub fn read_quoted(reader: &mut Reader<'_>) -> Result<String> {
    let start = reader.position();
    let mut output = String::new();

    loop {
        let c = reader.read().map_err(|_| {
            Error::format(start, reader.position(), "unterminated text")
        })?;
        match c {
            TEXT_QUOTE => return Ok(output),
            '\\' => output.push(read_escape(reader)?),
            c => output.push(c),
        }
    }
}

fn read_escape(reader: &mut Reader<'_>) -> Result<char> {
    let start = reader.position();
    let c = reader
        .read()
        .map_err(|_| Error::format_at(start, "unterminated escape sequence"))?;
    match c {
        '\\' => Ok('\\'),
        '"' => Ok('"'),
        'n' => Ok('\n'),
        'r' => Ok('\r'),
        't' => Ok('\t'),
        '0' => Ok('\0'),
        'u' => read_unicode(reader, start),
        other => Err(Error::format(
            start,
            reader.position(),
            &format!("unknown escape sequence '\\{}'", other),
        )),
    }
}

/// Reads `{HEX}` after `\u`.
fn read_unicode(reader: &mut Reader<'_>, start: crate::Position) -> Result<char> {
    if !reader.eat('{') {
        return Err(Error::format(
            start,
            reader.position(),
            "expected '{' after \\u",
        ));
    }
    let hex = reader.read_while(|c| c.is_ascii_hexdigit());
    if hex.is_empty() || hex.len() > 6 || !reader.eat('}') {
        return Err(Error::format(
            start,
            reader.position(),
            "malformed unicode escape",
        ));
    }
    u32::from_str_radix(hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| {
            Error::format(
                start,
                reader.position(),
                &format!("\\u{{{}}} is not a unicode scalar value", hex),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unescape(quoted_body: &str) -> Result<String> {
        let mut reader = Reader::new(quoted_body);
        read_quoted(&mut reader)
    }

    #[test]
    fn test_escape_then_read_back() {
        for text in ["", "plain", "tab\there", "quote\"and\\slash", "line\r\nend", "\0\u{1b}[0m", "ünï 😀"] {
            let escaped = escape_text(text);
            assert_eq!(unescape(&escaped[1..]).unwrap(), text);
        }
    }

    #[test]
    fn test_unicode_escape() {
        assert_eq!(unescape(r#"\u{1F60A}""#).unwrap(), "\u{1F60A}");
        assert_eq!(unescape(r#"a\u{41}b""#).unwrap(), "aAb");
        assert!(unescape(r#"\u{D800}""#).unwrap_err().is_format());
        assert!(unescape(r#"\u41""#).unwrap_err().is_format());
        assert!(unescape(r#"\u{}""#).unwrap_err().is_format());
    }

    #[test]
    fn test_malformed_text() {
        assert!(unescape("never closed").unwrap_err().is_format());
        assert!(unescape(r#"\q""#).unwrap_err().is_format());
        assert!(unescape("\\").unwrap_err().is_format());
    }
}
