//! Scanning of `key="value"` pairs inside a tag.

use crate::entities::unescape;
use crate::reader::{is_space, BufferedReader};
use crate::{Error, ParseErrorKind, Result};
use compact_str::CompactString;
use std::io::Read;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeScan {
    Pair(CompactString, CompactString),
    /// The next byte closes the tag.
    End,
    /// A token ended by `/`, `>` or `?` before any `=`. Not an attribute.
    Bare(CompactString),
}

#[inline(always)]
fn is_tag_end(ch: u8) -> bool {
    matches!(ch, b'/' | b'>' | b'?')
}

pub fn scan_attribute<R: Read>(reader: &mut BufferedReader<R>) -> Result<AttributeScan> {
    reader.skip_whitespace()?;
    if matches!(reader.peek(), Some(ch) if is_tag_end(ch)) {
        return Ok(AttributeScan::End);
    }

    let mut key = Vec::new();
    loop {
        match reader.peek() {
            None | Some(0) => {
                return Err(Error::parse(
                    ParseErrorKind::UnterminatedAttribute(String::from_utf8_lossy(&key).into_owned()),
                    reader.line(),
                ));
            }
            Some(ch) if is_tag_end(ch) => {
                return Ok(AttributeScan::Bare(lossy(&key)));
            }
            Some(b'=') => {
                reader.get()?;
                break;
            }
            Some(ch) => {
                key.push(ch);
                reader.get()?;
            }
        }
    }

    // `key = "v"` leaves blanks before the `=`.
    while key.last().is_some_and(|&ch| is_space(ch)) {
        key.pop();
    }
    let key = lossy(&key);

    reader.skip_whitespace()?;
    let raw = read_quoted(reader, &key)?;
    let value = CompactString::from(unescape(&raw));
    Ok(AttributeScan::Pair(key, value))
}

/// Reads a `"` or `'` delimited value. A missing opening quote yields an empty
/// value and consumes nothing.
fn read_quoted<R: Read>(reader: &mut BufferedReader<R>, key: &str) -> Result<String> {
    let quote = match reader.peek() {
        Some(q @ (b'"' | b'\'')) => q,
        _ => return Ok(String::new()),
    };
    reader.get()?;

    let mut value = Vec::new();
    loop {
        match reader.peek() {
            None | Some(0) => {
                return Err(Error::parse(
                    ParseErrorKind::UnterminatedValue(key.to_string()),
                    reader.line(),
                ));
            }
            Some(ch) if ch == quote => {
                reader.get()?;
                break;
            }
            Some(ch) => {
                value.push(ch);
                reader.get()?;
            }
        }
    }
    Ok(String::from_utf8_lossy(&value).into_owned())
}

fn lossy(bytes: &[u8]) -> CompactString {
    CompactString::from(String::from_utf8_lossy(bytes))
}
