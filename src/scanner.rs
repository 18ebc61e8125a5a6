//! Splits the byte stream into tags.

use crate::attributes::{scan_attribute, AttributeScan};
use crate::reader::{is_space, BufferedReader};
use crate::tag::{Tag, TagKind};
use crate::{Error, ParseErrorKind, Result};
use bitflags::bitflags;
use compact_str::CompactString;
use std::io::Read;

const COMMENT_END: &[u8; 3] = b"-->";
const CDATA_START: &[u8] = b"[CDATA[";
const CDATA_END: &[u8; 3] = b"]]>";

bitflags! {
    /// Parity of the quote characters seen while searching for `<`.
    ///
    /// This is a heuristic: quotes are counted wherever they appear between
    /// tags, so an odd number of apostrophes in plain text hides every `<`
    /// up to the next apostrophe. It is not a quote-aware scanner.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct QuoteParity: u8 {
        const DOUBLE = 0b01;
        const SINGLE = 0b10;
    }
}

/// Returns the next structural tag, or `None` at the end of the document.
///
/// Comments are skipped. A NUL byte outside of a tag ends the document the
/// same way the end of the stream does.
pub fn next_tag<R: Read>(reader: &mut BufferedReader<R>) -> Result<Option<Tag>> {
    'scan: loop {
        let mut quotes = QuoteParity::empty();
        loop {
            match reader.get()? {
                None | Some(0) => return Ok(None),
                Some(b'"') => quotes.toggle(QuoteParity::DOUBLE),
                Some(b'\'') => quotes.toggle(QuoteParity::SINGLE),
                Some(b'<') if quotes.is_empty() => break,
                Some(_) => {}
            }
        }

        let kind = match reader.peek() {
            None | Some(0) => return Ok(None),
            Some(b'/') => {
                reader.get()?;
                TagKind::Closing
            }
            Some(b'?') => {
                reader.get()?;
                TagKind::Meta
            }
            Some(b'!') => {
                reader.get()?;
                let line = reader.line();
                match reader.peek() {
                    Some(b'-') => {
                        if !skip_past(reader, COMMENT_END, None)? {
                            return Err(Error::parse(ParseErrorKind::UnterminatedComment, line));
                        }
                        log::trace!("skipped comment starting at line {}", line);
                        continue 'scan;
                    }
                    Some(b'[') => return read_cdata(reader).map(Some),
                    found => {
                        return Err(Error::parse(
                            ParseErrorKind::UnsupportedDeclaration(found),
                            line,
                        ))
                    }
                }
            }
            Some(_) => TagKind::Opening,
        };

        let name = read_name(reader)?;
        let mut tag = Tag::new(kind, name);
        read_attributes(reader, &mut tag)?;
        close_tag(reader, &mut tag)?;
        return Ok(Some(tag));
    }
}

/// Consumes bytes until the last three match `terminator`. Consumed bytes,
/// terminator excluded, are appended to `sink` when given.
///
/// Returns `false` if the stream ends first.
fn skip_past<R: Read>(
    reader: &mut BufferedReader<R>,
    terminator: &[u8; 3],
    mut sink: Option<&mut Vec<u8>>,
) -> Result<bool> {
    let mut window = [0u8; 3];
    let mut seen = 0usize;
    while let Some(ch) = reader.get()? {
        if seen >= 3 {
            if let Some(sink) = sink.as_deref_mut() {
                sink.push(window[0]);
            }
        }
        window = [window[1], window[2], ch];
        seen += 1;
        if seen >= 3 && &window == terminator {
            return Ok(true);
        }
    }
    Ok(false)
}

fn read_cdata<R: Read>(reader: &mut BufferedReader<R>) -> Result<Tag> {
    let line = reader.line();
    if !reader.consume(CDATA_START)? {
        return Err(Error::parse(
            ParseErrorKind::UnsupportedDeclaration(Some(b'[')),
            line,
        ));
    }
    let mut payload = Vec::new();
    if !skip_past(reader, CDATA_END, Some(&mut payload))? {
        return Err(Error::parse(ParseErrorKind::UnterminatedCdata, line));
    }
    Ok(Tag::new(
        TagKind::Data,
        CompactString::from(String::from_utf8_lossy(&payload)),
    ))
}

fn read_name<R: Read>(reader: &mut BufferedReader<R>) -> Result<CompactString> {
    let mut name = Vec::new();
    loop {
        match reader.peek() {
            None | Some(0) => {
                return Err(Error::parse(
                    ParseErrorKind::UnterminatedTag(String::from_utf8_lossy(&name).into_owned()),
                    reader.line(),
                ));
            }
            Some(ch) if is_space(ch) || ch == b'/' || ch == b'>' => break,
            Some(ch) => {
                name.push(ch);
                reader.get()?;
            }
        }
    }
    Ok(CompactString::from(String::from_utf8_lossy(&name)))
}

fn read_attributes<R: Read>(reader: &mut BufferedReader<R>, tag: &mut Tag) -> Result<()> {
    loop {
        match scan_attribute(reader)? {
            AttributeScan::Pair(key, value) => {
                tag.attributes.insert(key, value);
            }
            AttributeScan::End => return Ok(()),
            AttributeScan::Bare(token) => {
                log::trace!("ignoring bare token `{}` in <{}>", token, tag.name);
                return Ok(());
            }
        }
    }
}

fn close_tag<R: Read>(reader: &mut BufferedReader<R>, tag: &mut Tag) -> Result<()> {
    reader.skip_whitespace()?;
    match reader.peek() {
        Some(b'?') if tag.kind == TagKind::Meta => {
            reader.get()?;
            reader.skip_whitespace()?;
        }
        Some(b'/') => {
            if tag.kind != TagKind::Opening {
                return Err(Error::parse(
                    ParseErrorKind::MisplacedSlash(tag.kind),
                    reader.line(),
                ));
            }
            tag.kind = TagKind::Empty;
            reader.get()?;
            reader.skip_whitespace()?;
        }
        _ => {}
    }

    match reader.peek() {
        Some(b'>') => {
            reader.get()?;
            Ok(())
        }
        found => Err(Error::parse(ParseErrorKind::ExpectedTagEnd(found), reader.line())),
    }
}
