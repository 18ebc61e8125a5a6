//! Drives the scanner over a stream and reports tags and text to a [`Visitor`].

use crate::reader::{is_space, BufferedReader, DEFAULT_CAPACITY};
use crate::scanner::next_tag;
use crate::tag::{Attributes, Tag, TagKind};
use crate::Result;
use compact_str::CompactString;
use serde::Serialize;
use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

/// Receives the document in order. Returning `false` from any callback ends
/// the traversal immediately.
pub trait Visitor {
    fn enter(&mut self, name: &str, attributes: &Attributes) -> bool;

    fn leave(&mut self, name: &str) -> bool;

    /// Trimmed, non-empty text whose enclosing element is `name`.
    fn data(&mut self, name: &str, text: &str) -> bool;

    /// Text found while no element is open. Dropped unless overridden.
    fn root_data(&mut self, text: &str) -> bool {
        let _ = text;
        true
    }
}

impl<V: Visitor + ?Sized> Visitor for &mut V {
    fn enter(&mut self, name: &str, attributes: &Attributes) -> bool {
        (**self).enter(name, attributes)
    }

    fn leave(&mut self, name: &str) -> bool {
        (**self).leave(name)
    }

    fn data(&mut self, name: &str, text: &str) -> bool {
        (**self).data(name, text)
    }

    fn root_data(&mut self, text: &str) -> bool {
        (**self).root_data(text)
    }
}

/// Three closures as a [`Visitor`].
pub struct FnVisitor<E, L, D> {
    enter: E,
    leave: L,
    data: D,
}

impl<E, L, D> FnVisitor<E, L, D>
where
    E: FnMut(&str, &Attributes) -> bool,
    L: FnMut(&str) -> bool,
    D: FnMut(&str, &str) -> bool,
{
    pub fn new(enter: E, leave: L, data: D) -> Self {
        Self { enter, leave, data }
    }
}

impl<E, L, D> Visitor for FnVisitor<E, L, D>
where
    E: FnMut(&str, &Attributes) -> bool,
    L: FnMut(&str) -> bool,
    D: FnMut(&str, &str) -> bool,
{
    fn enter(&mut self, name: &str, attributes: &Attributes) -> bool {
        (self.enter)(name, attributes)
    }

    fn leave(&mut self, name: &str) -> bool {
        (self.leave)(name)
    }

    fn data(&mut self, name: &str, text: &str) -> bool {
        (self.data)(name, text)
    }
}

/// How a traversal that did not fail ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// End of input. `unclosed` counts opening tags never closed.
    Completed { unclosed: usize },
    /// A callback returned `false`.
    Stopped,
    /// A closing tag did not match the innermost open tag.
    Mismatch {
        expected: Option<CompactString>,
        found: CompactString,
        line: usize,
    },
    /// The input could not be rewound or read at the start.
    Unreadable,
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed { .. })
    }
}

pub struct Traverser {
    buffer_capacity: usize,
}

impl Traverser {
    pub fn new() -> Self {
        Self {
            buffer_capacity: DEFAULT_CAPACITY,
        }
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    pub fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }

    /// Rewinds `input` and walks it from the start.
    ///
    /// Malformed markup is an `Err`; everything else, including a mismatched
    /// closing tag, ends with an [`Outcome`].
    pub fn traverse<R, V>(&self, mut input: R, visitor: &mut V) -> Result<Outcome>
    where
        R: Read + Seek,
        V: Visitor + ?Sized,
    {
        if let Err(e) = input.seek(SeekFrom::Start(0)) {
            log::warn!("Invalid stream: {}", e);
            return Ok(Outcome::Unreadable);
        }
        let reader = match BufferedReader::with_capacity(input, self.buffer_capacity) {
            Ok(reader) => reader,
            Err(e) => {
                log::warn!("Invalid stream: {}", e);
                return Ok(Outcome::Unreadable);
            }
        };

        Walk {
            reader,
            stack: Vec::new(),
            text: Vec::new(),
            visitor,
        }
        .run()
    }

    pub fn traverse_file<P: AsRef<Path>, V: Visitor + ?Sized>(
        &self,
        path: P,
        visitor: &mut V,
    ) -> Result<Outcome> {
        let file = File::open(path)?;
        self.traverse(file, visitor)
    }

    pub fn traverse_bytes<V: Visitor + ?Sized>(&self, data: &[u8], visitor: &mut V) -> Result<Outcome> {
        self.traverse(Cursor::new(data), visitor)
    }

    pub fn traverse_str<V: Visitor + ?Sized>(&self, text: &str, visitor: &mut V) -> Result<Outcome> {
        self.traverse_bytes(text.as_bytes(), visitor)
    }
}

impl Default for Traverser {
    fn default() -> Self {
        Self::new()
    }
}

/// Walks `input` with the default configuration, calling `enter`, `leave` and
/// `data` as tags and text are found.
pub fn traverse<R, E, L, D>(input: R, enter: E, leave: L, data: D) -> Result<Outcome>
where
    R: Read + Seek,
    E: FnMut(&str, &Attributes) -> bool,
    L: FnMut(&str) -> bool,
    D: FnMut(&str, &str) -> bool,
{
    Traverser::new().traverse(input, &mut FnVisitor::new(enter, leave, data))
}

struct Walk<'v, R, V: ?Sized> {
    reader: BufferedReader<R>,
    stack: Vec<Tag>,
    text: Vec<u8>,
    visitor: &'v mut V,
}

impl<R: Read, V: Visitor + ?Sized> Walk<'_, R, V> {
    fn run(mut self) -> Result<Outcome> {
        loop {
            let Some(tag) = next_tag(&mut self.reader)? else {
                let unclosed = self.stack.len();
                if unclosed > 0 {
                    log::debug!("document ended with {} unclosed tag(s)", unclosed);
                }
                return Ok(Outcome::Completed { unclosed });
            };

            let proceed = match tag.kind {
                TagKind::Opening => {
                    let entered = self.visitor.enter(&tag.name, &tag.attributes);
                    self.stack.push(tag);
                    entered && self.trailing_data()?
                }
                TagKind::Closing => {
                    match self.stack.last() {
                        Some(open) if open.name == tag.name => {}
                        open => {
                            let expected = open.map(|t| t.name.clone());
                            let line = self.reader.line();
                            log::warn!(
                                "XML-Error: </{}> at line {} does not close <{}>",
                                tag.name,
                                line,
                                expected.as_deref().unwrap_or("")
                            );
                            return Ok(Outcome::Mismatch {
                                expected,
                                found: tag.name,
                                line,
                            });
                        }
                    }
                    if !self.visitor.leave(&tag.name) {
                        return Ok(Outcome::Stopped);
                    }
                    self.stack.pop();
                    self.trailing_data()?
                }
                TagKind::Empty => {
                    self.visitor.enter(&tag.name, &tag.attributes)
                        && self.visitor.leave(&tag.name)
                        && self.trailing_data()?
                }
                TagKind::Data => deliver(&mut *self.visitor, &self.stack, &tag.name),
                TagKind::Meta => {
                    log::trace!("ignoring <?{}?>", tag.name);
                    true
                }
            };

            if !proceed {
                return Ok(Outcome::Stopped);
            }
        }
    }

    /// Reads the text up to the next `<` and hands it to the innermost open element.
    fn trailing_data(&mut self) -> Result<bool> {
        self.text.clear();
        self.reader.read_until(b'<', &mut self.text)?;
        let text = String::from_utf8_lossy(&self.text);
        let text = text.trim_matches(|c: char| c.is_ascii() && is_space(c as u8));
        if text.is_empty() {
            return Ok(true);
        }
        Ok(deliver(&mut *self.visitor, &self.stack, text))
    }
}

fn deliver<V: Visitor + ?Sized>(visitor: &mut V, stack: &[Tag], text: &str) -> bool {
    match stack.last() {
        Some(open) => visitor.data(&open.name, text),
        None => visitor.root_data(text),
    }
}
