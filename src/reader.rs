//! Fixed-capacity buffered byte reader with one byte of lookahead.

use memchr::{memchr, memchr_iter};
use std::io::{self, Read};

pub const DEFAULT_CAPACITY: usize = 8192;
const MIN_CAPACITY: usize = 2;

/// Whitespace as understood by the scanner (C `isspace` in the "C" locale).
#[inline(always)]
pub fn is_space(ch: u8) -> bool {
    matches!(ch, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Pulls bytes from `R` through a fixed buffer.
///
/// When the cursor reaches the last byte of a full buffer, that byte is moved
/// to the front and the rest of the buffer is refilled behind it, so `peek`
/// stays valid across refills and nothing is read from the stream twice.
pub struct BufferedReader<R> {
    inner: R,
    buffer: Box<[u8]>,
    cursor: usize,
    end: usize,
    line: usize,
}

impl<R: Read> BufferedReader<R> {
    pub fn new(inner: R) -> io::Result<Self> {
        Self::with_capacity(inner, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(mut inner: R, capacity: usize) -> io::Result<Self> {
        let mut buffer = vec![0u8; capacity.max(MIN_CAPACITY)].into_boxed_slice();
        let end = fill(&mut inner, &mut buffer)?;
        Ok(Self {
            inner,
            buffer,
            cursor: 0,
            end,
            line: 1,
        })
    }

    #[inline(always)]
    pub fn good(&self) -> bool {
        self.cursor < self.end
    }

    #[inline(always)]
    pub fn peek(&self) -> Option<u8> {
        if self.good() {
            Some(self.buffer[self.cursor])
        } else {
            None
        }
    }

    /// Current line, counting every newline consumed so far.
    #[inline(always)]
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn get(&mut self) -> io::Result<Option<u8>> {
        if !self.good() {
            return Ok(None);
        }
        let ch = self.buffer[self.cursor];
        if ch == b'\n' {
            self.line += 1;
        }
        self.cursor += 1;
        self.slide_if_needed()?;
        Ok(Some(ch))
    }

    /// Appends bytes to `sink` up to, not including, `delim` or the end of the stream.
    pub fn read_until(&mut self, delim: u8, sink: &mut Vec<u8>) -> io::Result<()> {
        while self.good() {
            // A full buffer keeps its last byte back for the slide.
            let limit = if self.end == self.buffer.len() {
                self.end - 1
            } else {
                self.end
            };
            let window = &self.buffer[self.cursor..limit];
            let (take, found) = match memchr(delim, window) {
                Some(pos) => (pos, true),
                None => (window.len(), false),
            };
            sink.extend_from_slice(&window[..take]);
            self.line += memchr_iter(b'\n', &window[..take]).count();
            self.cursor += take;
            if found {
                return Ok(());
            }
            self.slide_if_needed()?;
        }
        Ok(())
    }

    /// Consumes `literal` byte by byte; stops at the first mismatch, which is consumed too.
    pub fn consume(&mut self, literal: &[u8]) -> io::Result<bool> {
        for &expected in literal {
            if self.get()? != Some(expected) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn skip_whitespace(&mut self) -> io::Result<()> {
        while let Some(ch) = self.peek() {
            if !is_space(ch) {
                break;
            }
            self.get()?;
        }
        Ok(())
    }

    #[inline(always)]
    fn slide_if_needed(&mut self) -> io::Result<()> {
        let capacity = self.buffer.len();
        if self.end == capacity && self.cursor >= capacity - 1 {
            self.buffer[0] = self.buffer[self.cursor];
            self.cursor = 0;
            self.end = 1;
            let read = fill(&mut self.inner, &mut self.buffer[1..])?;
            self.end = read + 1;
        }
        Ok(())
    }
}

/// Reads until `buf` is full or the stream is exhausted.
fn fill<R: Read>(inner: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match inner.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
