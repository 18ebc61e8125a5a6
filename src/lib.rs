//! microxml - Minimal streaming, event-driven XML traverser
//!
//! Licensed under AGPL-3.0
//!
//! Bytes are pulled through a fixed-size sliding buffer, cut into tags and
//! character data, and reported to a [`Visitor`] in document order:
//!
//! ```
//! use microxml::{EventCollector, Outcome, Traverser};
//!
//! let mut events = EventCollector::new();
//! let outcome = Traverser::new()
//!     .traverse_str("<a>  hello  </a>", &mut events)
//!     .unwrap();
//!
//! assert_eq!(outcome, Outcome::Completed { unclosed: 0 });
//! assert_eq!(events.events().len(), 3);
//! ```

pub mod attributes;
pub mod collect;
pub mod entities;
pub mod reader;
pub mod scanner;
pub mod tag;
pub mod traverse;

pub use collect::{Event, EventCollector, Stats};
pub use reader::BufferedReader;
pub use tag::{Attributes, Tag, TagKind};
pub use traverse::{traverse, FnVisitor, Outcome, Traverser, Visitor};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {kind}")]
    Parse { kind: ParseErrorKind, line: usize },
}

impl Error {
    pub(crate) fn parse(kind: ParseErrorKind, line: usize) -> Self {
        Error::Parse { kind, line }
    }

    /// The malformed-markup kind, if this is a parse failure.
    pub fn parse_kind(&self) -> Option<&ParseErrorKind> {
        match self {
            Error::Parse { kind, .. } => Some(kind),
            Error::Io(_) => None,
        }
    }
}

/// Malformed markup that aborts a traversal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("unterminated tag `{0}`")]
    UnterminatedTag(String),

    #[error("unterminated comment")]
    UnterminatedComment,

    #[error("unterminated CDATA section")]
    UnterminatedCdata,

    #[error("unsupported markup declaration `<!{}`", describe_byte(.0))]
    UnsupportedDeclaration(Option<u8>),

    #[error("unterminated attribute name `{0}`")]
    UnterminatedAttribute(String),

    #[error("unterminated value of attribute `{0}`")]
    UnterminatedValue(String),

    #[error("`/` is not allowed at the end of a {0} tag")]
    MisplacedSlash(TagKind),

    #[error("expected `>`, found {}", describe_byte(.0))]
    ExpectedTagEnd(Option<u8>),
}

fn describe_byte(byte: &Option<u8>) -> String {
    match *byte {
        None => "end of input".to_string(),
        Some(b) if b.is_ascii_graphic() => format!("`{}`", b as char),
        Some(b) => format!("byte 0x{:02x}", b),
    }
}
