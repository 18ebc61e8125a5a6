use ahash::AHashMap;
use compact_str::CompactString;
use std::fmt;

/// Attribute name to unescaped value. A key repeated inside one tag keeps the
/// value of its last occurrence.
pub type Attributes = AHashMap<CompactString, CompactString>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `<a>`
    Opening,
    /// `</a>`
    Closing,
    /// `<a/>`
    Empty,
    /// `<?a ...?>`
    Meta,
    /// `<![CDATA[...]]>`
    Data,
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TagKind::Opening => "opening",
            TagKind::Closing => "closing",
            TagKind::Empty => "empty",
            TagKind::Meta => "meta",
            TagKind::Data => "data",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub kind: TagKind,
    /// Element name, or the verbatim payload for [`TagKind::Data`].
    pub name: CompactString,
    pub attributes: Attributes,
}

impl Tag {
    pub fn new(kind: TagKind, name: impl Into<CompactString>) -> Self {
        Self {
            kind,
            name: name.into(),
            attributes: Attributes::default(),
        }
    }

    /// Payload of a CDATA section.
    pub fn text(&self) -> Option<&str> {
        match self.kind {
            TagKind::Data => Some(self.name.as_str()),
            _ => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(CompactString::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }
}
