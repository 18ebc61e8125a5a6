//! The fixed escape table applied to attribute values.
//!
//! Only these eight sequences are recognized. Element text is never passed
//! through here.

use memchr::memchr;
use std::borrow::Cow;

pub const ENTITIES: [(&str, &str); 8] = [
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
    ("&#10;", "\n"),
    ("&#xA;", "\n"),
    ("&#9;", "\t"),
];

/// Decodes `value` in a single left-to-right pass.
///
/// Replacements are not rescanned, so `&amp;lt;` becomes `&lt;`. Unknown
/// sequences starting with `&` are kept as they are.
pub fn unescape(value: &str) -> Cow<'_, str> {
    if memchr(b'&', value.as_bytes()).is_none() {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(amp) = memchr(b'&', rest.as_bytes()) {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match ENTITIES.iter().find(|(escaped, _)| rest.starts_with(escaped)) {
            Some((escaped, replacement)) => {
                out.push_str(replacement);
                rest = &rest[escaped.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}
