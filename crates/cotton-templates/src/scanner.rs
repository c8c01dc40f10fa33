//! Tag grammar for component tags.
//!
//! ```text
//! opening   := "<c-" name attrs? ("/")? ">"
//! closing   := "</c-" name ws* ">"
//! name      := [A-Za-z0-9_.-]+
//! attrs     := (ws+ attribute)*
//! attribute := ":"? attr-name ("=" value)?
//! attr-name := [A-Za-z0-9_.:@-]+
//! value     := '"' [^"]* '"' | "'" [^']* "'" | [^\s>]+
//! ```
//!
//! A `<` preceded by a backslash never starts a tag. A tag ends at the first
//! `>` after its name, which may sit on a later line.

use cotton_source::Offset;
use cotton_source::Span;
use memchr::memchr;
use memchr::memrchr;

use crate::names::is_name_char;
use crate::names::ComponentName;

const OPENING_PREFIX: &str = "<c-";
const CLOSING_PREFIX: &str = "</c-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Opening,
    Closing,
}

impl TagKind {
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            TagKind::Opening => OPENING_PREFIX,
            TagKind::Closing => CLOSING_PREFIX,
        }
    }
}

/// A component tag located in document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOccurrence {
    pub name: ComponentName,
    pub kind: TagKind,
    /// Offset of the opening `<`.
    pub start: Offset,
    /// The name alone, without the prefix or anything after it.
    pub name_span: Span,
    /// Offset of the terminating `>`, `None` while the tag is still open.
    pub end: Option<Offset>,
    pub self_closing: bool,
}

impl TagOccurrence {
    #[must_use]
    pub fn is_closing(&self) -> bool {
        self.kind == TagKind::Closing
    }

    /// Prefix plus name, `<c-forms.input` for `<c-forms.input a="b">`.
    #[must_use]
    pub fn head_span(&self) -> Span {
        Span::from_bounds(self.start.as_usize(), self.name_span.end_usize())
    }

    /// The whole tag through its `>`, or through the end of `text` when the
    /// tag is still open.
    #[must_use]
    pub fn full_span(&self, text: &str) -> Span {
        let end = self.end.map_or(text.len(), |end| end.as_usize() + 1);
        Span::from_bounds(self.start.as_usize(), end)
    }

    /// Attributes of an opening tag, in source order.
    #[must_use]
    pub fn attributes(&self, text: &str) -> Vec<Attribute> {
        let end = self.end.map_or(text.len(), Offset::as_usize);
        scan_attributes(text, self.name_span.end_usize(), end)
    }
}

pub(crate) fn is_escaped(bytes: &[u8], at: usize) -> bool {
    at > 0 && bytes[at - 1] == b'\\'
}

/// `offset` as a byte index into `text`, moved back onto a char boundary.
pub(crate) fn clamp_offset(text: &str, offset: Offset) -> usize {
    let mut at = offset.as_usize().min(text.len());
    while !text.is_char_boundary(at) {
        at -= 1;
    }
    at
}

/// Byte bounds of the line containing `at`, excluding the line terminator.
pub(crate) fn line_bounds(text: &str, at: usize) -> (usize, usize) {
    let bytes = text.as_bytes();
    let at = at.min(bytes.len());
    let start = memrchr(b'\n', &bytes[..at]).map_or(0, |i| i + 1);
    let end = memchr(b'\n', &bytes[at..]).map_or(bytes.len(), |i| at + i);
    let end = if end > start && bytes[end - 1] == b'\r' {
        end - 1
    } else {
        end
    };
    (start, end)
}

/// End of the run of name characters starting at `from`.
pub(crate) fn name_run_end(bytes: &[u8], from: usize) -> usize {
    from + bytes[from..].iter().take_while(|&&b| is_name_char(b)).count()
}

/// The first `>` at or after `from`.
#[must_use]
pub fn find_tag_end(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if from > bytes.len() {
        return None;
    }
    memchr(b'>', &bytes[from..]).map(|i| from + i)
}

/// Parse the component tag whose `<` sits at byte `at`.
///
/// Returns `None` for anything that is not an unescaped component tag with a
/// non-empty name.
#[must_use]
pub fn scan_tag(text: &str, at: usize) -> Option<TagOccurrence> {
    let bytes = text.as_bytes();
    if bytes.get(at) != Some(&b'<') || is_escaped(bytes, at) {
        return None;
    }

    let rest = &text[at..];
    let kind = if rest.starts_with(CLOSING_PREFIX) {
        TagKind::Closing
    } else if rest.starts_with(OPENING_PREFIX) {
        TagKind::Opening
    } else {
        return None;
    };

    let name_start = at + kind.prefix().len();
    let name_end = name_run_end(bytes, name_start);
    let name = ComponentName::new(&text[name_start..name_end])?;

    let end = find_tag_end(text, name_end);
    let self_closing = kind == TagKind::Opening
        && end.is_some_and(|end| text[name_end..end].trim_end().ends_with('/'));

    Some(TagOccurrence {
        name,
        kind,
        start: Offset::from_usize(at),
        name_span: Span::from_bounds(name_start, name_end),
        end: end.map(Offset::from_usize),
        self_closing,
    })
}

/// Every component tag in `text`, in document order.
pub fn scan_tags(text: &str) -> impl Iterator<Item = TagOccurrence> + '_ {
    memchr::memchr_iter(b'<', text.as_bytes()).filter_map(move |at| scan_tag(text, at))
}

/// One attribute token of a tag's attribute list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Name without the expression marker.
    pub name: String,
    /// Written with a leading `:`.
    pub is_expression: bool,
    pub value: Option<String>,
    /// The name as written, including a leading `:`.
    pub name_span: Span,
}

impl Attribute {
    /// The name as written in the tag, `:count` or `count`.
    #[must_use]
    pub fn written_name(&self) -> String {
        if self.is_expression {
            format!(":{}", self.name)
        } else {
            self.name.clone()
        }
    }
}

#[must_use]
pub fn is_attribute_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'_' | b'.' | b':' | b'@' | b'-')
}

/// Tokenize the attribute list in `text[start..end]`. Spans are absolute.
///
/// Characters that cannot start an attribute are skipped.
#[must_use]
pub fn scan_attributes(text: &str, start: usize, end: usize) -> Vec<Attribute> {
    let bytes = text.as_bytes();
    let end = end.min(bytes.len());
    let mut attributes = Vec::new();
    let mut i = start;

    while i < end {
        if !is_attribute_name_char(bytes[i]) {
            i += 1;
            continue;
        }

        let name_start = i;
        while i < end && is_attribute_name_char(bytes[i]) {
            i += 1;
        }
        let written = &text[name_start..i];

        let mut value = None;
        if i < end && bytes[i] == b'=' {
            i += 1;
            match bytes.get(i) {
                Some(&quote) if matches!(quote, b'"' | b'\'') && i < end => {
                    let value_start = i + 1;
                    let close = memchr(quote, &bytes[value_start..end]).map(|p| value_start + p);
                    let value_end = close.unwrap_or(end);
                    value = Some(text[value_start..value_end].to_string());
                    i = close.map_or(end, |close| close + 1);
                }
                _ => {
                    let value_start = i;
                    while i < end && !bytes[i].is_ascii_whitespace() {
                        i += 1;
                    }
                    let raw = &text[value_start..i];
                    // `<c-a b=x/>`: the slash belongs to the tag
                    let raw = if i == end {
                        raw.strip_suffix('/').unwrap_or(raw)
                    } else {
                        raw
                    };
                    value = Some(raw.to_string());
                }
            }
        }

        let (is_expression, name) = match written.strip_prefix(':') {
            Some(name) => (true, name),
            None => (false, written),
        };
        if name.is_empty() {
            continue;
        }

        attributes.push(Attribute {
            name: name.to_string(),
            is_expression,
            value,
            name_span: Span::from_bounds(name_start, name_start + written.len()),
        });
    }

    attributes
}
