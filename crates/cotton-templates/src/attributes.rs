//! Cursor position relative to a component tag's attribute list.

use cotton_source::Offset;
use cotton_source::Span;
use memchr::memchr;
use memchr::memrchr_iter;
use rustc_hash::FxHashSet;

use crate::names::ComponentName;
use crate::scanner::clamp_offset;
use crate::scanner::line_bounds;
use crate::scanner::scan_tag;
use crate::scanner::TagKind;

/// The attribute name being typed at the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialToken {
    /// What precedes the cursor.
    pub text: String,
    /// The whole name, including what follows the cursor.
    pub span: Span,
    /// The name is directly followed by `=`.
    pub has_value: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeSlot {
    /// The cursor is where an attribute name goes.
    Name { partial: Option<PartialToken> },
    /// The cursor is inside or right before an attribute value.
    Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeContext {
    pub component: ComponentName,
    /// `<` through `>`, or through the end of the text for a tag still open.
    pub tag_span: Span,
    /// Names already written in the tag, `:name` and `name` kept distinct.
    /// The token being typed is not included unless it already has a value.
    pub existing: FxHashSet<String>,
    pub slot: AttributeSlot,
}

impl AttributeContext {
    #[must_use]
    pub fn partial(&self) -> Option<&PartialToken> {
        match &self.slot {
            AttributeSlot::Name { partial } => partial.as_ref(),
            AttributeSlot::Value => None,
        }
    }
}

fn is_token_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'_' | b'.' | b':' | b'-')
}

/// `^:?[A-Za-z_][\w.-]*$`, or a lone `:`.
fn is_partial_name(token: &str) -> bool {
    if token == ":" {
        return true;
    }
    let name = token.strip_prefix(':').unwrap_or(token);
    let mut bytes = name.bytes();
    bytes
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == b'_')
        && bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-'))
}

/// Whether the cursor sits inside an open quote in `region`.
fn inside_quotes(region: &[u8]) -> bool {
    let mut quote: Option<u8> = None;
    for &b in region {
        match quote {
            Some(q) if b == q => quote = None,
            None if b == b'"' || b == b'\'' => quote = Some(b),
            _ => {}
        }
    }
    quote.is_some()
}

/// Describe where the cursor sits relative to the attribute list of the
/// component tag it is in.
///
/// Returns `None` outside any opening tag, on the tag name itself, after the
/// tag's `>`, or when another tag starts between the component name and the
/// cursor or between the cursor and the `>`.
#[must_use]
pub fn analyze_attributes(text: &str, offset: Offset) -> Option<AttributeContext> {
    let cursor = clamp_offset(text, offset);
    let bytes = text.as_bytes();

    let tag = memrchr_iter(b'<', &bytes[..cursor])
        .filter_map(|at| scan_tag(text, at))
        .find(|tag| tag.kind == TagKind::Opening)?;

    let name_end = tag.name_span.end_usize();
    if cursor <= name_end {
        return None;
    }

    let region_end = match tag.end {
        Some(end) if cursor > end.as_usize() => return None,
        Some(end) => end.as_usize(),
        None => text.len(),
    };

    if memchr(b'<', &bytes[name_end..cursor]).is_some() {
        return None;
    }
    if tag.end.is_some() && memchr(b'<', &bytes[cursor..region_end]).is_some() {
        return None;
    }

    let (line_start, _) = line_bounds(text, cursor);
    let token_floor = line_start.max(name_end);
    let token_start = cursor
        - bytes[token_floor..cursor]
            .iter()
            .rev()
            .take_while(|&&b| is_token_char(b))
            .count();
    let token = &text[token_start..cursor];
    let token_end = cursor
        + bytes[cursor..region_end]
            .iter()
            .take_while(|&&b| is_token_char(b))
            .count();

    let before_token = bytes[..token_start].last().copied();
    let in_value = inside_quotes(&bytes[name_end..cursor])
        || (token_start > name_end && matches!(before_token, Some(b'=' | b'"' | b'\'' | b'>')));

    let slot = if in_value {
        AttributeSlot::Value
    } else {
        let partial = (!token.is_empty() && is_partial_name(token)).then(|| PartialToken {
            text: token.to_string(),
            span: Span::from_bounds(token_start, token_end),
            has_value: bytes.get(token_end) == Some(&b'='),
        });
        AttributeSlot::Name { partial }
    };

    let existing = tag
        .attributes(text)
        .into_iter()
        .filter(|attribute| {
            token.is_empty()
                || attribute.name_span.start_usize() != token_start
                || attribute.value.is_some()
        })
        .map(|attribute| attribute.written_name())
        .collect();

    Some(AttributeContext {
        component: tag.name.clone(),
        tag_span: tag.full_span(text),
        existing,
        slot,
    })
}
