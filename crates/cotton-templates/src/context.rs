use cotton_source::Offset;
use cotton_source::Span;

use crate::names::is_name_char;
use crate::scanner::clamp_offset;
use crate::scanner::is_escaped;
use crate::scanner::line_bounds;
use crate::scanner::name_run_end;
use crate::scanner::TagKind;

/// A component name being typed right after `<c-` or `</c-`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameContext {
    pub kind: TagKind,
    /// Name characters between the prefix and the cursor.
    pub partial: String,
    /// The whole name run around the cursor, which a completion replaces.
    pub span: Span,
}

#[must_use]
pub fn name_context(text: &str, offset: Offset) -> Option<NameContext> {
    let cursor = clamp_offset(text, offset);
    let bytes = text.as_bytes();
    let (line_start, _) = line_bounds(text, cursor);

    let name_start = cursor
        - bytes[line_start..cursor]
            .iter()
            .rev()
            .take_while(|&&b| is_name_char(b))
            .count();

    let before = &text[line_start..name_start];
    let kind = if before.ends_with(TagKind::Closing.prefix()) {
        TagKind::Closing
    } else if before.ends_with(TagKind::Opening.prefix()) {
        TagKind::Opening
    } else {
        return None;
    };

    let bracket = name_start - kind.prefix().len();
    if is_escaped(bytes, bracket) {
        return None;
    }

    Some(NameContext {
        kind,
        partial: text[name_start..cursor].to_string(),
        span: Span::from_bounds(name_start, name_run_end(bytes, name_start)),
    })
}
