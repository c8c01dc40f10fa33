use cotton_source::Offset;
use memchr::memchr_iter;
use memchr::memrchr_iter;

use crate::scanner::clamp_offset;
use crate::scanner::is_escaped;
use crate::scanner::line_bounds;
use crate::scanner::scan_tag;
use crate::scanner::TagOccurrence;

/// The tag whose `<` is the nearest unescaped `<` before the cursor on the
/// cursor's line.
///
/// The terminating `>` may be on a later line. Returns `None` when that `<`
/// does not start a component tag, when the tag never closes, or when the
/// cursor is past its `>`.
#[must_use]
pub fn enclosing_tag(text: &str, offset: Offset) -> Option<TagOccurrence> {
    let cursor = clamp_offset(text, offset);
    let bytes = text.as_bytes();
    let (line_start, _) = line_bounds(text, cursor);

    let at = memrchr_iter(b'<', &bytes[line_start..cursor])
        .map(|i| line_start + i)
        .find(|&at| !is_escaped(bytes, at))?;

    let tag = scan_tag(text, at)?;
    let end = tag.end?;
    (cursor <= end.as_usize()).then_some(tag)
}

/// The tag on the cursor's line whose prefix and name contain the cursor.
///
/// The position right after the name's last character still counts, so a
/// cursor at `<c-card|>` finds `card`.
#[must_use]
pub fn tag_at(text: &str, offset: Offset) -> Option<TagOccurrence> {
    let cursor = clamp_offset(text, offset);
    let (line_start, line_end) = line_bounds(text, cursor);

    memchr_iter(b'<', &text.as_bytes()[line_start..line_end])
        .filter_map(|i| scan_tag(text, line_start + i))
        .find(|tag| {
            let head = tag.head_span();
            head.start_usize() <= cursor && cursor <= head.end_usize()
        })
}

/// [`tag_at`], falling back to [`enclosing_tag`].
#[must_use]
pub fn locate_tag(text: &str, offset: Offset) -> Option<TagOccurrence> {
    tag_at(text, offset).or_else(|| enclosing_tag(text, offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::TagKind;

    /// Split `|` out of `marked` and return the text and the cursor offset.
    fn cursor(marked: &str) -> (String, Offset) {
        let at = marked.find('|').unwrap();
        let text = marked.replacen('|', "", 1);
        (text, Offset::from_usize(at))
    }

    mod tag_at {
        use super::*;

        #[test]
        fn test_cursor_inside_dotted_name() {
            let (text, offset) =
                cursor("<c-forms.in|put placeholder=\"x\">content</c-forms.input>");
            let tag = tag_at(&text, offset).unwrap();
            assert_eq!(tag.name.as_str(), "forms.input");
            assert_eq!(tag.kind, TagKind::Opening);
            assert_eq!(tag.name_span.as_str(&text), "forms.input");
            assert_eq!(tag.name_span.start(), 3);
        }

        #[test]
        fn test_cursor_right_after_name() {
            let (text, offset) = cursor("<c-card|>");
            assert_eq!(tag_at(&text, offset).unwrap().name.as_str(), "card");
        }

        #[test]
        fn test_cursor_on_prefix() {
            let (text, offset) = cursor("<|c-card>");
            assert_eq!(tag_at(&text, offset).unwrap().name.as_str(), "card");
        }

        #[test]
        fn test_picks_the_tag_under_the_cursor() {
            let (text, offset) = cursor("<c-a></c-a><c-b /><c-c|c />");
            assert_eq!(tag_at(&text, offset).unwrap().name.as_str(), "cc");
        }

        #[test]
        fn test_closing_tag() {
            let (text, offset) = cursor("<c-card>x</c-ca|rd>");
            let tag = tag_at(&text, offset).unwrap();
            assert!(tag.is_closing());
            assert_eq!(tag.name_span.as_str(&text), "card");
        }

        #[test]
        fn test_cursor_in_attributes_is_not_on_a_name() {
            let (text, offset) = cursor("<c-card ti|tle=\"x\">");
            assert!(tag_at(&text, offset).is_none());
        }

        #[test]
        fn test_only_the_cursor_line_is_searched() {
            let (text, offset) = cursor("<c-card>\n|text");
            assert!(tag_at(&text, offset).is_none());
        }

        #[test]
        fn test_builtins_are_located() {
            let (text, offset) = cursor("<c-sl|ot name=\"x\">");
            assert_eq!(tag_at(&text, offset).unwrap().name.as_str(), "slot");
        }
    }

    mod enclosing {
        use super::*;

        #[test]
        fn test_cursor_in_attribute_region() {
            let (text, offset) = cursor("<c-card title=\"x\" |>");
            let tag = enclosing_tag(&text, offset).unwrap();
            assert_eq!(tag.name.as_str(), "card");
            assert_eq!(tag.name_span.as_str(&text), "card");
        }

        #[test]
        fn test_multiline_terminator() {
            let (text, offset) = cursor("<c-card title=\"x\" |\n  :count=\"1\"\n>");
            let tag = enclosing_tag(&text, offset).unwrap();
            assert_eq!(tag.name.as_str(), "card");
        }

        #[test]
        fn test_no_terminator() {
            let (text, offset) = cursor("<c-card title=\"x\" |");
            assert!(enclosing_tag(&text, offset).is_none());
        }

        #[test]
        fn test_non_component_tag() {
            let (text, offset) = cursor("<c-card><div class=\"a\" |>");
            assert!(enclosing_tag(&text, offset).is_none());
        }

        #[test]
        fn test_escaped_bracket_is_skipped() {
            let (text, offset) = cursor(r#"<c-card title="\<b" |>"#);
            assert_eq!(enclosing_tag(&text, offset).unwrap().name.as_str(), "card");
        }

        #[test]
        fn test_cursor_after_terminator() {
            let (text, offset) = cursor("<c-card>body|");
            assert!(enclosing_tag(&text, offset).is_none());
        }

        #[test]
        fn test_tag_start_on_previous_line() {
            let (text, offset) = cursor("<c-card\n  title=\"x\" |>");
            assert!(enclosing_tag(&text, offset).is_none());
        }
    }

    #[test]
    fn test_locate_prefers_tag_at() {
        let (text, offset) = cursor("<c-outer a=\"1\"><c-in|ner /></c-outer>");
        assert_eq!(locate_tag(&text, offset).unwrap().name.as_str(), "inner");

        let (text, offset) = cursor("<c-outer a=\"1\" |>");
        assert_eq!(locate_tag(&text, offset).unwrap().name.as_str(), "outer");
    }
}
