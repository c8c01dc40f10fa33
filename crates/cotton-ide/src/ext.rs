use cotton_conf::DiagnosticSeverity;
use cotton_source::Offset;
use cotton_source::PositionEncoding;
use cotton_source::Severity;
use cotton_source::Span;
use cotton_workspace::TextDocument;
use tower_lsp_server::ls_types;

pub(crate) trait SpanExt {
    fn to_lsp_range(&self, document: &TextDocument, encoding: PositionEncoding) -> ls_types::Range;
}

impl SpanExt for Span {
    fn to_lsp_range(&self, document: &TextDocument, encoding: PositionEncoding) -> ls_types::Range {
        ls_types::Range::new(
            document.offset_to_position(Offset::new(self.start()), encoding),
            document.offset_to_position(Offset::new(self.end()), encoding),
        )
    }
}

pub trait DiagnosticSeverityExt {
    fn to_lsp_severity(self) -> Option<ls_types::DiagnosticSeverity>;
    fn to_render_severity(self) -> Option<Severity>;
}

impl DiagnosticSeverityExt for DiagnosticSeverity {
    fn to_lsp_severity(self) -> Option<ls_types::DiagnosticSeverity> {
        match self {
            DiagnosticSeverity::Off => None,
            DiagnosticSeverity::Error => Some(ls_types::DiagnosticSeverity::ERROR),
            DiagnosticSeverity::Warning => Some(ls_types::DiagnosticSeverity::WARNING),
            DiagnosticSeverity::Info => Some(ls_types::DiagnosticSeverity::INFORMATION),
            DiagnosticSeverity::Hint => Some(ls_types::DiagnosticSeverity::HINT),
        }
    }

    fn to_render_severity(self) -> Option<Severity> {
        match self {
            DiagnosticSeverity::Off => None,
            DiagnosticSeverity::Error => Some(Severity::Error),
            DiagnosticSeverity::Warning => Some(Severity::Warning),
            DiagnosticSeverity::Info => Some(Severity::Info),
            DiagnosticSeverity::Hint => Some(Severity::Hint),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_lsp_severity() {
        assert_eq!(DiagnosticSeverity::Off.to_lsp_severity(), None);
        assert_eq!(
            DiagnosticSeverity::Error.to_lsp_severity(),
            Some(ls_types::DiagnosticSeverity::ERROR)
        );
        assert_eq!(
            DiagnosticSeverity::Hint.to_lsp_severity(),
            Some(ls_types::DiagnosticSeverity::HINT)
        );
    }

    #[test]
    fn test_span_to_range_across_lines() {
        let document = TextDocument::new("<p>\n<c-card>".to_string(), 1, "html");
        let range = Span::from_bounds(6, 10).to_lsp_range(&document, PositionEncoding::Utf16);
        assert_eq!(range.start, ls_types::Position::new(1, 2));
        assert_eq!(range.end, ls_types::Position::new(1, 6));
    }

    #[test]
    fn test_span_to_range_counts_utf16_units() {
        let document = TextDocument::new("é<c-card>".to_string(), 1, "html");
        let range = Span::from_bounds(5, 9).to_lsp_range(&document, PositionEncoding::Utf16);
        assert_eq!(range.start, ls_types::Position::new(0, 4));

        let range = Span::from_bounds(5, 9).to_lsp_range(&document, PositionEncoding::Utf8);
        assert_eq!(range.start, ls_types::Position::new(0, 5));
    }
}
