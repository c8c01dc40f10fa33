use annotate_snippets::AnnotationKind;
use annotate_snippets::Level;
use annotate_snippets::Renderer;
use annotate_snippets::Snippet;

use crate::Span;

/// How loudly a rendered diagnostic is labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    fn level(self) -> Level<'static> {
        match self {
            Severity::Error => Level::ERROR,
            Severity::Warning => Level::WARNING,
            Severity::Info => Level::INFO,
            Severity::Hint => Level::HELP,
        }
    }
}

/// A problem in one file, underlined at a single span.
#[derive(Debug)]
pub struct Diagnostic<'a> {
    pub source: &'a str,
    pub path: &'a str,
    pub code: &'a str,
    pub message: &'a str,
    pub severity: Severity,
    pub span: Span,
    /// Printed under the underline.
    pub label: &'a str,
    /// Printed after the snippet as `note: ...`.
    pub note: Option<&'a str>,
}

impl<'a> Diagnostic<'a> {
    #[must_use]
    pub fn new(
        source: &'a str,
        path: &'a str,
        code: &'a str,
        message: &'a str,
        severity: Severity,
        span: Span,
        label: &'a str,
    ) -> Self {
        Self {
            source,
            path,
            code,
            message,
            severity,
            span,
            label,
            note: None,
        }
    }

    #[must_use]
    pub fn note(self, note: &'a str) -> Self {
        Self {
            note: Some(note),
            ..self
        }
    }
}

/// Formats diagnostics the way compilers print them, with `annotate-snippets`.
///
/// Use `plain` for pipes and tests, `styled` for terminals.
#[derive(Debug)]
pub struct DiagnosticRenderer {
    renderer: Renderer,
}

impl DiagnosticRenderer {
    #[must_use]
    pub fn plain() -> Self {
        Self {
            renderer: Renderer::plain(),
        }
    }

    #[must_use]
    pub fn styled() -> Self {
        Self {
            renderer: Renderer::styled(),
        }
    }

    #[must_use]
    pub fn render(&self, diagnostic: &Diagnostic<'_>) -> String {
        let range = diagnostic.span.start_usize()..diagnostic.span.end_usize();
        let snippet = Snippet::source(diagnostic.source)
            .path(diagnostic.path)
            .line_start(1)
            .annotation(AnnotationKind::Primary.span(range).label(diagnostic.label));

        let mut group = diagnostic
            .severity
            .level()
            .primary_title(diagnostic.message)
            .id(diagnostic.code)
            .element(snippet);
        if let Some(note) = diagnostic.note {
            group = group.element(Level::NOTE.message(note));
        }

        self.renderer.render(&[group])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<div>\n  <c-missing.thing />\n</div>\n";

    fn missing_thing(severity: Severity) -> Diagnostic<'static> {
        let start = PAGE.find("missing").unwrap();
        Diagnostic::new(
            PAGE,
            "templates/page.html",
            "C100",
            "Component 'missing.thing' has no template",
            severity,
            Span::from_parts(start, "missing.thing".len()),
            "no template for this component",
        )
    }

    mod plain {
        use super::*;

        #[test]
        fn test_header_snippet_and_underline() {
            let output = DiagnosticRenderer::plain().render(&missing_thing(Severity::Error));

            assert!(output.contains("error[C100]: Component 'missing.thing' has no template"));
            assert!(output.contains("templates/page.html:2:"));
            assert!(output.contains("<c-missing.thing />"));
            assert!(output.contains("^^^^^^^^^^^^^ no template for this component"));
            assert!(!output.contains("note:"));
            assert!(!output.contains("\x1b["));
        }

        #[test]
        fn test_note_follows_snippet() {
            let diagnostic = missing_thing(Severity::Error)
                .note("expected one of: templates/cotton/missing/thing.html");
            let output = DiagnosticRenderer::plain().render(&diagnostic);

            assert!(output.contains("note: expected one of: templates/cotton/missing/thing.html"));
        }

        #[test]
        fn test_severity_labels() {
            let render = |severity| DiagnosticRenderer::plain().render(&missing_thing(severity));
            assert!(render(Severity::Warning).contains("warning[C100]"));
            assert!(render(Severity::Info).contains("info[C100]"));
            assert!(render(Severity::Hint).contains("help[C100]"));
        }
    }

    #[test]
    fn test_styled_uses_ansi() {
        let output = DiagnosticRenderer::styled().render(&missing_thing(Severity::Error));
        assert!(output.contains("\x1b["));
    }
}
