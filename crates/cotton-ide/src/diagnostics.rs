use camino::Utf8Path;
use cotton_conf::DiagnosticsConfig;
use cotton_source::Diagnostic;
use cotton_source::DiagnosticRenderer;
use cotton_source::FileSystem;
use cotton_source::PositionEncoding;
use cotton_templates::display_path;
use cotton_templates::unresolved_components;
use cotton_templates::SearchPaths;
use cotton_templates::UnresolvedComponent;
use cotton_workspace::TextDocument;
use tower_lsp_server::ls_types;

use crate::ext::DiagnosticSeverityExt;
use crate::ext::SpanExt;

/// Code for a component tag with no backing template.
pub const UNRESOLVED_COMPONENT: &str = "C100";

fn unresolved_message(component: &UnresolvedComponent) -> String {
    format!("Component '{}' has no template", component.name)
}

fn expected_paths(component: &UnresolvedComponent, project_root: &Utf8Path) -> String {
    component
        .tried
        .iter()
        .map(|path| display_path(path, project_root).as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One diagnostic per opening component tag that does not resolve.
///
/// Severity comes from `config`; a code configured as `off` yields nothing.
/// Candidate paths are shown relative to `project_root` when they live
/// under it.
#[must_use]
pub fn collect_diagnostics(
    document: &TextDocument,
    encoding: PositionEncoding,
    search_paths: &SearchPaths,
    fs: &dyn FileSystem,
    config: &DiagnosticsConfig,
    project_root: &Utf8Path,
) -> Vec<ls_types::Diagnostic> {
    let Some(severity) = config
        .get_severity(UNRESOLVED_COMPONENT)
        .to_lsp_severity()
    else {
        return Vec::new();
    };

    unresolved_components(document.content(), search_paths, fs)
        .iter()
        .map(|component| ls_types::Diagnostic {
            range: component.span.to_lsp_range(document, encoding),
            severity: Some(severity),
            code: Some(ls_types::NumberOrString::String(
                UNRESOLVED_COMPONENT.to_string(),
            )),
            code_description: None,
            source: Some(crate::SOURCE_NAME.to_string()),
            message: format!(
                "{}. Expected one of: {}",
                unresolved_message(component),
                expected_paths(component, project_root)
            ),
            related_information: None,
            tags: None,
            data: None,
        })
        .collect()
}

/// Render an unresolved component to a formatted string.
///
/// Returns `None` if the diagnostic code is suppressed by `config`.
#[must_use]
pub fn render_unresolved(
    source: &str,
    path: &str,
    component: &UnresolvedComponent,
    config: &DiagnosticsConfig,
    project_root: &Utf8Path,
    fmt: &DiagnosticRenderer,
) -> Option<String> {
    let severity = config
        .get_severity(UNRESOLVED_COMPONENT)
        .to_render_severity()?;

    let message = unresolved_message(component);
    let expected = format!("expected one of: {}", expected_paths(component, project_root));
    let diag = Diagnostic::new(
        source,
        path,
        UNRESOLVED_COMPONENT,
        &message,
        severity,
        component.span,
        "no template for this component",
    )
    .note(&expected);

    Some(fmt.render(&diag))
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;
    use cotton_conf::DiagnosticSeverity;
    use cotton_source::InMemoryFileSystem;

    use super::*;

    fn search_paths() -> SearchPaths {
        SearchPaths::new([Utf8PathBuf::from("/project/templates/cotton")])
    }

    fn fs_with(files: &[&str]) -> InMemoryFileSystem {
        let mut fs = InMemoryFileSystem::new();
        for file in files {
            fs.add_file(Utf8PathBuf::from(*file), String::new());
        }
        fs
    }

    fn collect(
        text: &str,
        fs: &InMemoryFileSystem,
        config: &DiagnosticsConfig,
    ) -> Vec<ls_types::Diagnostic> {
        let document = TextDocument::new(text.to_string(), 1, "html");
        collect_diagnostics(
            &document,
            PositionEncoding::Utf16,
            &search_paths(),
            fs,
            config,
            Utf8Path::new("/project"),
        )
    }

    #[test]
    fn test_unresolved_component_diagnostic() {
        let text = "<div>\n  <c-missing.thing></c-missing.thing>\n  <c-vars a /><c-slot /><c-component />\n</div>";
        let diagnostics = collect(text, &fs_with(&[]), &DiagnosticsConfig::default());

        assert_eq!(diagnostics.len(), 1);
        let diagnostic = &diagnostics[0];
        assert_eq!(
            diagnostic.code,
            Some(ls_types::NumberOrString::String("C100".to_string()))
        );
        assert_eq!(diagnostic.severity, Some(ls_types::DiagnosticSeverity::ERROR));
        assert_eq!(
            diagnostic.range,
            ls_types::Range::new(ls_types::Position::new(1, 5), ls_types::Position::new(1, 18))
        );
        assert_eq!(
            diagnostic.message,
            "Component 'missing.thing' has no template. Expected one of: \
             templates/cotton/missing/thing.html, templates/cotton/missing/thing/index.html"
        );
        assert_eq!(diagnostic.source.as_deref(), Some("cotton-ls"));
    }

    #[test]
    fn test_resolved_components_are_clean() {
        let fs = fs_with(&["/project/templates/cotton/card.html"]);
        let diagnostics = collect("<c-card />", &fs, &DiagnosticsConfig::default());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_configured_severity() {
        let mut config = DiagnosticsConfig::default();
        config.set_severity("C100", DiagnosticSeverity::Warning);
        let diagnostics = collect("<c-nope />", &fs_with(&[]), &config);
        assert_eq!(diagnostics[0].severity, Some(ls_types::DiagnosticSeverity::WARNING));
    }

    #[test]
    fn test_suppressed_by_prefix() {
        let mut config = DiagnosticsConfig::default();
        config.set_severity("C", DiagnosticSeverity::Off);
        assert!(collect("<c-nope />", &fs_with(&[]), &config).is_empty());
    }

    mod render {
        use super::*;

        fn unresolved() -> UnresolvedComponent {
            cotton_templates::unresolved_components(
                "<c-nope />",
                &search_paths(),
                &fs_with(&[]),
            )
            .remove(0)
        }

        #[test]
        fn test_render_plain() {
            let output = render_unresolved(
                "<c-nope />",
                "page.html",
                &unresolved(),
                &DiagnosticsConfig::default(),
                Utf8Path::new("/project"),
                &DiagnosticRenderer::plain(),
            )
            .unwrap();

            assert!(output.contains("error[C100]: Component 'nope' has no template"));
            assert!(output.contains("page.html"));
            assert!(output.contains("no template for this component"));
            assert!(output.contains("templates/cotton/nope.html"));
        }

        #[test]
        fn test_render_suppressed() {
            let mut config = DiagnosticsConfig::default();
            config.set_severity("C100", DiagnosticSeverity::Off);
            let output = render_unresolved(
                "<c-nope />",
                "page.html",
                &unresolved(),
                &config,
                Utf8Path::new("/project"),
                &DiagnosticRenderer::plain(),
            );
            assert!(output.is_none());
        }
    }
}
