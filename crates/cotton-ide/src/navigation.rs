use cotton_source::FileSystem;
use cotton_source::PositionEncoding;
use cotton_templates::locate_tag;
use cotton_templates::resolve_component;
use cotton_templates::ResolveResult;
use cotton_templates::SearchPaths;
use cotton_workspace::paths::path_to_uri;
use cotton_workspace::TextDocument;
use tower_lsp_server::ls_types;

use crate::ext::SpanExt;

/// Jump from a component tag to the template file that backs it.
///
/// The origin range is the component name so the editor underlines just the
/// name. Clients without `linkSupport` get a plain location instead.
pub fn goto_definition(
    document: &TextDocument,
    position: ls_types::Position,
    encoding: PositionEncoding,
    search_paths: &SearchPaths,
    fs: &dyn FileSystem,
    link_support: bool,
) -> Option<ls_types::GotoDefinitionResponse> {
    let offset = document.position_to_offset(position, encoding)?;
    let tag = locate_tag(document.content(), offset)?;

    if tag.name.is_builtin() {
        return None;
    }
    tracing::debug!("Found component reference: '{}'", tag.name);

    match resolve_component(&tag.name, search_paths, fs) {
        ResolveResult::Found(component) => {
            tracing::debug!("Resolved component to: {}", component.path);
            let target_uri = path_to_uri(&component.path)?;

            if !link_support {
                return Some(ls_types::GotoDefinitionResponse::Scalar(
                    ls_types::Location::new(target_uri, ls_types::Range::default()),
                ));
            }

            Some(ls_types::GotoDefinitionResponse::Link(vec![
                ls_types::LocationLink {
                    origin_selection_range: Some(tag.name_span.to_lsp_range(document, encoding)),
                    target_uri,
                    target_range: ls_types::Range::default(),
                    target_selection_range: ls_types::Range::default(),
                },
            ]))
        }
        ResolveResult::NotFound { name, tried } => {
            tracing::debug!("Component '{}' not found. Tried: {:?}", name, tried);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;
    use cotton_source::InMemoryFileSystem;

    use super::*;

    const ROOT: &str = "/project/templates/cotton";

    fn search_paths() -> SearchPaths {
        SearchPaths::new([Utf8PathBuf::from(ROOT)])
    }

    fn fs_with(files: &[&str]) -> InMemoryFileSystem {
        let mut fs = InMemoryFileSystem::new();
        for file in files {
            fs.add_file(Utf8PathBuf::from(format!("{ROOT}/{file}")), String::new());
        }
        fs
    }

    fn document(text: &str) -> TextDocument {
        TextDocument::new(text.to_string(), 1, "html")
    }

    fn link(response: ls_types::GotoDefinitionResponse) -> ls_types::LocationLink {
        match response {
            ls_types::GotoDefinitionResponse::Link(mut links) => links.remove(0),
            other => panic!("expected a link, got {other:?}"),
        }
    }

    #[test]
    fn test_link_targets_template() {
        let fs = fs_with(&["forms/input.html"]);
        let doc = document("<div>\n  <c-forms.input placeholder=\"x\" />\n</div>");

        let response = goto_definition(
            &doc,
            ls_types::Position::new(1, 8),
            PositionEncoding::Utf16,
            &search_paths(),
            &fs,
            true,
        )
        .unwrap();
        let link = link(response);

        assert!(link
            .target_uri
            .as_str()
            .ends_with("/project/templates/cotton/forms/input.html"));
        assert_eq!(
            link.origin_selection_range,
            Some(ls_types::Range::new(
                ls_types::Position::new(1, 5),
                ls_types::Position::new(1, 16),
            ))
        );
        assert_eq!(link.target_range, ls_types::Range::default());
    }

    #[test]
    fn test_cursor_in_attributes_falls_back_to_enclosing_tag() {
        let fs = fs_with(&["card/index.html"]);
        let doc = document("<c-card title=\"x\" >");

        let response = goto_definition(
            &doc,
            ls_types::Position::new(0, 18),
            PositionEncoding::Utf16,
            &search_paths(),
            &fs,
            true,
        );
        assert!(link(response.unwrap())
            .target_uri
            .as_str()
            .ends_with("/card/index.html"));
    }

    #[test]
    fn test_closing_tag_navigates() {
        let fs = fs_with(&["card.html"]);
        let doc = document("<c-card>body</c-card>");

        let response = goto_definition(
            &doc,
            ls_types::Position::new(0, 17),
            PositionEncoding::Utf16,
            &search_paths(),
            &fs,
            true,
        );
        assert!(response.is_some());
    }

    #[test]
    fn test_plain_location_without_link_support() {
        let fs = fs_with(&["card.html"]);
        let doc = document("<c-card />");

        let response = goto_definition(
            &doc,
            ls_types::Position::new(0, 4),
            PositionEncoding::Utf16,
            &search_paths(),
            &fs,
            false,
        );
        assert!(matches!(
            response,
            Some(ls_types::GotoDefinitionResponse::Scalar(_))
        ));
    }

    #[test]
    fn test_builtins_are_not_navigable() {
        let fs = fs_with(&["slot.html"]);
        let doc = document("<c-slot name=\"header\">");

        let response = goto_definition(
            &doc,
            ls_types::Position::new(0, 4),
            PositionEncoding::Utf16,
            &search_paths(),
            &fs,
            true,
        );
        assert!(response.is_none());
    }

    #[test]
    fn test_unresolved_component() {
        let doc = document("<c-missing />");
        let response = goto_definition(
            &doc,
            ls_types::Position::new(0, 5),
            PositionEncoding::Utf16,
            &search_paths(),
            &fs_with(&[]),
            true,
        );
        assert!(response.is_none());
    }

    #[test]
    fn test_outside_any_tag() {
        let fs = fs_with(&["card.html"]);
        let doc = document("<c-card></c-card> text");
        let response = goto_definition(
            &doc,
            ls_types::Position::new(0, 20),
            PositionEncoding::Utf16,
            &search_paths(),
            &fs,
            true,
        );
        assert!(response.is_none());
    }
}
