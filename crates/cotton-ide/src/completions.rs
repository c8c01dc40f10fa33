//! Completion for component tag names and component attributes.
//!
//! A cursor right after `<c-` or `</c-` completes component names from the
//! templates on disk. A cursor inside an opening component tag's attribute
//! list completes the parameters the component declares in `<c-vars>`.

use cotton_source::FileSystem;
use cotton_source::PositionEncoding;
use cotton_source::Span;
use cotton_templates::analyze_attributes;
use cotton_templates::discover_components;
use cotton_templates::name_context;
use cotton_templates::resolve_component;
use cotton_templates::template_doc;
use cotton_templates::AttributeSlot;
use cotton_templates::ParameterDeclaration;
use cotton_templates::SearchPaths;
use cotton_workspace::TextDocument;
use tower_lsp_server::ls_types;

use crate::ext::SpanExt;

/// Main entry point for handling completion requests.
///
/// Name completion wins when the cursor is on a tag name; otherwise the
/// attribute list of the surrounding tag is completed.
#[must_use]
pub fn handle_completion(
    document: &TextDocument,
    position: ls_types::Position,
    encoding: PositionEncoding,
    search_paths: &SearchPaths,
    fs: &dyn FileSystem,
    supports_snippets: bool,
) -> Vec<ls_types::CompletionItem> {
    let Some(offset) = document.position_to_offset(position, encoding) else {
        return Vec::new();
    };

    if name_context(document.content(), offset).is_some() {
        return component_completions(document, position, encoding, search_paths, fs);
    }

    attribute_completions(document, position, encoding, search_paths, fs, supports_snippets)
        .unwrap_or_default()
}

fn matches_prefix(candidate: &str, partial: &str) -> bool {
    candidate
        .get(..partial.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(partial))
}

/// Component names from every template under the search paths, filtered by
/// the name typed so far.
#[must_use]
pub fn component_completions(
    document: &TextDocument,
    position: ls_types::Position,
    encoding: PositionEncoding,
    search_paths: &SearchPaths,
    fs: &dyn FileSystem,
) -> Vec<ls_types::CompletionItem> {
    let Some(offset) = document.position_to_offset(position, encoding) else {
        return Vec::new();
    };
    let Some(context) = name_context(document.content(), offset) else {
        return Vec::new();
    };

    let range = context.span.to_lsp_range(document, encoding);

    discover_components(search_paths)
        .into_iter()
        .filter(|component| matches_prefix(component.name.as_str(), &context.partial))
        .map(|component| {
            let detail = search_paths
                .dirs()
                .iter()
                .find_map(|dir| component.path.strip_prefix(dir).ok())
                .unwrap_or(component.path.as_path())
                .to_string();
            let documentation = fs
                .read_to_string(&component.path)
                .ok()
                .and_then(|contents| template_doc(&contents))
                .map(ls_types::Documentation::String);

            ls_types::CompletionItem {
                label: component.name.to_string(),
                kind: Some(ls_types::CompletionItemKind::CLASS),
                detail: Some(detail),
                documentation,
                text_edit: Some(ls_types::CompletionTextEdit::Edit(ls_types::TextEdit::new(
                    range,
                    component.name.to_string(),
                ))),
                filter_text: Some(component.name.to_string()),
                ..Default::default()
            }
        })
        .collect()
}

/// Parameters of the component whose attribute list holds the cursor.
///
/// Returns `None` outside an attribute list. Inside one, each declared
/// parameter is offered as `name` and as `:name`, minus the spellings already
/// written in the tag, in declaration order.
///
/// A name under the cursor is replaced whole. When it already has a value,
/// only the new name is written.
#[must_use]
pub fn attribute_completions(
    document: &TextDocument,
    position: ls_types::Position,
    encoding: PositionEncoding,
    search_paths: &SearchPaths,
    fs: &dyn FileSystem,
    supports_snippets: bool,
) -> Option<Vec<ls_types::CompletionItem>> {
    let offset = document.position_to_offset(position, encoding)?;
    let context = analyze_attributes(document.content(), offset)?;

    let AttributeSlot::Name { partial } = &context.slot else {
        return Some(Vec::new());
    };
    if context.component.is_builtin() {
        return Some(Vec::new());
    }

    let Some(component) = resolve_component(&context.component, search_paths, fs).ok() else {
        return Some(Vec::new());
    };
    let Some(template) = component.load(fs) else {
        return Some(Vec::new());
    };
    let parameters = template.parameters.unwrap_or_default();

    let replace = partial
        .as_ref()
        .map_or(Span::from_bounds(offset.as_usize(), offset.as_usize()), |p| p.span);
    let range = replace.to_lsp_range(document, encoding);
    let typed = partial.as_ref().map_or("", |p| p.text.as_str());
    let insert = if partial.as_ref().is_some_and(|p| p.has_value) {
        AttributeInsert::Name
    } else if supports_snippets {
        AttributeInsert::Snippet
    } else {
        AttributeInsert::Empty
    };

    let mut items = Vec::new();
    for parameter in &parameters {
        for label in [parameter.name.clone(), format!(":{}", parameter.name)] {
            if context.existing.contains(&label) {
                continue;
            }
            let colon_only = typed == ":" && !label.starts_with(':');
            if !colon_only && !matches_prefix(&label, typed) {
                continue;
            }

            let index = items.len();
            items.push(attribute_item(
                &label,
                parameter,
                template.documentation.as_deref(),
                range,
                index,
                insert,
            ));
        }
    }

    Some(items)
}

/// What an accepted attribute completion writes.
#[derive(Clone, Copy)]
enum AttributeInsert {
    /// The name alone; the attribute already has a value.
    Name,
    /// `name="$1"` with the cursor between the quotes.
    Snippet,
    /// `name=""`.
    Empty,
}

fn attribute_item(
    label: &str,
    parameter: &ParameterDeclaration,
    component_doc: Option<&str>,
    range: ls_types::Range,
    index: usize,
    insert: AttributeInsert,
) -> ls_types::CompletionItem {
    let (new_text, insert_text_format) = match insert {
        AttributeInsert::Name => (label.to_string(), ls_types::InsertTextFormat::PLAIN_TEXT),
        AttributeInsert::Snippet => (format!("{label}=\"$1\""), ls_types::InsertTextFormat::SNIPPET),
        AttributeInsert::Empty => (format!("{label}=\"\""), ls_types::InsertTextFormat::PLAIN_TEXT),
    };

    let detail = if label.starts_with(':') {
        "expression"
    } else {
        "string"
    };

    ls_types::CompletionItem {
        label: label.to_string(),
        kind: Some(ls_types::CompletionItemKind::PROPERTY),
        detail: Some(detail.to_string()),
        documentation: Some(ls_types::Documentation::MarkupContent(
            ls_types::MarkupContent {
                kind: ls_types::MarkupKind::Markdown,
                value: parameter_doc(parameter, component_doc),
            },
        )),
        text_edit: Some(ls_types::CompletionTextEdit::Edit(ls_types::TextEdit::new(
            range, new_text,
        ))),
        insert_text_format: Some(insert_text_format),
        filter_text: Some(label.to_string()),
        sort_text: Some(format!("{index:04}")),
        ..Default::default()
    }
}

fn parameter_doc(parameter: &ParameterDeclaration, component_doc: Option<&str>) -> String {
    let mut doc = if parameter.default_value.is_empty() {
        "No default".to_string()
    } else if parameter.is_expression {
        format!("Default: `{}` (expression)", parameter.default_value)
    } else {
        format!("Default: `\"{}\"`", parameter.default_value)
    };

    if let Some(component_doc) = component_doc {
        doc.push_str("\n\n");
        doc.push_str(component_doc);
    }
    doc
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

    fn fs_with(files: &[(&str, &str)]) -> InMemoryFileSystem {
        let mut fs = InMemoryFileSystem::new();
        for (file, contents) in files {
            fs.add_file(
                Utf8PathBuf::from(format!("{ROOT}/{file}")),
                (*contents).to_string(),
            );
        }
        fs
    }

    /// Split `|` out of `marked` into a document and the cursor position.
    fn document(marked: &str) -> (TextDocument, ls_types::Position) {
        let at = marked.find('|').unwrap();
        let before = &marked[..at];
        let line = u32::try_from(before.matches('\n').count()).unwrap();
        let column = before.rfind('\n').map_or(at, |nl| at - nl - 1);
        let position = ls_types::Position::new(line, u32::try_from(column).unwrap());
        let doc = TextDocument::new(marked.replacen('|', "", 1), 1, "html");
        (doc, position)
    }

    fn labels(items: &[ls_types::CompletionItem]) -> Vec<&str> {
        items.iter().map(|item| item.label.as_str()).collect()
    }

    fn card_fs() -> InMemoryFileSystem {
        fs_with(&[(
            "card.html",
            "<!-- A content card -->\n<c-vars title=\"Default\" :count=\"0\" disabled />\n<div></div>",
        )])
    }

    fn attributes(marked: &str, fs: &InMemoryFileSystem) -> Option<Vec<ls_types::CompletionItem>> {
        let (doc, position) = document(marked);
        attribute_completions(
            &doc,
            position,
            PositionEncoding::Utf16,
            &search_paths(),
            fs,
            true,
        )
    }

    mod attributes {
        use super::*;

        #[test]
        fn test_all_parameters_in_declaration_order() {
            let items = attributes("<c-card |>", &card_fs()).unwrap();
            assert_eq!(
                labels(&items),
                ["title", ":title", "count", ":count", "disabled", ":disabled"]
            );
        }

        #[test]
        fn test_existing_bare_attribute_keeps_expression_form() {
            let items = attributes("<c-card count=\"5\" |>", &card_fs()).unwrap();
            let labels = labels(&items);
            assert!(!labels.contains(&"count"));
            assert!(labels.contains(&":count"));
        }

        #[test]
        fn test_lone_colon_matches_bare_names() {
            let fs = fs_with(&[("badge.html", "<c-vars label />")]);
            let items = attributes("<c-badge :|>", &fs).unwrap();
            assert_eq!(labels(&items), ["label", ":label"]);
        }

        #[test]
        fn test_case_insensitive_prefix() {
            let items = attributes("<c-card TI|>", &card_fs()).unwrap();
            assert_eq!(labels(&items), ["title"]);
        }

        #[test]
        fn test_expression_prefix() {
            let items = attributes("<c-card :c|>", &card_fs()).unwrap();
            assert_eq!(labels(&items), [":count"]);
        }

        #[test]
        fn test_snippet_replaces_partial() {
            let items = attributes("<c-card ti|>", &card_fs()).unwrap();
            let item = &items[0];
            assert_eq!(item.insert_text_format, Some(ls_types::InsertTextFormat::SNIPPET));
            let Some(ls_types::CompletionTextEdit::Edit(edit)) = &item.text_edit else {
                panic!("expected a text edit");
            };
            assert_eq!(edit.new_text, "title=\"$1\"");
            assert_eq!(
                edit.range,
                ls_types::Range::new(
                    ls_types::Position::new(0, 8),
                    ls_types::Position::new(0, 10),
                )
            );
        }

        #[test]
        fn test_name_with_value_is_renamed_in_place() {
            let items = attributes("<c-card si|ze=\"lg\">", &fs_with(&[(
                "card.html",
                "<c-vars size sizing />",
            )]))
            .unwrap();
            assert_eq!(labels(&items), ["sizing"]);

            let Some(ls_types::CompletionTextEdit::Edit(edit)) = &items[0].text_edit else {
                panic!("expected a text edit");
            };
            assert_eq!(edit.new_text, "sizing");
            assert_eq!(items[0].insert_text_format, Some(ls_types::InsertTextFormat::PLAIN_TEXT));
            assert_eq!(
                edit.range,
                ls_types::Range::new(
                    ls_types::Position::new(0, 8),
                    ls_types::Position::new(0, 12),
                )
            );
        }

        #[test]
        fn test_valued_attribute_at_cursor_not_offered_again() {
            let fs = fs_with(&[("counter.html", "<c-vars count counted />")]);
            let items = attributes("<c-counter co|unt=\"5\">", &fs).unwrap();
            assert_eq!(labels(&items), ["counted"]);
        }

        #[test]
        fn test_bare_name_replaced_whole_with_snippet() {
            let items = attributes("<c-card dis|abled>", &card_fs()).unwrap();
            assert_eq!(labels(&items), ["disabled"]);
            let Some(ls_types::CompletionTextEdit::Edit(edit)) = &items[0].text_edit else {
                panic!("expected a text edit");
            };
            assert_eq!(edit.new_text, "disabled=\"$1\"");
            assert_eq!(edit.range.end, ls_types::Position::new(0, 16));
        }

        #[test]
        fn test_plain_text_without_snippet_support() {
            let (doc, position) = document("<c-card |>");
            let items = attribute_completions(
                &doc,
                position,
                PositionEncoding::Utf16,
                &search_paths(),
                &card_fs(),
                false,
            )
            .unwrap();
            let Some(ls_types::CompletionTextEdit::Edit(edit)) = &items[0].text_edit else {
                panic!("expected a text edit");
            };
            assert_eq!(edit.new_text, "title=\"\"");
            assert_eq!(edit.range.start, edit.range.end);
        }

        #[test]
        fn test_documentation_lists_default() {
            let items = attributes("<c-card :co|>", &card_fs()).unwrap();
            let Some(ls_types::Documentation::MarkupContent(doc)) = &items[0].documentation else {
                panic!("expected markdown documentation");
            };
            assert!(doc.value.contains("Default: `0` (expression)"));
            assert!(doc.value.contains("A content card"));
        }

        #[test]
        fn test_outside_attribute_region() {
            assert!(attributes("<c-card>|</c-card>", &card_fs()).is_none());
        }

        #[test]
        fn test_value_slot_is_empty() {
            let items = attributes("<c-card title=\"|\">", &card_fs()).unwrap();
            assert!(items.is_empty());
        }

        #[test]
        fn test_unresolved_component_is_empty() {
            let items = attributes("<c-nope |>", &card_fs()).unwrap();
            assert!(items.is_empty());
        }

        #[test]
        fn test_template_without_declaration() {
            let fs = fs_with(&[("plain.html", "<div></div>")]);
            let items = attributes("<c-plain |>", &fs).unwrap();
            assert!(items.is_empty());
        }
    }

    mod components {
        use super::*;

        fn disk_root() -> (tempfile::TempDir, SearchPaths) {
            let dir = tempfile::TempDir::new().unwrap();
            let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
            std::fs::create_dir_all(root.join("forms")).unwrap();
            std::fs::write(root.join("card.html"), "<!-- A card -->\n<div></div>").unwrap();
            std::fs::write(root.join("forms/input.html"), "").unwrap();
            std::fs::write(root.join("forms/select.html"), "").unwrap();
            (dir, SearchPaths::new([root]))
        }

        fn complete(marked: &str) -> Vec<ls_types::CompletionItem> {
            let (_dir, search_paths) = disk_root();
            let (doc, position) = document(marked);
            component_completions(
                &doc,
                position,
                PositionEncoding::Utf16,
                &search_paths,
                &cotton_source::OsFileSystem,
            )
        }

        #[test]
        fn test_all_names_after_prefix() {
            assert_eq!(labels(&complete("<c-|")), ["card", "forms.input", "forms.select"]);
        }

        #[test]
        fn test_filtered_by_partial() {
            assert_eq!(labels(&complete("<c-forms.s|")), ["forms.select"]);
        }

        #[test]
        fn test_replaces_whole_name() {
            let items = complete("<c-fo|rms.in />");
            let Some(ls_types::CompletionTextEdit::Edit(edit)) = &items[0].text_edit else {
                panic!("expected a text edit");
            };
            assert_eq!(
                edit.range,
                ls_types::Range::new(
                    ls_types::Position::new(0, 3),
                    ls_types::Position::new(0, 11),
                )
            );
        }

        #[test]
        fn test_documentation_and_detail() {
            let items = complete("<c-ca|");
            assert_eq!(
                items[0].documentation,
                Some(ls_types::Documentation::String("A card".to_string()))
            );
            assert_eq!(items[0].detail.as_deref(), Some("card.html"));
        }

        #[test]
        fn test_not_after_prefix() {
            assert!(complete("<div |").is_empty());
        }
    }

    #[test]
    fn test_handle_completion_dispatch() {
        let (doc, position) = document("<c-card |>");
        let items = handle_completion(
            &doc,
            position,
            PositionEncoding::Utf16,
            &search_paths(),
            &card_fs(),
            true,
        );
        assert_eq!(items.len(), 6);

        let (doc, position) = document("plain |text");
        let items = handle_completion(
            &doc,
            position,
            PositionEncoding::Utf16,
            &search_paths(),
            &card_fs(),
            true,
        );
        assert!(items.is_empty());
    }
}
