use std::fmt::Write;

use camino::Utf8Path;
use cotton_source::FileSystem;
use cotton_source::PositionEncoding;
use cotton_templates::display_path;
use cotton_templates::locate_tag;
use cotton_templates::resolve_component;
use cotton_templates::SearchPaths;
use cotton_workspace::TextDocument;
use tower_lsp_server::ls_types;

use crate::ext::SpanExt;

/// Markdown summary of the component under the cursor.
pub fn hover(
    document: &TextDocument,
    position: ls_types::Position,
    encoding: PositionEncoding,
    search_paths: &SearchPaths,
    fs: &dyn FileSystem,
    project_root: &Utf8Path,
) -> Option<ls_types::Hover> {
    let offset = document.position_to_offset(position, encoding)?;
    let tag = locate_tag(document.content(), offset)?;
    if tag.name.is_builtin() {
        return None;
    }

    let component = resolve_component(&tag.name, search_paths, fs).ok()?;
    let template = component.load(fs).unwrap_or_default();

    let mut value = format!(
        "**c-{}**\n\n`{}`",
        component.name,
        display_path(&component.path, project_root)
    );

    if let Some(doc) = &template.documentation {
        let _ = write!(value, "\n\n{doc}");
    }

    if let Some(parameters) = template.parameters.filter(|p| !p.is_empty()) {
        value.push_str("\n\n**Parameters**\n");
        for parameter in parameters {
            let colon = if parameter.is_expression { ":" } else { "" };
            if parameter.default_value.is_empty() {
                let _ = write!(value, "\n- `{colon}{}`", parameter.name);
            } else {
                let _ = write!(
                    value,
                    "\n- `{colon}{}` = `{}`",
                    parameter.name, parameter.default_value
                );
            }
        }
    }

    Some(ls_types::Hover {
        contents: ls_types::HoverContents::Markup(ls_types::MarkupContent {
            kind: ls_types::MarkupKind::Markdown,
            value,
        }),
        range: Some(tag.name_span.to_lsp_range(document, encoding)),
    })
}
