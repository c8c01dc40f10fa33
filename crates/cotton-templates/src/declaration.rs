use rustc_hash::FxHashSet;

use crate::names::DECLARATION_TAG;
use crate::scanner::scan_tags;
use crate::scanner::TagKind;

/// One parameter declared by a component's `<c-vars>` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDeclaration {
    pub name: String,
    /// Empty when the parameter has no default.
    pub default_value: String,
    /// Declared as `:name`, so the default is an expression.
    pub is_expression: bool,
}

/// Parameters declared by the first `<c-vars>` tag in `contents`.
///
/// Returns `None` when the template has no declaration tag, and an empty list
/// when the tag is present but declares nothing or never closes. Repeated
/// names keep their first declaration.
#[must_use]
pub fn parse_declaration(contents: &str) -> Option<Vec<ParameterDeclaration>> {
    let tag = scan_tags(contents)
        .find(|tag| tag.kind == TagKind::Opening && tag.name.as_str() == DECLARATION_TAG)?;

    if tag.end.is_none() {
        tracing::debug!("Unterminated <c-{}> declaration", DECLARATION_TAG);
        return Some(Vec::new());
    }

    let mut seen = FxHashSet::default();
    let parameters = tag
        .attributes(contents)
        .into_iter()
        .filter(|attribute| seen.insert(attribute.name.clone()))
        .map(|attribute| ParameterDeclaration {
            name: attribute.name,
            default_value: attribute.value.unwrap_or_default(),
            is_expression: attribute.is_expression,
        })
        .collect();

    Some(parameters)
}

/// Documentation from a template's first line, when that line is exactly an
/// HTML comment.
#[must_use]
pub fn template_doc(contents: &str) -> Option<String> {
    let first = contents.trim_start_matches('\u{feff}').lines().next()?.trim();
    let inner = first.strip_prefix("<!--")?.strip_suffix("-->")?.trim();
    (!inner.is_empty()).then(|| inner.to_string())
}
