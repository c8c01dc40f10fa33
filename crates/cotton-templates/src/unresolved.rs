use camino::Utf8PathBuf;
use cotton_source::FileSystem;
use cotton_source::Span;
use rustc_hash::FxHashMap;

use crate::names::ComponentName;
use crate::resolver::resolve_component;
use crate::resolver::ResolveResult;
use crate::resolver::SearchPaths;
use crate::scanner::scan_tags;

/// An opening tag whose component has no template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedComponent {
    pub name: ComponentName,
    /// The name only, without the `<c-` prefix.
    pub span: Span,
    pub tried: Vec<Utf8PathBuf>,
}

/// Every opening component tag in `text` that does not resolve.
///
/// Closing tags are skipped so a missing component is reported once per
/// use, and built-in names are never reported.
pub fn unresolved_components(
    text: &str,
    search_paths: &SearchPaths,
    fs: &dyn FileSystem,
) -> Vec<UnresolvedComponent> {
    let mut results: FxHashMap<ComponentName, Option<Vec<Utf8PathBuf>>> = FxHashMap::default();
    let mut unresolved = Vec::new();

    for tag in scan_tags(text) {
        if tag.is_closing() || tag.name.is_builtin() {
            continue;
        }

        let tried = results
            .entry(tag.name.clone())
            .or_insert_with(|| match resolve_component(&tag.name, search_paths, fs) {
                ResolveResult::Found(_) => None,
                ResolveResult::NotFound { tried, .. } => Some(tried),
            });

        if let Some(tried) = tried {
            unresolved.push(UnresolvedComponent {
                name: tag.name,
                span: tag.name_span,
                tried: tried.clone(),
            });
        }
    }

    unresolved
}
