//! Component name → template file resolution.

use camino::Utf8Path;
use camino::Utf8PathBuf;
use cotton_source::FileSystem;
use rustc_hash::FxHashSet;

use crate::declaration::parse_declaration;
use crate::declaration::template_doc;
use crate::declaration::ParameterDeclaration;
use crate::names::ComponentName;

/// Ordered template base directories. Earlier directories win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPaths(Vec<Utf8PathBuf>);

impl SearchPaths {
    #[must_use]
    pub fn new(dirs: impl IntoIterator<Item = Utf8PathBuf>) -> Self {
        Self(dirs.into_iter().collect())
    }

    #[must_use]
    pub fn dirs(&self) -> &[Utf8PathBuf] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedComponent {
    pub name: ComponentName,
    pub path: Utf8PathBuf,
}

impl ResolvedComponent {
    /// Read the template and extract what completion and hover show.
    ///
    /// Returns `None` when the file cannot be read.
    #[must_use]
    pub fn load(&self, fs: &dyn FileSystem) -> Option<ComponentTemplate> {
        match fs.read_to_string(&self.path) {
            Ok(contents) => Some(ComponentTemplate {
                parameters: parse_declaration(&contents),
                documentation: template_doc(&contents),
            }),
            Err(err) => {
                tracing::debug!("Failed to read component template {}: {}", self.path, err);
                None
            }
        }
    }
}

/// What a component template declares about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentTemplate {
    /// `None` when the template has no `<c-vars>` tag.
    pub parameters: Option<Vec<ParameterDeclaration>>,
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveResult {
    Found(ResolvedComponent),
    NotFound {
        name: ComponentName,
        /// Every path checked, in lookup order.
        tried: Vec<Utf8PathBuf>,
    },
}

impl ResolveResult {
    #[must_use]
    pub fn ok(self) -> Option<ResolvedComponent> {
        match self {
            Self::Found(component) => Some(component),
            Self::NotFound { .. } => None,
        }
    }
}

/// Paths that may back `name`, in lookup order.
///
/// For each base directory, for each path variant: `<variant>.html`, then
/// `<variant>/index.html`. Identical candidates are listed once.
#[must_use]
pub fn candidate_paths(name: &ComponentName, search_paths: &SearchPaths) -> Vec<Utf8PathBuf> {
    let variants = name.path_variants();
    let mut seen = FxHashSet::default();
    let mut candidates = Vec::new();

    for base in search_paths.dirs() {
        for variant in &variants {
            for candidate in [
                base.join(format!("{variant}.html")),
                base.join(variant).join("index.html"),
            ] {
                if seen.insert(candidate.clone()) {
                    candidates.push(candidate);
                }
            }
        }
    }

    candidates
}

/// Find the template file backing `name`.
///
/// Every call checks the file system again. A candidate that cannot be
/// checked counts as absent and the search moves on.
pub fn resolve_component(
    name: &ComponentName,
    search_paths: &SearchPaths,
    fs: &dyn FileSystem,
) -> ResolveResult {
    let mut tried = Vec::new();

    for candidate in candidate_paths(name, search_paths) {
        if fs.exists(&candidate) {
            tracing::trace!("Resolved component {} to {}", name, candidate);
            return ResolveResult::Found(ResolvedComponent {
                name: name.clone(),
                path: candidate,
            });
        }
        tried.push(candidate);
    }

    tracing::trace!("Component {} not found, tried {} paths", name, tried.len());
    ResolveResult::NotFound {
        name: name.clone(),
        tried,
    }
}

/// `path` relative to `root` when it lives under it.
#[must_use]
pub fn display_path<'a>(path: &'a Utf8Path, root: &Utf8Path) -> &'a Utf8Path {
    path.strip_prefix(root).unwrap_or(path)
}
