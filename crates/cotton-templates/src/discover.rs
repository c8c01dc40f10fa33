use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use cotton_source::is_template;
use ignore::WalkBuilder;

use crate::names::ComponentName;
use crate::resolver::SearchPaths;

const INDEX_FILE: &str = "index.html";

/// A component template found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredComponent {
    pub name: ComponentName,
    pub path: Utf8PathBuf,
}

/// The component name a template at `relative` answers to.
///
/// `a/b_c.html` is `a.b_c` and `a/b/index.html` is `a.b`. A path segment
/// containing a dot has no name, since dots are the segment separator.
fn component_name(relative: &Utf8Path) -> Option<(ComponentName, bool)> {
    let mut segments: Vec<&str> = relative.iter().collect();
    let file = segments.pop()?;

    let is_index = file.eq_ignore_ascii_case(INDEX_FILE) && !segments.is_empty();
    if !is_index {
        let stem = file.get(..file.len().checked_sub(".html".len())?)?;
        segments.push(stem);
    }

    if segments.iter().any(|segment| segment.is_empty() || segment.contains('.')) {
        return None;
    }

    let name = ComponentName::new(&segments.join("."))?;
    (!name.is_builtin()).then_some((name, is_index))
}

fn discover_in(base: &Utf8Path) -> BTreeMap<ComponentName, (Utf8PathBuf, bool)> {
    let mut found = BTreeMap::new();

    let mut builder = WalkBuilder::new(base.as_std_path());
    builder
        .standard_filters(false)
        .hidden(true)
        .sort_by_file_name(|a, b| a.cmp(b));

    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!("Skipping unreadable entry under {}: {}", base, err);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let Some(path) = Utf8Path::from_path(entry.path()) else {
            continue;
        };
        if !is_template(path) {
            continue;
        }
        let Ok(relative) = path.strip_prefix(base) else {
            continue;
        };
        let Some((name, is_index)) = component_name(relative) else {
            tracing::trace!("No component name for {}", path);
            continue;
        };

        match found.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert((path.to_owned(), is_index));
            }
            Entry::Occupied(mut slot) => {
                if slot.get().1 && !is_index {
                    slot.insert((path.to_owned(), is_index));
                }
            }
        }
    }

    found
}

/// Every component template under the search paths, sorted by name.
///
/// When two templates answer to the same name, the earlier search path wins,
/// and within one search path `name.html` wins over `name/index.html`, the
/// same order resolution checks them in.
#[must_use]
pub fn discover_components(search_paths: &SearchPaths) -> Vec<DiscoveredComponent> {
    let mut components: BTreeMap<ComponentName, Utf8PathBuf> = BTreeMap::new();

    for base in search_paths.dirs() {
        if !base.is_dir() {
            tracing::debug!("Skipping missing template directory {}", base);
            continue;
        }
        for (name, (path, _)) in discover_in(base) {
            components.entry(name).or_insert(path);
        }
    }

    components
        .into_iter()
        .map(|(name, path)| DiscoveredComponent { name, path })
        .collect()
}
