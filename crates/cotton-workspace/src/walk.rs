use camino::Utf8Path;
use camino::Utf8PathBuf;
use ignore::WalkBuilder;

/// Walk the given paths and collect files that pass `predicate`.
///
/// Each entry in `paths` may be a file or a directory:
/// - Files are included directly if `predicate` returns `true`.
/// - Directories are walked recursively; only matching files are collected.
///
/// Hidden entries are skipped and `.gitignore` rules are respected.
///
/// Returns a sorted, deduplicated list of canonical paths.
#[must_use]
pub fn walk_files(
    paths: &[Utf8PathBuf],
    predicate: impl Fn(&Utf8Path) -> bool,
) -> Vec<Utf8PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            if predicate(path) {
                files.push(canonicalize(path).unwrap_or_else(|_| path.clone()));
            }
            continue;
        }

        if !path.is_dir() {
            tracing::debug!("Skipping nonexistent path: {}", path);
            continue;
        }

        for entry in WalkBuilder::new(path.as_std_path())
            .build()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let Some(utf8) = Utf8Path::from_path(entry.path()) else {
                continue;
            };
            if predicate(utf8) {
                files.push(canonicalize(utf8).unwrap_or_else(|_| utf8.to_owned()));
            }
        }
    }

    files.sort();
    files.dedup();
    files
}

fn canonicalize(path: &Utf8Path) -> std::io::Result<Utf8PathBuf> {
    let canonical = dunce::canonicalize(path.as_std_path())?;
    Utf8PathBuf::from_path_buf(canonical)
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidData, "non-UTF-8 path"))
}
