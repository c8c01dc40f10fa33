//! Path and URL conversion utilities
//!
//! Conversion between file paths, `file://` URLs and LSP URIs, handling
//! percent-encoding and platform-specific path formats.

use camino::Utf8Path;
use camino::Utf8PathBuf;
use tower_lsp_server::ls_types;
use url::Url;

/// Convert a `file://` URL to a [`Utf8PathBuf`].
#[must_use]
pub fn url_to_path(url: &Url) -> Option<Utf8PathBuf> {
    if url.scheme() != "file" {
        return None;
    }

    let path = percent_encoding::percent_decode_str(url.path())
        .decode_utf8()
        .ok()?
        .into_owned();

    // Remove leading '/' for paths like /C:/...
    #[cfg(windows)]
    let path = path.strip_prefix('/').map(str::to_string).unwrap_or(path);

    Some(Utf8PathBuf::from(path))
}

/// Convert an LSP URI to a [`Utf8PathBuf`]. Non-file URIs yield `None`.
#[must_use]
pub fn uri_to_path(uri: &ls_types::Uri) -> Option<Utf8PathBuf> {
    let url = uri_to_url(uri)?;
    let path = url_to_path(&url);
    if path.is_none() {
        tracing::trace!("URI conversion to path failed for: {}", uri.as_str());
    }
    path
}

#[must_use]
pub fn uri_to_url(uri: &ls_types::Uri) -> Option<Url> {
    Url::parse(uri.as_str()).ok()
}

/// Convert a [`Utf8Path`] to a `file://` URL.
///
/// Relative paths are resolved to absolute paths first.
#[must_use]
pub fn path_to_url(path: &Utf8Path) -> Option<Url> {
    if path.is_absolute() {
        return Url::from_file_path(path.as_std_path()).ok();
    }

    if let Ok(absolute) = dunce::canonicalize(path.as_std_path()) {
        return Url::from_file_path(absolute).ok();
    }

    Url::from_file_path(path.as_std_path()).ok()
}

#[must_use]
pub fn path_to_uri(path: &Utf8Path) -> Option<ls_types::Uri> {
    url_to_uri(&path_to_url(path)?)
}

#[must_use]
pub fn url_to_uri(url: &Url) -> Option<ls_types::Uri> {
    url.as_str().parse::<ls_types::Uri>().ok()
}
