use std::io;
use std::sync::Arc;

use camino::Utf8Path;
use cotton_source::FileSystem;

use crate::buffers::Buffers;
use crate::paths::path_to_url;

/// File system that layers open editor buffers over another file system.
///
/// Reads first check for an open buffer for the path and fall back to the
/// wrapped file system. A template that is open but never saved therefore
/// resolves, and its unsaved `<c-vars>` edits are what the parser sees.
pub struct WorkspaceFileSystem {
    buffers: Buffers,
    disk: Arc<dyn FileSystem>,
}

impl WorkspaceFileSystem {
    #[must_use]
    pub fn new(buffers: Buffers, disk: Arc<dyn FileSystem>) -> Self {
        Self { buffers, disk }
    }
}

impl FileSystem for WorkspaceFileSystem {
    fn read_to_string(&self, path: &Utf8Path) -> io::Result<String> {
        if let Some(document) = path_to_url(path).and_then(|url| self.buffers.get(&url)) {
            return Ok(document.content().to_string());
        }
        self.disk.read_to_string(path)
    }

    fn exists(&self, path: &Utf8Path) -> bool {
        path_to_url(path).is_some_and(|url| self.buffers.contains(&url)) || self.disk.exists(path)
    }
}
