//! Open documents and the file view the engine reads through.

mod buffers;
mod document;
mod fs;
pub mod paths;
mod walk;

pub use buffers::Buffers;
pub use document::TextDocument;
pub use fs::WorkspaceFileSystem;
pub use walk::walk_files;
