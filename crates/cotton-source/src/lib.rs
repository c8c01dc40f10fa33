mod position;
mod render;
mod span;
mod system;

pub use position::LineCol;
pub use position::LineIndex;
pub use position::Offset;
pub use position::PositionEncoding;
pub use render::Diagnostic;
pub use render::DiagnosticRenderer;
pub use render::Severity;
pub use span::Span;
pub use system::FileSystem;
pub use system::InMemoryFileSystem;
pub use system::OsFileSystem;

/// Whether a path looks like a component template or a template that uses them.
#[must_use]
pub fn is_template(path: &camino::Utf8Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
}
