//! Editor features for django-cotton components.
//!
//! This crate turns the tag analysis in `cotton-templates` into LSP payloads:
//! go-to-definition, completion, hover and diagnostics. It also renders
//! diagnostics for the command line.

mod completions;
mod diagnostics;
mod ext;
mod hover;
mod navigation;

pub use completions::attribute_completions;
pub use completions::component_completions;
pub use completions::handle_completion;
pub use diagnostics::collect_diagnostics;
pub use diagnostics::render_unresolved;
pub use diagnostics::UNRESOLVED_COMPONENT;
pub use ext::DiagnosticSeverityExt;
pub use hover::hover;
pub use navigation::goto_definition;

/// Value of the `source` field on every published diagnostic.
pub const SOURCE_NAME: &str = "cotton-ls";
