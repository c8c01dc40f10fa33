//! Component tag analysis for django-cotton templates.
//!
//! Everything here works on plain document text plus byte offsets. Template
//! files are only ever touched through [`cotton_source::FileSystem`], and the
//! directories to search are passed into every call as [`SearchPaths`].

mod attributes;
mod context;
mod declaration;
mod discover;
mod locator;
mod names;
mod resolver;
mod scanner;
mod unresolved;

pub use attributes::analyze_attributes;
pub use attributes::AttributeContext;
pub use attributes::AttributeSlot;
pub use attributes::PartialToken;
pub use context::name_context;
pub use context::NameContext;
pub use declaration::parse_declaration;
pub use declaration::template_doc;
pub use declaration::ParameterDeclaration;
pub use discover::discover_components;
pub use discover::DiscoveredComponent;
pub use locator::enclosing_tag;
pub use locator::locate_tag;
pub use locator::tag_at;
pub use names::ComponentName;
pub use names::BUILTIN_COMPONENTS;
pub use resolver::candidate_paths;
pub use resolver::display_path;
pub use resolver::resolve_component;
pub use resolver::ComponentTemplate;
pub use resolver::ResolveResult;
pub use resolver::ResolvedComponent;
pub use resolver::SearchPaths;
pub use scanner::scan_attributes;
pub use scanner::scan_tag;
pub use scanner::scan_tags;
pub use scanner::Attribute;
pub use scanner::TagKind;
pub use scanner::TagOccurrence;
pub use unresolved::unresolved_components;
pub use unresolved::UnresolvedComponent;
