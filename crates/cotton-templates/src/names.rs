use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Reserved tag names provided by django-cotton itself. They never map to a
/// template file.
pub const BUILTIN_COMPONENTS: [&str; 3] = ["vars", "slot", "component"];

/// Name of the declaration tag listing a component's parameters.
pub const DECLARATION_TAG: &str = "vars";

/// Characters allowed in a component name: `[A-Za-z0-9_.-]`.
#[must_use]
pub fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'_' | b'.' | b'-')
}

/// A dotted component name such as `forms.input`, as written after `<c-`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentName(String);

impl ComponentName {
    #[must_use]
    pub fn new(name: &str) -> Option<Self> {
        if name.is_empty() || !name.bytes().all(is_name_char) {
            return None;
        }
        Some(Self(name.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_builtin(&self) -> bool {
        BUILTIN_COMPONENTS.contains(&self.as_str())
    }

    /// The relative path spellings checked for this component, in priority
    /// order: as written, hyphens as underscores, underscores as hyphens.
    ///
    /// Dots become path separators before the spellings are derived, so the
    /// substitutions apply to the whole joined path. Entries may repeat when
    /// the name has no hyphen or underscore.
    ///
    /// ```
    /// # use cotton_templates::ComponentName;
    /// let name = ComponentName::new("forms.text-input").unwrap();
    /// assert_eq!(
    ///     name.path_variants(),
    ///     ["forms/text-input", "forms/text_input", "forms/text-input"]
    /// );
    /// ```
    #[must_use]
    pub fn path_variants(&self) -> [String; 3] {
        let base = self.0.replace('.', "/");
        let underscored = hyphens_to_underscores(&base);
        let hyphenated = underscores_to_hyphens(&base);
        [base, underscored, hyphenated]
    }
}

fn hyphens_to_underscores(path: &str) -> String {
    path.replace('-', "_")
}

fn underscores_to_hyphens(path: &str) -> String {
    path.replace('_', "-")
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for ComponentName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
