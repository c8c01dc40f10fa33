use std::collections::HashMap;

use serde::Deserialize;
use serde::Deserializer;

/// Diagnostic severity level as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Off,
    Error,
    Warning,
    Info,
    Hint,
}

/// Configuration for diagnostic severity levels.
///
/// All diagnostics are enabled by default at "error" severity.
/// Configure severity per diagnostic code or prefix pattern.
/// Specific codes override prefix patterns. Codes are case-insensitive and
/// stored uppercase, so a later setting for `c100` replaces one for `C100`.
///
/// ```toml
/// [diagnostics.severity]
/// C100 = "warning"
/// "C" = "off"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct DiagnosticsConfig {
    /// Map of uppercase diagnostic codes/prefixes to severity levels.
    #[serde(default, deserialize_with = "uppercase_codes")]
    severity: HashMap<String, DiagnosticSeverity>,
}

fn uppercase_codes<'de, D>(
    deserializer: D,
) -> Result<HashMap<String, DiagnosticSeverity>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = HashMap::<String, DiagnosticSeverity>::deserialize(deserializer)?;
    // Sorted so spellings that differ only in case collapse the same way on
    // every load.
    let mut entries: Vec<_> = raw.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries
        .into_iter()
        .map(|(code, severity)| (code.to_ascii_uppercase(), severity))
        .collect())
}

impl DiagnosticsConfig {
    /// Get the severity level for a diagnostic code.
    ///
    /// Resolution order (most specific wins):
    /// 1. Exact match (e.g., "C100")
    /// 2. Longest prefix match (e.g., "C1" over "C")
    /// 3. Default: Error
    ///
    /// Codes compare case-insensitively.
    ///
    /// ```
    /// # use cotton_conf::{DiagnosticsConfig, DiagnosticSeverity};
    /// let mut config = DiagnosticsConfig::default();
    /// config.set_severity("C", DiagnosticSeverity::Warning);
    /// config.set_severity("c100", DiagnosticSeverity::Off);
    ///
    /// assert_eq!(config.get_severity("C100"), DiagnosticSeverity::Off);
    /// assert_eq!(config.get_severity("C101"), DiagnosticSeverity::Warning);
    /// assert_eq!(config.get_severity("X100"), DiagnosticSeverity::Error);
    /// ```
    #[must_use]
    pub fn get_severity(&self, code: &str) -> DiagnosticSeverity {
        let code = code.to_ascii_uppercase();
        if let Some(&severity) = self.severity.get(&code) {
            return severity;
        }

        let mut best_match: Option<(usize, DiagnosticSeverity)> = None;
        for (pattern, &severity) in &self.severity {
            if !code.starts_with(pattern.as_str()) {
                continue;
            }
            match best_match {
                Some((len, _)) if len >= pattern.len() => {}
                _ => best_match = Some((pattern.len(), severity)),
            }
        }

        best_match.map_or(DiagnosticSeverity::Error, |(_, severity)| severity)
    }

    pub fn set_severity(&mut self, code: &str, severity: DiagnosticSeverity) {
        self.severity.insert(code.to_ascii_uppercase(), severity);
    }
}
