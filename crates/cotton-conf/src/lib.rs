pub mod diagnostics;

use std::fs;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use config::Config;
use config::ConfigError as ExternalConfigError;
use config::File;
use config::FileFormat;
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

pub use crate::diagnostics::DiagnosticSeverity;
pub use crate::diagnostics::DiagnosticsConfig;

/// Searched when no `template_search_paths` are configured.
pub const DEFAULT_TEMPLATE_SEARCH_PATH: &str = "templates/cotton";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration build/deserialize error")]
    Config(#[from] ExternalConfigError),
    #[error("Failed to read pyproject.toml")]
    PyprojectIo(#[from] std::io::Error),
    #[error("Failed to parse pyproject.toml TOML")]
    PyprojectParse(#[from] toml::de::Error),
    #[error("Failed to serialize extracted pyproject data")]
    PyprojectSerialize(#[from] toml::ser::Error),
    #[error("Invalid settings received from the editor")]
    ClientSettings(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    #[serde(alias = "templateSearchPaths")]
    template_search_paths: Vec<String>,
    debug: bool,
    diagnostics: DiagnosticsConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            template_search_paths: vec![DEFAULT_TEMPLATE_SEARCH_PATH.to_string()],
            debug: false,
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

/// Settings pushed by the editor through `initializationOptions` or
/// `workspace/didChangeConfiguration`. Only the keys present override the
/// file-based configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClientOverrides {
    #[serde(alias = "templateSearchPaths")]
    template_search_paths: Option<Vec<String>>,
    debug: Option<bool>,
    diagnostics: Option<DiagnosticsConfig>,
}

impl Settings {
    pub fn new(
        project_root: &Utf8Path,
        overrides: Option<&serde_json::Value>,
    ) -> Result<Self, ConfigError> {
        let user_config_file = ProjectDirs::from("io", "django-cotton", "cotton-ls")
            .and_then(|proj_dirs| {
                Utf8PathBuf::from_path_buf(proj_dirs.config_dir().join("cotton.toml")).ok()
            });

        let mut settings = Self::load_from_paths(project_root, user_config_file.as_deref())?;

        if let Some(value) = overrides {
            settings.apply_overrides(value)?;
        }

        Ok(settings)
    }

    fn load_from_paths(
        project_root: &Utf8Path,
        user_config_path: Option<&Utf8Path>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = user_config_path {
            builder = builder.add_source(
                File::from(path.as_std_path())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let pyproject_path = project_root.join("pyproject.toml");
        if pyproject_path.exists() {
            let content = fs::read_to_string(&pyproject_path)?;
            let document: toml::Table = toml::from_str(&content)?;

            let cotton_table = document
                .get("tool")
                .and_then(|tool| tool.get("cotton"))
                .and_then(toml::Value::as_table);

            if let Some(table) = cotton_table {
                let cotton_toml = toml::to_string(table)?;
                builder = builder.add_source(File::from_str(&cotton_toml, FileFormat::Toml));
            }
        }

        builder = builder.add_source(
            File::from(project_root.join(".cotton.toml").as_std_path())
                .format(FileFormat::Toml)
                .required(false),
        );

        builder = builder.add_source(
            File::from(project_root.join("cotton.toml").as_std_path())
                .format(FileFormat::Toml)
                .required(false),
        );

        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;
        Ok(settings.normalized())
    }

    fn apply_overrides(&mut self, value: &serde_json::Value) -> Result<(), ConfigError> {
        // Editors commonly namespace their settings under the server's section.
        let value = value.get("cotton").unwrap_or(value);
        if value.is_null() {
            return Ok(());
        }

        let overrides = ClientOverrides::deserialize(value)?;
        tracing::debug!(?overrides, "Applying editor settings");

        if let Some(paths) = overrides.template_search_paths {
            self.template_search_paths = paths;
        }
        if let Some(debug) = overrides.debug {
            self.debug = debug;
        }
        if let Some(diagnostics) = overrides.diagnostics {
            self.diagnostics = diagnostics;
        }

        *self = std::mem::take(self).normalized();
        Ok(())
    }

    /// An empty search path list behaves like an unset one.
    fn normalized(mut self) -> Self {
        self.template_search_paths
            .retain(|path| !path.trim().is_empty());
        if self.template_search_paths.is_empty() {
            self.template_search_paths = vec![DEFAULT_TEMPLATE_SEARCH_PATH.to_string()];
        }
        self
    }

    #[must_use]
    pub fn template_search_paths(&self) -> &[String] {
        &self.template_search_paths
    }

    /// Search paths as absolute directories, in priority order.
    ///
    /// Relative entries resolve against `project_root`.
    #[must_use]
    pub fn search_dirs(&self, project_root: &Utf8Path) -> Vec<Utf8PathBuf> {
        self.template_search_paths
            .iter()
            .map(|path| {
                let path = Utf8Path::new(path);
                if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    project_root.join(path)
                }
            })
            .collect()
    }

    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    #[must_use]
    pub fn diagnostics(&self) -> &DiagnosticsConfig {
        &self.diagnostics
    }
}
