//! Per-connection state: project root, settings, open documents.

use std::sync::Arc;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use cotton_conf::Settings;
use cotton_source::FileSystem;
use cotton_source::OsFileSystem;
use cotton_source::PositionEncoding;
use cotton_templates::SearchPaths;
use cotton_workspace::paths::uri_to_path;
use cotton_workspace::Buffers;
use cotton_workspace::TextDocument;
use cotton_workspace::WorkspaceFileSystem;
use tower_lsp_server::ls_types;
use url::Url;

use crate::encoding::negotiate_position_encoding;

pub struct Session {
    project_root: Utf8PathBuf,
    settings: Settings,
    /// Settings sent by the editor, reapplied whenever project files reload.
    client_settings: Option<serde_json::Value>,
    search_paths: SearchPaths,
    buffers: Buffers,
    fs: Arc<WorkspaceFileSystem>,
    position_encoding: PositionEncoding,
    client_capabilities: ls_types::ClientCapabilities,
}

impl Default for Session {
    fn default() -> Self {
        Self::with_root(
            Utf8PathBuf::from("."),
            Settings::default(),
            PositionEncoding::default(),
            ls_types::ClientCapabilities::default(),
        )
    }
}

impl Session {
    pub fn new(params: &ls_types::InitializeParams) -> Self {
        let project_root = project_root(params);
        let client_settings = params.initialization_options.clone();
        let settings = load_settings(&project_root, client_settings.as_ref());

        let mut session = Self::with_root(
            project_root,
            settings,
            negotiate_position_encoding(params),
            params.capabilities.clone(),
        );
        session.client_settings = client_settings;
        session
    }

    fn with_root(
        project_root: Utf8PathBuf,
        settings: Settings,
        position_encoding: PositionEncoding,
        client_capabilities: ls_types::ClientCapabilities,
    ) -> Self {
        let buffers = Buffers::new();
        let fs = Arc::new(WorkspaceFileSystem::new(
            buffers.clone(),
            Arc::new(OsFileSystem),
        ));
        let search_paths = SearchPaths::new(settings.search_dirs(&project_root));

        Self {
            project_root,
            settings,
            client_settings: None,
            search_paths,
            buffers,
            fs,
            position_encoding,
            client_capabilities,
        }
    }

    pub fn project_root(&self) -> &Utf8Path {
        &self.project_root
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn search_paths(&self) -> &SearchPaths {
        &self.search_paths
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    pub fn position_encoding(&self) -> PositionEncoding {
        self.position_encoding
    }

    pub fn supports_snippets(&self) -> bool {
        self.client_capabilities
            .text_document
            .as_ref()
            .and_then(|text_document| text_document.completion.as_ref())
            .and_then(|completion| completion.completion_item.as_ref())
            .and_then(|item| item.snippet_support)
            .unwrap_or(false)
    }

    pub fn supports_definition_links(&self) -> bool {
        self.client_capabilities
            .text_document
            .as_ref()
            .and_then(|text_document| text_document.definition.as_ref())
            .and_then(|definition| definition.link_support)
            .unwrap_or(false)
    }

    /// Reload settings from the project files, with `client_settings` on top
    /// when given and the last editor settings otherwise.
    pub fn reload_settings(&mut self, client_settings: Option<serde_json::Value>) {
        if let Some(value) = client_settings.filter(|value| !value.is_null()) {
            self.client_settings = Some(value);
        }
        self.set_settings(load_settings(
            &self.project_root,
            self.client_settings.as_ref(),
        ));
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.search_paths = SearchPaths::new(settings.search_dirs(&self.project_root));
        self.settings = settings;
        tracing::debug!("Component search paths: {:?}", self.search_paths.dirs());
    }

    pub fn open_document(&self, url: Url, document: TextDocument) {
        self.buffers.open(url, document);
    }

    /// Apply incremental edits; returns `false` when the document is not open.
    pub fn update_document(
        &self,
        url: &Url,
        changes: Vec<ls_types::TextDocumentContentChangeEvent>,
        version: i32,
    ) -> bool {
        let encoding = self.position_encoding;
        self.buffers
            .update(url, |document| document.update(changes, version, encoding))
            .is_some()
    }

    pub fn close_document(&self, url: &Url) -> Option<TextDocument> {
        self.buffers.close(url)
    }

    pub fn document(&self, url: &Url) -> Option<TextDocument> {
        self.buffers.get(url)
    }

    pub fn open_urls(&self) -> Vec<Url> {
        self.buffers.urls()
    }
}

/// The first workspace folder, else the process working directory.
fn project_root(params: &ls_types::InitializeParams) -> Utf8PathBuf {
    let from_folders = params
        .workspace_folders
        .as_ref()
        .and_then(|folders| folders.first())
        .and_then(|folder| uri_to_path(&folder.uri));

    if let Some(root) = from_folders {
        return root;
    }

    std::env::current_dir()
        .ok()
        .and_then(|cwd| Utf8PathBuf::from_path_buf(cwd).ok())
        .unwrap_or_else(|| Utf8PathBuf::from("."))
}

fn load_settings(project_root: &Utf8Path, client_settings: Option<&serde_json::Value>) -> Settings {
    match Settings::new(project_root, client_settings) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::error!("Failed to load settings, using defaults: {}", err);
            Settings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn workspace_params(root: &Utf8Path) -> ls_types::InitializeParams {
        let uri = cotton_workspace::paths::path_to_uri(root).unwrap();
        ls_types::InitializeParams {
            workspace_folders: Some(vec![ls_types::WorkspaceFolder {
                uri,
                name: "site".to_string(),
            }]),
            ..Default::default()
        }
    }

    fn temp_root() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        (dir, root)
    }

    #[test]
    fn test_root_from_workspace_folder() {
        let (_dir, root) = temp_root();
        let session = Session::new(&workspace_params(&root));
        assert_eq!(session.project_root(), root);
        assert_eq!(
            session.search_paths().dirs(),
            [root.join("templates/cotton")]
        );
    }

    #[test]
    fn test_root_falls_back_to_cwd() {
        let session = Session::new(&ls_types::InitializeParams::default());
        let cwd = Utf8PathBuf::from_path_buf(std::env::current_dir().unwrap()).unwrap();
        assert_eq!(session.project_root(), cwd);
    }

    #[test]
    fn test_initialization_options_apply() {
        let (_dir, root) = temp_root();
        let mut params = workspace_params(&root);
        params.initialization_options =
            Some(serde_json::json!({ "templateSearchPaths": ["components"] }));

        let session = Session::new(&params);
        assert_eq!(session.search_paths().dirs(), [root.join("components")]);
    }

    #[test]
    fn test_reload_keeps_last_client_settings() {
        let (_dir, root) = temp_root();
        let mut session = Session::new(&workspace_params(&root));

        session.reload_settings(Some(serde_json::json!({
            "cotton": { "templateSearchPaths": ["a", "/abs/b"] }
        })));
        assert_eq!(
            session.search_paths().dirs(),
            [root.join("a"), Utf8PathBuf::from("/abs/b")]
        );

        std::fs::write(root.join("cotton.toml"), "debug = true\n").unwrap();
        session.reload_settings(None);
        assert!(session.settings().debug());
        assert_eq!(session.search_paths().dirs()[0], root.join("a"));
    }

    #[test]
    fn test_broken_project_settings_fall_back_to_defaults() {
        let (_dir, root) = temp_root();
        std::fs::write(root.join("cotton.toml"), "template_search_paths = [\n").unwrap();
        let session = Session::new(&workspace_params(&root));
        assert_eq!(
            session.settings().template_search_paths(),
            ["templates/cotton"]
        );
    }

    #[test]
    fn test_client_capabilities() {
        let mut params = ls_types::InitializeParams::default();
        assert!(!Session::new(&params).supports_snippets());

        params.capabilities.text_document = Some(ls_types::TextDocumentClientCapabilities {
            completion: Some(ls_types::CompletionClientCapabilities {
                completion_item: Some(ls_types::CompletionItemCapability {
                    snippet_support: Some(true),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            definition: Some(ls_types::GotoCapability {
                link_support: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        });
        let session = Session::new(&params);
        assert!(session.supports_snippets());
        assert!(session.supports_definition_links());
    }

    #[test]
    fn test_open_buffers_overlay_disk() {
        let (_dir, root) = temp_root();
        let session = Session::new(&workspace_params(&root));
        let card = root.join("templates/cotton/card.html");
        let url = cotton_workspace::paths::path_to_url(&card).unwrap();

        assert!(!session.fs().exists(&card));
        session.open_document(
            url.clone(),
            TextDocument::new("<c-vars title />".to_string(), 1, "html"),
        );
        assert!(session.fs().exists(&card));
        assert_eq!(
            session.fs().read_to_string(&card).unwrap(),
            "<c-vars title />"
        );

        let changed = session.update_document(
            &url,
            vec![ls_types::TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: "<c-vars size />".to_string(),
            }],
            2,
        );
        assert!(changed);
        assert_eq!(session.document(&url).unwrap().version(), 2);
        assert_eq!(session.open_urls(), [url.clone()]);

        session.close_document(&url);
        assert!(!session.fs().exists(&card));
    }
}
