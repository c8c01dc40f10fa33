use std::sync::Arc;

use cotton_source::is_template;
use cotton_workspace::paths::uri_to_url;
use cotton_workspace::paths::url_to_path;
use cotton_workspace::paths::url_to_uri;
use cotton_workspace::TextDocument;
use tokio::sync::RwLock;
use tower_lsp_server::jsonrpc::Result as LspResult;
use tower_lsp_server::ls_types;
use tower_lsp_server::Client;
use tower_lsp_server::LanguageServer;
use tracing_appender::non_blocking::WorkerGuard;
use url::Url;

use crate::encoding::position_encoding_to_lsp;
use crate::logging::LogFilter;
use crate::session::Session;

const SERVER_NAME: &str = "cotton-ls";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct CottonLanguageServer {
    client: Client,
    session: Arc<RwLock<Session>>,
    log_filter: LogFilter,
    _log_guard: WorkerGuard,
}

impl CottonLanguageServer {
    #[must_use]
    pub(crate) fn new(client: Client, log_guard: WorkerGuard, log_filter: LogFilter) -> Self {
        Self {
            client,
            session: Arc::new(RwLock::new(Session::default())),
            log_filter,
            _log_guard: log_guard,
        }
    }

    pub async fn with_session<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        let session = self.session.read().await;
        f(&session)
    }

    pub async fn with_session_mut<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut session = self.session.write().await;
        f(&mut session)
    }

    /// Look up the open document for a request, logging when it is missing.
    fn document(session: &Session, uri: &ls_types::Uri) -> Option<TextDocument> {
        let url = uri_to_url(uri)?;
        let document = session.document(&url);
        if document.is_none() {
            tracing::debug!("Request for unopened document: {}", url);
        }
        document
    }

    async fn publish_diagnostics(&self, url: &Url) {
        let published = self
            .with_session(|session| {
                let document = session.document(url)?;
                if !is_component_source(url, &document) {
                    return None;
                }
                let diagnostics = cotton_ide::collect_diagnostics(
                    &document,
                    session.position_encoding(),
                    session.search_paths(),
                    session.fs(),
                    session.settings().diagnostics(),
                    session.project_root(),
                );
                Some((diagnostics, document.version()))
            })
            .await;

        let Some((diagnostics, version)) = published else {
            return;
        };
        let Some(uri) = url_to_uri(url) else {
            return;
        };

        tracing::debug!("Publishing {} diagnostics for {}", diagnostics.len(), url);
        self.client
            .publish_diagnostics(uri, diagnostics, Some(version))
            .await;
    }

    /// Opening, closing or saving a template can change which components
    /// resolve, so every open document is checked again.
    async fn republish_all(&self) {
        let urls = self.with_session(Session::open_urls).await;
        for url in &urls {
            self.publish_diagnostics(url).await;
        }
    }
}

/// Diagnostics only make sense for HTML templates.
fn is_component_source(url: &Url, document: &TextDocument) -> bool {
    document.language_id().contains("html")
        || url_to_path(url).is_some_and(|path| is_template(&path))
}

impl LanguageServer for CottonLanguageServer {
    async fn initialize(
        &self,
        params: ls_types::InitializeParams,
    ) -> LspResult<ls_types::InitializeResult> {
        tracing::info!("Initializing server...");

        let session = Session::new(&params);
        self.log_filter.set_debug(session.settings().debug());
        let encoding = session.position_encoding();
        tracing::info!("Project root: {}", session.project_root());
        self.with_session_mut(|current| *current = session).await;

        Ok(ls_types::InitializeResult {
            capabilities: ls_types::ServerCapabilities {
                completion_provider: Some(ls_types::CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(
                        ["<", "-", ".", ":", " "]
                            .iter()
                            .map(ToString::to_string)
                            .collect(),
                    ),
                    ..Default::default()
                }),
                definition_provider: Some(ls_types::OneOf::Left(true)),
                hover_provider: Some(ls_types::HoverProviderCapability::Simple(true)),
                text_document_sync: Some(ls_types::TextDocumentSyncCapability::Options(
                    ls_types::TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(ls_types::TextDocumentSyncKind::INCREMENTAL),
                        will_save: Some(false),
                        will_save_wait_until: Some(false),
                        save: Some(ls_types::SaveOptions::default().into()),
                    },
                )),
                position_encoding: Some(position_encoding_to_lsp(encoding)),
                ..Default::default()
            },
            server_info: Some(ls_types::ServerInfo {
                name: SERVER_NAME.to_string(),
                version: Some(SERVER_VERSION.to_string()),
            }),
            ..Default::default()
        })
    }

    async fn initialized(&self, _params: ls_types::InitializedParams) {
        tracing::info!("Server received initialized notification.");

        self.with_session(|session| {
            for dir in session.search_paths().dirs() {
                if dir.is_dir() {
                    tracing::info!("Searching for components in {}", dir);
                } else {
                    tracing::warn!("Component directory missing: {}", dir);
                }
            }
        })
        .await;
    }

    async fn shutdown(&self) -> LspResult<()> {
        Ok(())
    }

    async fn did_open(&self, params: ls_types::DidOpenTextDocumentParams) {
        tracing::debug!("Opened document: {:?}", params.text_document.uri);

        let Some(url) = uri_to_url(&params.text_document.uri) else {
            tracing::warn!("Ignoring document with unsupported URI");
            return;
        };

        let document = TextDocument::new(
            params.text_document.text,
            params.text_document.version,
            params.text_document.language_id,
        );
        self.with_session(|session| session.open_document(url, document))
            .await;

        self.republish_all().await;
    }

    async fn did_change(&self, params: ls_types::DidChangeTextDocumentParams) {
        tracing::debug!("Changed document: {:?}", params.text_document.uri);

        let Some(url) = uri_to_url(&params.text_document.uri) else {
            return;
        };

        let updated = self
            .with_session(|session| {
                session.update_document(
                    &url,
                    params.content_changes,
                    params.text_document.version,
                )
            })
            .await;

        if updated {
            self.publish_diagnostics(&url).await;
        } else {
            tracing::warn!("Change for unopened document: {}", url);
        }
    }

    async fn did_save(&self, params: ls_types::DidSaveTextDocumentParams) {
        tracing::debug!("Saved document: {:?}", params.text_document.uri);

        let Some(url) = uri_to_url(&params.text_document.uri) else {
            return;
        };

        if url_to_path(&url).is_some_and(|path| is_template(&path)) {
            self.republish_all().await;
        } else {
            self.publish_diagnostics(&url).await;
        }
    }

    async fn did_close(&self, params: ls_types::DidCloseTextDocumentParams) {
        tracing::debug!("Closed document: {:?}", params.text_document.uri);

        if let Some(url) = uri_to_url(&params.text_document.uri) {
            self.with_session(|session| session.close_document(&url))
                .await;
        }

        self.client
            .publish_diagnostics(params.text_document.uri, Vec::new(), None)
            .await;

        self.republish_all().await;
    }

    async fn completion(
        &self,
        params: ls_types::CompletionParams,
    ) -> LspResult<Option<ls_types::CompletionResponse>> {
        let position = params.text_document_position.position;
        let items = self
            .with_session(|session| {
                let document =
                    Self::document(session, &params.text_document_position.text_document.uri)?;
                Some(cotton_ide::handle_completion(
                    &document,
                    position,
                    session.position_encoding(),
                    session.search_paths(),
                    session.fs(),
                    session.supports_snippets(),
                ))
            })
            .await;

        Ok(items
            .filter(|items| !items.is_empty())
            .map(ls_types::CompletionResponse::Array))
    }

    async fn goto_definition(
        &self,
        params: ls_types::GotoDefinitionParams,
    ) -> LspResult<Option<ls_types::GotoDefinitionResponse>> {
        let position = params.text_document_position_params.position;
        Ok(self
            .with_session(|session| {
                let document = Self::document(
                    session,
                    &params.text_document_position_params.text_document.uri,
                )?;
                cotton_ide::goto_definition(
                    &document,
                    position,
                    session.position_encoding(),
                    session.search_paths(),
                    session.fs(),
                    session.supports_definition_links(),
                )
            })
            .await)
    }

    async fn hover(&self, params: ls_types::HoverParams) -> LspResult<Option<ls_types::Hover>> {
        let position = params.text_document_position_params.position;
        Ok(self
            .with_session(|session| {
                let document = Self::document(
                    session,
                    &params.text_document_position_params.text_document.uri,
                )?;
                cotton_ide::hover(
                    &document,
                    position,
                    session.position_encoding(),
                    session.search_paths(),
                    session.fs(),
                    session.project_root(),
                )
            })
            .await)
    }

    async fn did_change_configuration(&self, params: ls_types::DidChangeConfigurationParams) {
        tracing::info!("Configuration change detected. Reloading settings...");

        let debug = self
            .with_session_mut(|session| {
                session.reload_settings(Some(params.settings));
                session.settings().debug()
            })
            .await;
        self.log_filter.set_debug(debug);

        self.republish_all().await;
    }
}
