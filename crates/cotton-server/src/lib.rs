//! Language server for django-cotton components.

mod encoding;
mod logging;
mod server;
mod session;

use anyhow::Result;
use tower_lsp_server::LspService;
use tower_lsp_server::Server;

pub use crate::server::CottonLanguageServer;

/// Serve LSP over stdio until the client disconnects.
pub async fn serve() -> Result<()> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::build(|client| {
        let log_client = client.clone();
        let (log_guard, log_filter) = logging::init_tracing(move |message_type, message| {
            // Events emitted off the runtime, e.g. during shutdown, are only
            // written to the log file.
            let Ok(handle) = tokio::runtime::Handle::try_current() else {
                return;
            };
            let client = log_client.clone();
            handle.spawn(async move {
                client.log_message(message_type, message).await;
            });
        });

        CottonLanguageServer::new(client, log_guard, log_filter)
    })
    .finish();

    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}

/// Blocking entry point for the `serve` command.
pub fn run() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve())
}
