//! Server logging: a rolling file plus `window/logMessage` to the editor.
//!
//! Only INFO and above reach the editor. The file gets whatever `RUST_LOG`
//! allows, or INFO unless the `debug` setting raises it to DEBUG.

use std::sync::Arc;

use tower_lsp_server::ls_types::MessageType;
use tracing::field::Visit;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::reload;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;

const LOG_FILE_NAME: &str = "cotton-ls.log";

/// Sends the `message` field of each event to `send_message`.
pub struct LspLayer {
    send_message: Arc<dyn Fn(MessageType, String) + Send + Sync>,
}

impl LspLayer {
    pub fn new<F>(send_message: F) -> Self
    where
        F: Fn(MessageType, String) + Send + Sync + 'static,
    {
        Self {
            send_message: Arc::new(send_message),
        }
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        }
    }
}

fn message_type(level: Level) -> Option<MessageType> {
    match level {
        Level::ERROR => Some(MessageType::ERROR),
        Level::WARN => Some(MessageType::WARNING),
        Level::INFO => Some(MessageType::INFO),
        Level::DEBUG => Some(MessageType::LOG),
        Level::TRACE => None,
    }
}

impl<S> Layer<S> for LspLayer
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let Some(message_type) = message_type(*event.metadata().level()) else {
            return;
        };

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        if let Some(message) = visitor.message {
            (self.send_message)(message_type, message);
        }
    }
}

/// Switches the log file filter when the `debug` setting changes.
///
/// Inert when `RUST_LOG` chose the filter.
#[derive(Clone)]
pub struct LogFilter {
    handle: Option<reload::Handle<EnvFilter, Registry>>,
}

impl LogFilter {
    fn reloadable() -> (reload::Layer<EnvFilter, Registry>, Self) {
        let (layer, handle) = reload::Layer::new(level_filter(false));
        (
            layer,
            Self {
                handle: Some(handle),
            },
        )
    }

    pub fn set_debug(&self, debug: bool) {
        let Some(handle) = &self.handle else {
            return;
        };
        if let Err(err) = handle.reload(level_filter(debug)) {
            tracing::warn!("Failed to change log level: {}", err);
        }
    }
}

fn level_filter(debug: bool) -> EnvFilter {
    EnvFilter::new(if debug { "debug" } else { "info" })
}

/// Install the global subscriber.
///
/// The file lives at `<temp dir>/cotton-ls.log`, rotated daily. Dropping the
/// returned guard stops the file writer, so the server holds it.
pub fn init_tracing<F>(send_message: F) -> (WorkerGuard, LogFilter)
where
    F: Fn(MessageType, String) + Send + Sync + 'static,
{
    let file_appender = tracing_appender::rolling::daily(std::env::temp_dir(), LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let (env_filter, log_filter) = match EnvFilter::try_from_default_env() {
        Ok(from_env) => (
            reload::Layer::new(from_env).0,
            LogFilter { handle: None },
        ),
        Err(_) => LogFilter::reloadable(),
    };
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter);

    let lsp_layer =
        LspLayer::new(send_message).with_filter(tracing_subscriber::filter::LevelFilter::INFO);

    if let Err(err) = Registry::default().with(file_layer).with(lsp_layer).try_init() {
        eprintln!("Failed to install tracing subscriber: {err}");
    }

    (guard, log_filter)
}
