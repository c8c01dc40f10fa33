use std::io::IsTerminal;
use std::io::Read as _;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use cotton_conf::DiagnosticSeverity;
use cotton_conf::DiagnosticsConfig;
use cotton_conf::Settings;
use cotton_ide::render_unresolved;
use cotton_source::is_template;
use cotton_source::DiagnosticRenderer;
use cotton_source::FileSystem;
use cotton_source::OsFileSystem;
use cotton_templates::display_path;
use cotton_templates::unresolved_components;
use cotton_templates::SearchPaths;
use cotton_workspace::walk_files;

use crate::args::Args;
use crate::args::GlobalArgs;
use crate::commands::Command;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Check {
    /// Files or directories to check. If omitted, checks the whole project.
    pub(crate) paths: Vec<Utf8PathBuf>,

    /// Select specific diagnostic codes to enable (e.g. C100).
    #[arg(long, value_delimiter = ',')]
    pub(crate) select: Vec<String>,

    /// Ignore specific diagnostic codes (e.g. C100).
    #[arg(long, value_delimiter = ',')]
    pub(crate) ignore: Vec<String>,
}

/// What the checks of a file need besides its text.
struct CheckContext<'a> {
    project_root: &'a Utf8Path,
    search_paths: SearchPaths,
    config: DiagnosticsConfig,
    fs: &'a dyn FileSystem,
    fmt: DiagnosticRenderer,
}

impl CheckContext<'_> {
    fn render(&self, source: &str, path: &str) -> Vec<String> {
        unresolved_components(source, &self.search_paths, self.fs)
            .iter()
            .filter_map(|component| {
                render_unresolved(
                    source,
                    path,
                    component,
                    &self.config,
                    self.project_root,
                    &self.fmt,
                )
            })
            .collect()
    }
}

impl Command for Check {
    fn execute(&self, args: &Args) -> Result<Exit> {
        let project_root = resolve_project_root()?;
        let settings = Settings::new(&project_root, None).context("Failed to load settings")?;
        init_logging(log_level(&args.global, &settings));

        let search_paths = SearchPaths::new(settings.search_dirs(&project_root));
        tracing::debug!("Component search paths: {:?}", search_paths.dirs());

        let ctx = CheckContext {
            project_root: &project_root,
            search_paths,
            config: build_diagnostics_config(&settings, &self.select, &self.ignore),
            fs: &OsFileSystem,
            fmt: pick_renderer(),
        };
        let quiet = args.global.quiet;

        let reading_stdin = !std::io::stdin().is_terminal() && self.paths.is_empty();

        if reading_stdin {
            return check_stdin(&ctx, quiet);
        }

        let files = discover_files(&self.paths, &project_root);
        tracing::info!("Checking {} templates", files.len());

        let mut error_count: usize = 0;
        let mut file_count: usize = 0;

        for path in &files {
            let source = match ctx.fs.read_to_string(path) {
                Ok(source) => source,
                Err(err) => {
                    tracing::warn!("Failed to read {}: {}", path, err);
                    continue;
                }
            };

            let rendered = ctx.render(&source, display_path(path, &project_root).as_str());
            if !rendered.is_empty() {
                file_count += 1;
                error_count += rendered.len();
                if !quiet {
                    for output in &rendered {
                        println!("{output}\n");
                    }
                }
            }
        }

        if error_count > 0 {
            let file_word = if file_count == 1 { "file" } else { "files" };
            let error_word = if error_count == 1 { "error" } else { "errors" };
            Ok(Exit::error().with_message(format!(
                "Found {error_count} {error_word} in {file_count} {file_word}."
            )))
        } else {
            Ok(Exit::success())
        }
    }
}

fn discover_files(paths: &[Utf8PathBuf], project_root: &Utf8Path) -> Vec<Utf8PathBuf> {
    let resolved: Vec<Utf8PathBuf> = if paths.is_empty() {
        vec![project_root.to_owned()]
    } else {
        paths
            .iter()
            .map(|p| {
                if p.is_relative() {
                    project_root.join(p)
                } else {
                    p.clone()
                }
            })
            .collect()
    };

    walk_files(&resolved, is_template)
}

fn check_stdin(ctx: &CheckContext<'_>, quiet: bool) -> Result<Exit> {
    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .context("Failed to read stdin")?;

    let rendered = ctx.render(&source, "<stdin>.html");
    if rendered.is_empty() {
        Ok(Exit::success())
    } else {
        if !quiet {
            for output in &rendered {
                println!("{output}\n");
            }
        }
        let count = rendered.len();
        let word = if count == 1 { "error" } else { "errors" };
        Ok(Exit::error().with_message(format!("Found {count} {word}.")))
    }
}

fn build_diagnostics_config(
    settings: &Settings,
    select: &[String],
    ignore: &[String],
) -> DiagnosticsConfig {
    let mut config = settings.diagnostics().clone();

    for code in select {
        config.set_severity(code, DiagnosticSeverity::Error);
    }

    for code in ignore {
        config.set_severity(code, DiagnosticSeverity::Off);
    }

    config
}

fn resolve_project_root() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Utf8PathBuf::from_path_buf(cwd)
        .map_err(|_| anyhow::anyhow!("Current directory is not valid UTF-8"))
}

fn pick_renderer() -> DiagnosticRenderer {
    if std::io::stdout().is_terminal() {
        DiagnosticRenderer::styled()
    } else {
        DiagnosticRenderer::plain()
    }
}

/// `debug = true` in the settings turns on DEBUG unless `--quiet` was given.
fn log_level(global: &GlobalArgs, settings: &Settings) -> LevelFilter {
    let level = global.log_level();
    if settings.debug() && level != LevelFilter::OFF {
        level.max(LevelFilter::DEBUG)
    } else {
        level
    }
}

/// Log to stderr so diagnostics on stdout stay machine-readable.
fn init_logging(level: LevelFilter) {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .try_init();
}
