//! Process-wide tracing setup.
//!
//! One registry carries a reloadable level filter, a stdout layer that can
//! be muted, and a file layer whose target is bound after startup.

use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Event, Level, Subscriber, error, info};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::{FmtContext, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, reload};

use crate::settings::LoggingSettings;

const DEFAULT_DIRECTIVE: &str = "info,fulfill_ui=debug";

/// `2026-10-16T09:30:12.123456+02:00  INFO state.rs:88 message key=value`
struct LocalTimeFormat;

impl<S, N> FormatEvent<S, N> for LocalTimeFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let ansi = writer.has_ansi_escapes();
        let timestamp = Local::now().format("%Y-%m-%dT%H:%M:%S%.6f%:z");

        if ansi {
            let color = match *meta.level() {
                Level::ERROR => "1;31",
                Level::WARN => "1;33",
                Level::INFO => "1;32",
                Level::DEBUG => "1;34",
                Level::TRACE => "1;35",
            };
            write!(
                writer,
                "\x1b[2m{timestamp}\x1b[0m \x1b[{color}m{:>5}\x1b[0m ",
                meta.level()
            )?;
        } else {
            write!(writer, "{timestamp} {:>5} ", meta.level())?;
        }

        let file = meta
            .file()
            .map(|f| f.rsplit(['/', '\\']).next().unwrap_or(f));
        if let (Some(file), Some(line)) = (file, meta.line()) {
            if ansi {
                write!(writer, "\x1b[36m{file}:{line}\x1b[0m ")?;
            } else {
                write!(writer, "{file}:{line} ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

type SharedFile = Arc<Mutex<Option<File>>>;

fn lock_file(slot: &SharedFile) -> MutexGuard<'_, Option<File>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Writer whose file is attached later. Records are dropped while empty.
#[derive(Clone)]
struct LateFile(SharedFile);

struct LateFileWriter<'a>(MutexGuard<'a, Option<File>>);

impl Write for LateFileWriter<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        match self.0.as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.0.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for LateFile {
    type Writer = LateFileWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LateFileWriter(lock_file(&self.0))
    }
}

type ReloadLevel = Box<dyn Fn(&str) -> Result<()> + Send + Sync>;
type ReloadGate = Box<dyn Fn(bool) -> Result<()> + Send + Sync>;

static APP_NAME: OnceLock<String> = OnceLock::new();
static LEVEL: OnceLock<ReloadLevel> = OnceLock::new();
static STDOUT_GATE: OnceLock<ReloadGate> = OnceLock::new();
static LOG_FILE: OnceLock<SharedFile> = OnceLock::new();

fn initial_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

fn keep_level_handle<S>(handle: reload::Handle<EnvFilter, S>)
where
    S: Subscriber + Send + Sync + 'static,
{
    let _ = LEVEL.set(Box::new(move |directive: &str| {
        let filter = EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log level '{directive}'"))?;
        handle
            .reload(filter)
            .context("failed to reload log filter")
    }));
}

fn keep_stdout_handle<S>(handle: reload::Handle<EnvFilter, S>)
where
    S: Subscriber + Send + Sync + 'static,
{
    let _ = STDOUT_GATE.set(Box::new(move |enabled: bool| {
        // The level filter still applies on top of "trace".
        let gate = EnvFilter::new(if enabled { "trace" } else { "off" });
        handle
            .reload(gate)
            .context("failed to reload stdout filter")
    }));
}

/// Replaces the level filter. Takes a bare level or a full `EnvFilter` directive.
pub fn set_log_level(directive: &str) -> Result<()> {
    match LEVEL.get() {
        Some(reload) => reload(directive),
        None => anyhow::bail!("logging not yet initialized"),
    }
}

/// Mutes or unmutes stdout without touching the log file.
pub fn set_stdout_enabled(enabled: bool) -> Result<()> {
    match STDOUT_GATE.get() {
        Some(reload) => reload(enabled),
        None => anyhow::bail!("logging not yet initialized"),
    }
}

/// Appends log records to `path`, replacing any file already open.
pub fn enable_file_logging(path: &Path) -> Result<()> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))?;

    let slot = LOG_FILE.get().context("logging not yet initialized")?;
    *lock_file(slot) = Some(file);
    info!(path = %path.display(), "file logging enabled");
    Ok(())
}

pub fn disable_file_logging() {
    if let Some(slot) = LOG_FILE.get() {
        *lock_file(slot) = None;
    }
}

/// Executable stem, or `"fulfill"` when it cannot be determined.
pub fn app_name() -> &'static str {
    APP_NAME.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "fulfill".to_string())
    })
}

/// Log file used inside `directory`.
pub fn log_file_path(directory: &Path) -> PathBuf {
    directory.join(format!("{}.log", app_name()))
}

/// Installs the global subscriber. Later calls are no-ops.
///
/// `RUST_LOG` sets the starting level; stdout is colored only on a terminal.
pub fn init_default_logging() {
    let _ = app_name();

    let file: SharedFile = Arc::new(Mutex::new(None));
    let _ = LOG_FILE.set(file.clone());

    let (stdout_gate, stdout_handle) = reload::Layer::new(EnvFilter::new("trace"));
    let (level_filter, level_handle) = reload::Layer::new(initial_filter());

    let stdout_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalTimeFormat)
        .with_ansi(io::stdout().is_terminal())
        .with_filter(stdout_gate);

    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalTimeFormat)
        .with_ansi(false)
        .with_writer(LateFile(file));

    if tracing_subscriber::registry()
        .with(level_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .is_ok()
    {
        keep_level_handle(level_handle);
        keep_stdout_handle(stdout_handle);
    }
}

/// Installs logging and applies the configured level, stdout gate and log
/// directory. `RUST_LOG`, when set, wins over the configured level.
pub fn init_logging(settings: &LoggingSettings) -> Result<()> {
    init_default_logging();

    if std::env::var_os("RUST_LOG").is_none() {
        set_log_level(&settings.level)?;
    }
    set_stdout_enabled(settings.stdout)?;

    if let Some(directory) = &settings.directory {
        std::fs::create_dir_all(directory)
            .with_context(|| format!("cannot create log directory '{}'", directory.display()))?;
        enable_file_logging(&log_file_path(directory))?;
    }
    Ok(())
}

/// Logs a failed background task. Used for fire-and-forget saves.
pub fn log_task_error(
    task_name: &'static str,
    result: Result<()>,
) {
    if let Err(error) = result {
        error!(task = task_name, error = %format!("{error:#}"), "background task failed");
    }
}
