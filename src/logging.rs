//! Logging setup on tracing + tracing-subscriber
//!
//! Log lines always go to stderr so that rendered Markdown on stdout stays
//! clean. `RUST_LOG` overrides per-target levels.

use std::fs;
use std::io::IsTerminal;
use std::path::Path;

use tracing::{Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::LoggingSettings;
use crate::error::{Error, Result};

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync>;

/// Keeps the non-blocking file writer alive; drop flushes pending lines
pub struct LogGuards {
    _file_guard: Option<WorkerGuard>,
}

/// Where a layer writes, which decides how much detail each line carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sink {
    Console,
    File,
}

/// Initialize logging from settings and CLI verbosity flags
pub fn init_logging(settings: &LoggingSettings, verbose: u8, quiet: bool) -> Result<LogGuards> {
    let level = effective_level(settings, verbose, quiet);

    let mut file_guard = None;
    let file_layer = match settings.file.as_deref() {
        Some(log_file) => {
            let appender = rolling_appender(log_file, settings)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            file_guard = Some(guard);
            Some(fmt_layer(writer, Sink::File, settings.json_format))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter(level)?)
        .with(fmt_layer(std::io::stderr, Sink::Console, settings.json_format))
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Internal(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!(
        level = %level,
        file = ?settings.file,
        json = settings.json_format,
        "Logging initialized"
    );

    Ok(LogGuards {
        _file_guard: file_guard,
    })
}

/// Minimal stderr logging for commands that skip configuration
pub fn init_simple(level: Level) -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(level)?)
        .with(fmt_layer(std::io::stderr, Sink::Console, false))
        .try_init()
        .map_err(|e| Error::Internal(format!("Failed to initialize logging: {}", e)))
}

/// `--quiet` wins over `-v`; without flags the configured level applies
fn effective_level(settings: &LoggingSettings, verbose: u8, quiet: bool) -> Level {
    match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => parse_level(&settings.level),
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    }
}

/// Unknown names fall back to `warn`
fn parse_level(name: &str) -> Level {
    match name.to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}

/// `RUST_LOG` if set, else `level`; this crate is always pinned to `level`
fn env_filter(level: Level) -> Result<EnvFilter> {
    let level_name = level.as_str().to_ascii_lowercase();
    let directive = format!("ums_build={}", level_name)
        .parse()
        .map_err(|e| Error::Internal(format!("Invalid log directive: {}", e)))?;

    Ok(EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&level_name))
        .add_directive(directive))
}

fn fmt_layer<S, W>(writer: W, sink: Sink, json: bool) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let detailed = json || sink == Sink::File;
    let ansi = sink == Sink::Console && !json && std::io::stderr().is_terminal();

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(detailed)
        .with_file(detailed)
        .with_line_number(detailed)
        .with_thread_ids(sink == Sink::File);

    match (json, sink) {
        (true, _) => Box::new(layer.json().with_span_events(FmtSpan::CLOSE)),
        (false, Sink::File) => Box::new(layer),
        (false, Sink::Console) => Box::new(layer.compact()),
    }
}

/// Rolling appender for `log_file`; small size hints rotate hourly, otherwise daily
fn rolling_appender(log_file: &str, settings: &LoggingSettings) -> Result<RollingFileAppender> {
    let path = Path::new(log_file);
    let directory = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
            parent
        }
        None => Path::new("."),
    };

    let prefix = path
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("ums-build");
    let rotation = match settings.max_file_size_mb {
        1..=9 => Rotation::HOURLY,
        _ => Rotation::DAILY,
    };

    RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .max_log_files(settings.max_files.max(1) as usize)
        .build(directory)
        .map_err(|e| Error::Internal(format!("Failed to create log file appender: {}", e)))
}
