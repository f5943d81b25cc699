//! Console and log-file output
//!
//! Every event goes to stdout and, when configured, is appended to the log
//! file. Human lines look like `2026-01-31 04:05:06 - INFO: message`; the
//! JSON mode emits one object per line with `timestamp`, `level` and
//! `message`.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use chrono::Local;
use r53_ddns_core::config::{LogLevel, LoggingConfig};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{Layer, Registry};

/// Targets that log at the configured level; everything else (SDK, HTTP
/// stack) is held to warnings
const OWN_TARGETS: &[&str] = &["r53_ddns", "route53_ddns"];

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// `<ts> - <LEVEL>: <message>` lines in local time
pub struct HumanFormat;

impl<S, N> FormatEvent<S, N> for HumanFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{} - {}: ",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            level_name(event.metadata().level())
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// RFC 3339 local timestamps for the JSON formatter
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Local::now().to_rfc3339())
    }
}

fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARN",
        Level::INFO => "INFO",
        _ => "DEBUG",
    }
}

pub fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
    }
}

/// Per-target filter for the configured level
pub fn targets(level: LogLevel) -> Targets {
    let level = level_filter(level);
    OWN_TARGETS.iter().fold(
        Targets::new().with_default(level.min(LevelFilter::WARN)),
        |targets, target| targets.with_target(*target, level),
    )
}

fn format_layer<W>(json: bool, writer: W) -> BoxedLayer
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    if json {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .with_target(false)
            .with_timer(LocalTime)
            .with_writer(writer)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .event_format(HumanFormat)
            .with_ansi(false)
            .with_writer(writer)
            .boxed()
    }
}

/// Build the subscriber writing to `console` and, if given, `file`
pub fn subscriber<W>(
    config: &LoggingConfig,
    console: W,
    file: Option<File>,
) -> impl Subscriber + Send + Sync
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let mut layers = vec![format_layer(config.json, console)];
    if let Some(file) = file {
        layers.push(format_layer(config.json, Mutex::new(file)));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(targets(config.level))
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber.
///
/// A log file that cannot be opened is not fatal: the error is returned as
/// `Ok(Some(message))` so it can be logged once the console is up.
pub fn init(config: &LoggingConfig) -> anyhow::Result<Option<String>> {
    let (file, file_error) = match &config.file {
        Some(path) => match open_log_file(path) {
            Ok(file) => (Some(file), None),
            Err(e) => (
                None,
                Some(format!(
                    "Cannot open log file {} ({}); logging to console only",
                    path.display(),
                    e
                )),
            ),
        },
        None => (None, None),
    };

    tracing::subscriber::set_global_default(subscriber(config, io::stdout, file))?;
    Ok(file_error)
}
