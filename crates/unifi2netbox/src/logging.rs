//! Subscriber setup.
//!
//! Every line, on the console and in the files, reads
//! `<timestamp> - <LEVEL> - <message>`. The audit command parses that
//! shape back out of `info.log`, so it is not cosmetic.

use std::fmt;
use std::fs;
use std::path::Path;

use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{EnvFilter, filter_fn};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

use crate::error::CliError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Events from these crates reach the log files.
const OWN_TARGET: &str = "unifi2netbox";

/// Per-level log files, most verbose first.
const LEVEL_FILES: [(Level, &str); 4] = [
    (Level::DEBUG, "debug"),
    (Level::INFO, "info"),
    (Level::WARN, "warning"),
    (Level::ERROR, "error"),
];

pub type LogGuards = Vec<WorkerGuard>;

pub fn min_level(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn level_name(level: Level) -> &'static str {
    match level {
        Level::TRACE => "TRACE",
        Level::DEBUG => "DEBUG",
        Level::INFO => "INFO",
        Level::WARN => "WARNING",
        Level::ERROR => "ERROR",
    }
}

/// `<timestamp> - <LEVEL> - <message>` in local time.
struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
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
        let now = chrono::Local::now().format(TIMESTAMP_FORMAT);
        write!(writer, "{now} - {} - ", level_name(*event.metadata().level()))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the global subscriber.
///
/// The console gets everything at or above `min`, overridable through
/// `RUST_LOG`. With a `log_dir`, each of `debug.log`, `info.log`,
/// `warning.log` and `error.log` receives exactly its own level, and only
/// for levels at or above `min`.
pub fn init(min: Level, log_dir: Option<&Path>) -> Result<LogGuards, CliError> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,{OWN_TARGET}={min}")));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = vec![
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .event_format(LineFormat)
            .with_filter(console_filter)
            .boxed(),
    ];
    let mut guards = LogGuards::new();

    if let Some(dir) = log_dir {
        fs::create_dir_all(dir).map_err(|source| CliError::LogDir {
            path: dir.display().to_string(),
            source: Box::new(source),
        })?;

        for (level, name) in LEVEL_FILES.into_iter().filter(|(level, _)| *level <= min) {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(name)
                .filename_suffix("log")
                .build(dir)
                .map_err(|source| CliError::LogDir {
                    path: dir.join(format!("{name}.log")).display().to_string(),
                    source: Box::new(source),
                })?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            guards.push(guard);

            layers.push(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .event_format(LineFormat)
                    .with_filter(filter_fn(move |meta| {
                        *meta.level() == level && meta.target().starts_with(OWN_TARGET)
                    }))
                    .boxed(),
            );
        }
    }

    // An already-installed subscriber wins.
    let _ = tracing_subscriber::registry().with(layers).try_init();
    Ok(guards)
}
