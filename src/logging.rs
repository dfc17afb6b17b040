//! Logging setup
//!
//! Events go to stdout (INFO and above) and to one append-only file per
//! day, `<log_directory>/webroot-<DD-MM-YYYY>.log`. The file only receives
//! the levels listed in the config. It is opened for every entry and
//! closed right after, so no handle is held between requests.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::{LevelFilter, filter_fn};
use tracing_subscriber::fmt::format;
use tracing_subscriber::fmt::writer::EitherWriter;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Config, LogLevel};

pub const LOG_FILE_PREFIX: &str = "webroot";

/// Path of the log file for `date`.
pub fn log_file_path(directory: &Path, date: NaiveDate) -> PathBuf {
    directory.join(format!("{}-{}.log", LOG_FILE_PREFIX, date.format("%d-%m-%Y")))
}

/// Opens today's log file in append mode for each event.
#[derive(Debug, Clone)]
pub struct DailyLogFile {
    directory: PathBuf,
}

impl DailyLogFile {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

impl<'a> MakeWriter<'a> for DailyLogFile {
    type Writer = EitherWriter<File, io::Sink>;

    fn make_writer(&'a self) -> Self::Writer {
        let path = log_file_path(&self.directory, Local::now().date_naive());

        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => EitherWriter::A(file),
            Err(e) => {
                eprintln!("failed to open log file {}: {}", path.display(), e);
                EitherWriter::B(io::sink())
            }
        }
    }
}

/// `[<level>] <timestamp>: <message>` followed by a blank line.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryFormat;

impl<S, N> FormatEvent<S, N> for EntryFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let level = event.metadata().level().to_string().to_lowercase();
        write!(
            writer,
            "[{}] {}: ",
            level,
            Local::now().format("%Y-%m-%d %H:%M:%S%.6f")
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)?;
        writeln!(writer)
    }
}

/// The log file layer, passing only events whose level is in `levels`.
pub fn file_layer<S>(directory: &Path, levels: &[LogLevel]) -> impl Layer<S> + use<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let levels: Vec<Level> = levels.iter().map(LogLevel::as_level).collect();

    tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .event_format(EntryFormat)
        .with_writer(DailyLogFile::new(directory))
        .with_filter(filter_fn(move |meta| levels.contains(meta.level())))
}

/// Installs the global subscriber.
pub fn init(config: &Config) -> Result<()> {
    std::fs::create_dir_all(&config.log_directory).with_context(|| {
        format!(
            "failed to create log directory {}",
            config.log_directory.display()
        )
    })?;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_filter(LevelFilter::INFO);

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer(&config.log_directory, &config.log_level))
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(())
}
