use std::{
    fs,
    sync::OnceLock,
    sync::atomic::{AtomicUsize, Ordering},
};

use tracing::Metadata;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        self, FmtContext,
        format::{FormatEvent, FormatFields, Writer},
    },
    prelude::*,
};

use crate::{config::LoggingConfig, error::AppError};

pub struct Logger;

impl Logger {
    /// Call **once** near the start of `main`. Keep the returned guard alive
    /// until exit, dropping it flushes the background writer.
    ///
    /// Only a file layer is installed: the live view owns the terminal.
    pub fn init_tracing(config: &LoggingConfig) -> Result<WorkerGuard, AppError> {
        fs::create_dir_all(&config.log_dir)?;

        SEQ.get_or_init(|| AtomicUsize::new(1));

        // daily rolling file appender → <log_dir>/wallpick.YYYY-MM-DD.log
        let file: RollingFileAppender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("wallpick")
            .filename_suffix("log")
            .max_log_files(10)
            .build(&config.log_dir)
            .map_err(|e| AppError::Other(format!("cannot create log appender: {e}")))?;
        let (writer, guard) = tracing_appender::non_blocking(file);

        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let file_layer = fmt::layer()
            .event_format(SeqFileMod)
            .with_writer(writer)
            .with_ansi(false)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(file_layer)
            .try_init()
            .map_err(|e| AppError::Other(format!("logger already initialised: {e}")))?;

        Ok(guard)
    }
}

static SEQ: OnceLock<AtomicUsize> = OnceLock::new();

/// Custom formatter: `SEQ TIMESTAMP LEVEL [file:line mod::path] message`
struct SeqFileMod;

impl<S, N> FormatEvent<S, N> for SeqFileMod
where
    S: tracing::Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut w: Writer<'_>,
        ev: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        // monotonically‑increasing sequence number
        let seq: usize = SEQ
            .get()
            .map(|counter| counter.fetch_add(1, Ordering::Relaxed))
            .unwrap_or(0);

        let meta: &'static Metadata<'static> = ev.metadata();
        write!(
            w,
            "{seq:06} {} {:5} [{}:{} {}] ",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            meta.level(),
            meta.file().unwrap_or("??"),
            meta.line().unwrap_or(0),
            meta.module_path().unwrap_or("???"),
        )?;

        // write all key‑value pairs for this event (usually just the message)
        ctx.field_format().format_fields(w.by_ref(), ev)?;
        writeln!(w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // the only test in the crate that installs a global subscriber
    #[test]
    fn test_init_writes_rolling_file_once() {
        let dir = TempDir::new().unwrap();
        let config = LoggingConfig {
            log_dir: dir.path().join("logs"),
            level: "debug".to_string(),
        };

        let guard = Logger::init_tracing(&config).unwrap();
        tracing::info!("hello from the test");
        drop(guard);

        let files: Vec<String> = fs::read_dir(&config.log_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(files.iter().any(|name| name.starts_with("wallpick")));

        assert!(Logger::init_tracing(&config).is_err());
    }
}
