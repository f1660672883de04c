use core::fmt;
use std::fs::OpenOptions;
use std::io;
use std::sync::Once;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt as tracingfmt, EnvFilter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

/// Column at which log messages start
const MESSAGE_COLUMN: usize = 56;

struct AlignedFormatter;

/// Shortens a source path for display.
/// "crates/dqpsk-modem/src/modulator.rs" becomes "[modem] modulator.rs",
/// "crates/dqpsk-modem/src/iq/writer.rs" becomes "[modem/iq] writer.rs".
fn short_location(file_path: &str) -> String {
    let Some(src_idx) = file_path.find("/src/") else {
        return file_path.to_string();
    };
    let before_src = &file_path[..src_idx];
    let after_src = &file_path[src_idx + 5..];

    let crate_name = match before_src.rfind("dqpsk-") {
        Some(idx) => &before_src[idx + 6..],
        None => before_src.rsplit('/').next().unwrap_or("unknown"),
    };

    match after_src.rsplit_once('/') {
        Some((module_path, filename)) => {
            let first_module = module_path.split('/').next().unwrap_or("");
            format!("[{}/{}] {}", crate_name, first_module, filename)
        }
        None => format!("[{}] {}", crate_name, after_src),
    }
}

impl<S, N> FormatEvent<S, N> for AlignedFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();

        let (color_level, color_reset) = if writer.has_ansi_escapes() {
            match *metadata.level() {
                tracing::Level::ERROR => ("\x1b[31m", "\x1b[0m"),
                tracing::Level::WARN => ("\x1b[33m", "\x1b[0m"),
                tracing::Level::INFO => ("\x1b[32m", "\x1b[0m"),
                tracing::Level::DEBUG => ("\x1b[34m", "\x1b[0m"),
                tracing::Level::TRACE => ("\x1b[35m", "\x1b[0m"),
            }
        } else {
            ("", "")
        };

        // Format: "LEVEL [crate/module] file:line: message"
        let location = format!(
            "{}{:<5}{} {}:{}:",
            color_level,
            metadata.level(),
            color_reset,
            short_location(metadata.file().unwrap_or("unknown")),
            metadata.line().unwrap_or(0)
        );

        let mut message_buf = String::new();
        ctx.field_format().format_fields(format::Writer::new(&mut message_buf), event)?;

        // Color codes take up room in the padded column
        let padding = MESSAGE_COLUMN + color_level.len() + color_reset.len();
        write!(writer, "{:<width$} {}", location, message_buf, width = padding)?;
        writeln!(writer)
    }
}

static INIT_LOG: Once = Once::new();

/// Sets up logging with maximum verbosity (trace level)
/// Mainly for unit tests
pub fn setup_logging_verbose() {
    let (console_filter, _) = logging_filters(true, None);
    // No log file, cannot fail
    let _ = setup_logging(console_filter, None);
}

/// Sets up logging to stderr and optionally, a log file.
/// With `verbose`, both outputs log at trace level.
/// Returns a guard, that needs to be kept alive for logging to file to work
pub fn setup_logging_default(verbose: bool, logfile: Option<String>) -> io::Result<Option<WorkerGuard>> {
    let (console_filter, logfile_and_filter) = logging_filters(verbose, logfile);
    setup_logging(console_filter, logfile_and_filter)
}

/// Console filter and optional (log file, filter) pair for the given verbosity
fn logging_filters(verbose: bool, logfile: Option<String>) -> (EnvFilter, Option<(String, EnvFilter)>) {
    if verbose {
        (EnvFilter::new("trace"), logfile.map(|file| (file, EnvFilter::new("trace"))))
    } else {
        (get_default_console_filter(), logfile.map(|file| (file, get_default_logfile_filter())))
    }
}

/// Console filter. RUST_LOG takes precedence when set.
pub fn get_default_console_filter() -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new("info")
}

fn get_default_logfile_filter() -> EnvFilter {
    EnvFilter::new("debug")
}

/// Sets up logging to stderr and optionally, a verbose log file
/// If an output file is requested, returns Some<WorkerGuard>. Keep this value alive
/// or logging to file may cease working. If no output file is provided, returns None.
fn setup_logging(console_filter: EnvFilter, outfile: Option<(String, EnvFilter)>) -> io::Result<Option<WorkerGuard>> {
    if let Some((outfile, outfile_filter)) = outfile {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(outfile)?;
        let (file_writer, guard) = tracing_appender::non_blocking(file);

        INIT_LOG.call_once(|| {
            let file_layer = tracingfmt::layer()
                .event_format(AlignedFormatter)
                .with_writer(file_writer)
                .with_ansi(false);

            // Stdout is reserved for symbol output, logs go to stderr
            let stderr_layer = tracingfmt::layer()
                .event_format(AlignedFormatter)
                .with_writer(io::stderr);

            tracing_subscriber::registry()
                .with(file_layer.with_filter(outfile_filter))
                .with(stderr_layer.with_filter(console_filter))
                .init();
        });

        Ok(Some(guard))
    } else {
        INIT_LOG.call_once(|| {
            let stderr_layer = tracingfmt::layer()
                .event_format(AlignedFormatter)
                .with_writer(io::stderr);

            tracing_subscriber::registry()
                .with(stderr_layer.with_filter(console_filter))
                .init();
        });
        Ok(None)
    }
}
