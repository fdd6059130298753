//! Logging setup for the gizmo sandbox
//
// Console only. `RUST_LOG` overrides the default filter.
//
// Usage:
//   Call `logging::init(verbose)` at the start of main().

use tracing::Subscriber;
use tracing_subscriber::fmt::{
    format::{FormatEvent, FormatFields, Writer},
    FmtContext,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";
const VERBOSE_FILTER: &str = "debug,editor_backend=trace";

/// Initializes logging.
///
/// - `verbose`: colored output with thread ids and targets, and a chattier
///   default filter.
pub fn init(verbose: bool) {
    let env_filter = match std::env::var("RUST_LOG") {
        Ok(val) => EnvFilter::new(val),
        Err(_) if verbose => EnvFilter::new(VERBOSE_FILTER),
        Err(_) => EnvFilter::new(DEFAULT_FILTER),
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    if verbose {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stdout)
            .event_format(SandboxFormatter);
        registry.with(console_layer).init();
    } else {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(false)
            .without_time();
        registry.with(console_layer).init();
    }
}

/// Colored console formatter.
pub struct SandboxFormatter;

impl<S, N> FormatEvent<S, N> for SandboxFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let (level_str, level_color) = match *meta.level() {
            tracing::Level::ERROR => ("ERROR", "\x1b[1;91m"),
            tracing::Level::WARN => ("WARN ", "\x1b[1;93m"),
            tracing::Level::INFO => ("INFO ", "\x1b[1;94m"),
            tracing::Level::DEBUG => ("DEBUG", "\x1b[1;92m"),
            tracing::Level::TRACE => ("TRACE", "\x1b[1;95m"),
        };
        write!(writer, "{}{}\x1b[0m ", level_color, level_str)?;

        let thread = std::thread::current();
        write!(writer, "\x1b[2;35m[{:?}]\x1b[0m ", thread.id())?;
        write!(writer, "\x1b[4;2;33m{}\x1b[0m: ", meta.target())?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
