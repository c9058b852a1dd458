//! Logging utilities for the Coffee Chat application.
//!
//! Every crate logs through the `tracing` macros; this module owns the subscriber
//! setup. Output goes to stdout with target, file and line information, and
//! optionally to a daily rolling file when `logging.directory` is configured.

use coffeechat_config::LoggingConfig;
use std::str::FromStr;
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Target prefix shared by all workspace crates (`coffeechat_gcal`, `coffeechat_reply`, ...).
const TARGET_PREFIX: &str = "coffeechat";

/// Initialize logging from the `logging` config section.
///
/// `RUST_LOG` directives are honoured; the configured level is added for the application's
/// own targets. Calling this twice is harmless, the second call is ignored.
///
/// Returns the file writer guard when a log directory is configured; the caller must
/// keep it alive for the lifetime of the process or buffered lines are lost.
pub fn init_from_config(config: &LoggingConfig) -> Option<WorkerGuard> {
    let level = parse_level(config.level.as_deref());

    let (file_layer, guard) = match config.directory.as_deref() {
        Some(directory) => {
            let prefix = config.file_prefix.as_deref().unwrap_or("coffeechat.log");
            let appender = tracing_appender::rolling::daily(directory, prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let result = tracing_subscriber::registry()
        .with(stdout_layer())
        .with(file_layer)
        .with(build_filter(level))
        .try_init();

    if result.is_ok() {
        info!(
            "Logging initialized at level: {} (file output: {})",
            level,
            config.directory.as_deref().unwrap_or("disabled")
        );
    }
    guard
}

/// Parses a level name, falling back to INFO for missing or unknown values.
pub fn parse_level(level: Option<&str>) -> Level {
    level
        .and_then(|l| Level::from_str(l.trim()).ok())
        .unwrap_or(Level::INFO)
}

fn stdout_layer<S>() -> fmt::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
}

fn build_filter(level: Level) -> EnvFilter {
    let filter = EnvFilter::from_default_env();
    match format!("{}={}", TARGET_PREFIX, level).parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}
