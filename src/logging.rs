//! Tracing subscriber setup for the two front ends

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const LOG_FILE: &str = "birthday-book.log";
const DEFAULT_FILTER: &str = "birthday_book=info";

fn default_filter() {
    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", DEFAULT_FILTER);
    }
}

/// CLI mode: log to both stderr and the log file
pub fn init_cli() {
    default_filter();

    let file_appender = tracing_appender::rolling::never(".", LOG_FILE);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(EnvFilter::from_default_env()),
        )
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::from_default_env()),
        )
        .init();
}

/// TUI mode: log to the file only so nothing draws over the screen
pub fn init_tui() -> Result<()> {
    default_filter();

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(LOG_FILE)
        .with_context(|| format!("Cannot open log file {}", LOG_FILE))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(log_file)
        .with_ansi(false)
        .init();
    Ok(())
}
