//! Logging Infrastructure
//!
//! `tracing` subscriber with an env filter and optional daily file output.

use std::path::Path;

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "wms_server=info,tower_http=info";

/// Initialize the logger with stdout output
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger with optional file output
///
/// `RUST_LOG` wins over `log_level`; without either the crate and
/// request traces log at info. When `log_dir` exists, output goes to a
/// daily rolling file there instead of stdout.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match log_level {
        Some(level) => EnvFilter::new(format!("wms_server={level},tower_http={level}")),
        None => EnvFilter::new(DEFAULT_DIRECTIVES),
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.is_dir() {
            let file_appender = tracing_appender::rolling::daily(log_path, "wms-server");
            subscriber.with_ansi(false).with_writer(file_appender).init();
            return;
        }
        eprintln!("LOG_DIR {dir} does not exist, logging to stdout");
    }

    subscriber.init();
}
