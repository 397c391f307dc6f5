//! Logging Infrastructure
//!
//! Structured logging with an env-driven filter, optional JSON output and an
//! optional daily rolling file.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger with console output at `info`
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

/// Initialize the logger
///
/// `RUST_LOG` wins over `log_level` when set.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ledger_server={level},tower_http={level}")));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        match std::fs::create_dir_all(log_path) {
            Ok(()) => {
                let file_appender = tracing_appender::rolling::daily(log_path, "ledger-server");
                if json {
                    subscriber.json().with_writer(file_appender).init();
                } else {
                    subscriber.with_ansi(false).with_writer(file_appender).init();
                }
                return;
            }
            Err(e) => eprintln!("Cannot create log dir {dir}: {e}, logging to stdout"),
        }
    }

    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
