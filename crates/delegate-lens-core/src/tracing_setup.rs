use std::fs::OpenOptions;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Env var naming a file to append debug logs to. A terminal UI cannot
/// log to stderr, so without it nothing is recorded.
pub const LOG_FILE_ENV: &str = "DELEGATE_LENS_LOG_FILE";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Logging for the terminal dashboard: file only, and only when asked.
pub fn init_file_tracing() {
    let Ok(log_path) = std::env::var(LOG_FILE_ENV) else {
        return;
    };

    let file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", log_path, e);
            return;
        }
    };

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_filter(env_filter("debug"));

    if tracing_subscriber::registry().with(file_layer).try_init().is_ok() {
        eprintln!("File logging enabled: {}", log_path);
    }
}

/// Logging for services: human-readable lines on stderr.
pub fn init_stderr_tracing(default_filter: &str) {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(env_filter(default_filter));

    let _ = tracing_subscriber::registry().with(stderr_layer).try_init();
}
