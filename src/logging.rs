use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::fs;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup logging with a daily-rotating file appender and optional console
/// output.
///
/// Test runs usually want console output on so the trace interleaves with
/// the test harness output; CI archiving only needs the files.
///
/// # Arguments
/// * `log_dir` - Directory for log files (created if missing)
/// * `log_prefix` - Prefix for log files (e.g. "dialog-driver")
/// * `debug_mode` - If true, log at debug level; otherwise info
/// * `console_output` - If true, also log to stderr with ANSI colors
///
/// # Returns
/// A guard that must be held for the duration of the program to keep the
/// non-blocking writer flushing.
pub fn setup_logging(
    log_dir: &str,
    log_prefix: &str,
    debug_mode: bool,
    console_output: bool,
) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_path = Utf8PathBuf::from(log_dir);
    if !log_path.exists() {
        fs::create_dir_all(&log_path)
            .with_context(|| format!("Failed to create log directory: {}", log_dir))?;
    }

    let file_appender = rolling::daily(log_dir, log_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = if debug_mode {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    if console_output {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .with(console_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .init();
    }

    tracing::info!(
        "Logging initialized: dir={}, prefix={}, debug={}, console={}",
        log_dir,
        log_prefix,
        debug_mode,
        console_output
    );

    Ok(guard)
}
