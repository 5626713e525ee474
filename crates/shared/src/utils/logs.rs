use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|val| val == "true" || val == "1")
        .unwrap_or(false)
}

/// Installs the global subscriber.
///
/// Console output is pretty-printed when `DEV_MODE` is set and JSON otherwise.
/// With `ENABLE_FILE_LOG` a daily-rolling JSON file is written to `LOG_DIR`
/// (default `./logs`); the returned guard must live as long as the process.
pub fn init_logger(component: &str) -> Option<WorkerGuard> {
    let is_dev = env_flag("DEV_MODE");

    let console_filter =
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = if is_dev {
        fmt::layer()
            .pretty()
            .with_thread_names(true)
            .with_ansi(true)
            .with_filter(console_filter())
            .boxed()
    } else {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_filter(console_filter())
            .boxed()
    };

    let (file_layer, guard) = if env_flag("ENABLE_FILE_LOG") {
        let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string());
        let file_name = format!("rust_app_{component}.log");
        let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, file_name);
        let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

        let layer = fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .json()
            .with_filter(EnvFilter::new("info"))
            .boxed();

        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    // a second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();

    guard
}
