//! Logging Infrastructure
//!
//! `RUST_LOG` wins over the configured level. Production logs are JSON.
//! With a log directory, output goes to daily rolling files instead of
//! stdout: `app/` for everything and `security/` for the `security` target.

use std::fs;
use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{log_level},tower_http=info,sqlx=warn")))
}

/// Initialize the logger with stdout output
pub fn init_logger(log_level: &str, json_format: bool) {
    init_logger_with_file(log_level, json_format, None);
}

/// Initialize the logger with optional file output
///
/// Installing twice is a no-op, so tests can call this freely.
pub fn init_logger_with_file(log_level: &str, json_format: bool, log_dir: Option<&str>) {
    if let Some(dir) = log_dir {
        match file_appenders(Path::new(dir)) {
            Ok((app_log, security_log)) => {
                let app_layer = fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::sync::Mutex::new(app_log))
                    .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                        meta.target() != "security"
                    }));
                let security_layer = fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::sync::Mutex::new(security_log))
                    .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                        meta.target() == "security"
                    }));
                let _ = tracing_subscriber::registry()
                    .with(env_filter(log_level))
                    .with(app_layer)
                    .with(security_layer)
                    .try_init();
                return;
            }
            Err(e) => eprintln!("Cannot create log directory {dir} ({e}), logging to stdout"),
        }
    }

    let registry = tracing_subscriber::registry().with(env_filter(log_level));
    let _ = if json_format {
        registry
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };
}

fn file_appenders(dir: &Path) -> std::io::Result<(RollingFileAppender, RollingFileAppender)> {
    let app_dir = dir.join("app");
    let security_dir = dir.join("security");
    fs::create_dir_all(&app_dir)?;
    fs::create_dir_all(&security_dir)?;
    Ok((
        RollingFileAppender::new(Rotation::DAILY, app_dir, "grocery-server"),
        RollingFileAppender::new(Rotation::DAILY, security_dir, "security"),
    ))
}
