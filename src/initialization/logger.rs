//! Logger initialization.

use std::io::Write;

use colored::*;
use log::{Level, LevelFilter};

use crate::config::LogFormat;
use crate::error_handling::InitializationError;

/// Initializes `env_logger` with the given level and format.
///
/// HTTP stack crates default to `info`. Directives from `RUST_LOG` are applied
/// on top of those defaults, so `RUST_LOG=reqwest=debug` turns reqwest logging
/// back on. `level` always wins for this crate.
///
/// Uses `try_init`, so a second call fails with an error instead of panicking.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=reqwest=debug throttled_fetch https://api.example.com --log-level debug
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let env_filters = std::env::var("RUST_LOG").ok();
    builder_with(level, format, env_filters.as_deref()).try_init()?;
    Ok(())
}

fn builder_with(
    level: LevelFilter,
    format: LogFormat,
    env_filters: Option<&str>,
) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();

    builder.filter_level(level);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.filter_module("hyper", LevelFilter::Info);
    builder.filter_module("hyper_util", LevelFilter::Info);
    if let Some(filters) = env_filters {
        builder.parse_filters(filters);
    }
    builder.filter_module("throttled_fetch", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{}",
                    json_line(
                        chrono::Utc::now().timestamp_millis(),
                        record.level(),
                        record.target(),
                        &record.args().to_string(),
                    )
                )
            });
        }
        LogFormat::Plain => {
            colored::control::set_override(true);
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{} [{}] {}",
                    record.target().cyan(),
                    colored_level(record.level()),
                    record.args()
                )
            });
        }
    }

    builder
}

/// One JSON log record, `{"ts":..,"level":..,"target":..,"msg":..}`.
fn json_line(ts_millis: i64, level: Level, target: &str, msg: &str) -> String {
    serde_json::json!({
        "ts": ts_millis,
        "level": level.as_str(),
        "target": target,
        "msg": msg,
    })
    .to_string()
}

fn colored_level(level: Level) -> ColoredString {
    let label = level.as_str();
    match level {
        Level::Error => label.red(),
        Level::Warn => label.yellow(),
        Level::Info => label.green(),
        Level::Debug => label.blue(),
        Level::Trace => label.purple(),
    }
}
