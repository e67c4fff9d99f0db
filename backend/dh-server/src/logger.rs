use crate::error::{Result as ServerErrorResult, ServerError};

use std::fmt::Display;
use std::path::PathBuf;
use std::time::SystemTime;

use dh_config::LogLevel;
use fern::Dispatch;
use fern::colors::{Color, ColoredLevelConfig};
use log::{LevelFilter, info};

/// Install the process logger.
///
/// Writes `[rfc3339 - LEVEL] message [file:line]` to `log_file` when given,
/// otherwise to stdout (coloured when `colored`).
pub fn initialize(
    log_level: LogLevel,
    log_file: Option<PathBuf>,
    colored: bool,
) -> ServerErrorResult<()> {
    let output = match log_file {
        Some(ref path) => {
            let file = fern::log_file(path).map_err(|e| ServerError::Logger {
                message: format!("Failed to open log file {}: {e}", path.display()),
            })?;
            Dispatch::new()
                .format(|out, message, record| {
                    write_line(out, record.level(), message, record);
                })
                .chain(file)
        }
        None if colored => {
            let colors = ColoredLevelConfig::new()
                .trace(Color::Magenta)
                .debug(Color::Blue)
                .info(Color::Green)
                .warn(Color::Yellow)
                .error(Color::Red);
            Dispatch::new()
                .format(move |out, message, record| {
                    write_line(out, colors.color(record.level()), message, record);
                })
                .chain(std::io::stdout())
        }
        None => Dispatch::new()
            .format(|out, message, record| {
                write_line(out, record.level(), message, record);
            })
            .chain(std::io::stdout()),
    };

    Dispatch::new()
        .level(*log_level)
        // reqwest pool chatter from the Kubernetes and gateway clients
        .level_for("hyper_util", LevelFilter::Warn)
        .level_for("reqwest", LevelFilter::Warn)
        .chain(output)
        .apply()
        .map_err(|e| ServerError::Logger {
            message: format!("Failed to initialize logger: {e}"),
        })?;

    let target = log_file
        .as_ref()
        .map_or_else(|| "stdout".to_string(), |p| p.display().to_string());
    info!("Logger initialized: level={}, output={target}", *log_level);

    // Only takes effect when no other logger claimed the log slot
    tracing_log::LogTracer::init().ok();

    Ok(())
}

fn write_line(
    out: fern::FormatCallback,
    level: impl Display,
    message: &std::fmt::Arguments,
    record: &log::Record,
) {
    out.finish(format_args!(
        "[{} - {}] {} [{}:{}]",
        humantime::format_rfc3339(SystemTime::now()),
        level,
        message,
        record.file().unwrap_or("unknown"),
        record.line().unwrap_or(0),
    ));
}
