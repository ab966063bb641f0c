//! Logger setup: a terminal logger, optionally doubled by a log file.
use crate::pep::pep_error::{PepError, PepResult};
use chrono::Local;
use simplelog::*;
use std::fs::File;

/// Parses a loglevel; `off` and `none` turn logging off.
pub fn level_filter(loglevel: &str) -> PepResult<LevelFilter> {
    match loglevel.trim().to_lowercase().as_str() {
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        "off" | "none" => Ok(LevelFilter::Off),
        other => Err(PepError::Config(format!(
            "loglevel must be debug, info, warn, error, off or none, got {}",
            other
        ))),
    }
}

/// `log_<date and time>.txt`
pub fn default_log_file_name() -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("log_{}.txt", date_and_time)
}

/// Installs the global logger.
///
/// `log_file`: `None` logs to the terminal only, `Some("")` also writes to
/// [`default_log_file_name`], `Some(name)` also writes to `name`.
/// Returns `false` when logging is off or a logger was already installed.
pub fn init_logger(loglevel: &str, log_file: Option<&str>) -> PepResult<bool> {
    let log_option = level_filter(loglevel)?;
    if log_option == LevelFilter::Off {
        return Ok(false);
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(name) = log_file {
        let name = if name.is_empty() {
            default_log_file_name()
        } else {
            name.to_string()
        };
        loggers.push(WriteLogger::new(log_option, Config::default(), File::create(name)?));
    }
    // a second initialisation keeps the first logger
    Ok(CombinedLogger::init(loggers).is_ok())
}
