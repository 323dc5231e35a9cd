use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Handle;
use thiserror::Error;

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {h({l:<5})} {t} - {m}{n}";

/// Sets up the log4rs logger with a console appender, a file appender or both
///
/// # Arguments
///
/// * 'log_path' - path to the log file, no file logging if None
/// * 'log_level' - maximum level to log
/// * 'log_to_stdout' - whether to also log to stdout
pub fn setup_logger(log_path: &Option<String>, log_level: LevelFilter, log_to_stdout: bool) -> Result<Handle, LoggerError> {
    let mut builder = Config::builder();
    let mut root = Root::builder();

    if log_to_stdout {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    if let Some(path) = log_path {
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(PATTERN)))
            .build(path)
            .map_err(|e| LoggerError(format!("log file {}: {}", path, e)))?;
        builder = builder.appender(Appender::builder().build("file", Box::new(file)));
        root = root.appender("file");
    }

    let config = builder
        .build(root.build(log_level))
        .map_err(|e| LoggerError(e.to_string()))?;

    log4rs::init_config(config).map_err(|e| LoggerError(e.to_string()))
}

/// Error depicting errors that occur while setting up the logger
///
#[derive(Debug, Error)]
#[error("LoggerError: {0}")]
pub struct LoggerError(pub String);
