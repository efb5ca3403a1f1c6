use std::path::PathBuf;

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::{Error, Result};

/// Log destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogOutput {
    /// Log to the terminal.
    Stdout,
    /// Append to a file.
    File(PathBuf),
}

impl std::str::FromStr for LogOutput {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "" | "stdout" | "-" => Ok(Self::Stdout),
            path => Ok(Self::File(PathBuf::from(path))),
        }
    }
}

impl std::fmt::Display for LogOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Logger configuration.
#[derive(Clone, Debug)]
pub struct LogConfig {
    /// Maximum level to log.
    pub level: LevelFilter,
    /// Log destination.
    pub output: LogOutput,
    /// Log for a service manager, without timestamps and colors.
    pub daemon: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            output: LogOutput::Stdout,
            daemon: false,
        }
    }
}

impl LogConfig {
    /// Parse a log level name.
    ///
    /// Accepts `trace`, `debug`, `info`, `warn`, `error` and `off`, case insensitive.
    pub fn parse_level(level: &str) -> Result<LevelFilter> {
        match level.trim().to_lowercase().as_str() {
            "trace" => Ok(LevelFilter::Trace),
            "debug" => Ok(LevelFilter::Debug),
            "info" => Ok(LevelFilter::Info),
            "warn" | "warning" => Ok(LevelFilter::Warn),
            "error" => Ok(LevelFilter::Error),
            "off" => Ok(LevelFilter::Off),
            _ => Err(Error::InvalidLogLevel(level.to_string())),
        }
    }

    /// Raise the log level by the number of verbosity flags.
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        self.level = match verbose {
            0 => self.level,
            1 => self.level.max(LevelFilter::Debug),
            _ => LevelFilter::Trace,
        };
        self
    }
}

/// Logger for a service manager journal.
///
/// Every line is prefixed with the syslog priority of the record.
struct JournalLogger {
    level: LevelFilter,
}

fn priority(level: Level) -> &'static str {
    match level {
        Level::Error => "<3>",
        Level::Warn => "<4>",
        Level::Info => "<6>",
        Level::Debug => "<7>",
        Level::Trace => "<7>",
    }
}

impl Log for JournalLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        if record.level() == Level::Error {
            eprintln!("{}{}", priority(record.level()), record.args());
        } else {
            println!("{}{}", priority(record.level()), record.args());
        }
    }

    fn flush(&self) {
        use std::io::Write;

        std::io::stdout().flush().ok();
    }
}

/// Logger handle.
///
/// The logger is installed when the handle is created and flushed when the
/// handle is closed or dropped. Only one logger can be installed per process.
pub struct Logger {
    level: LevelFilter,
    output: LogOutput,
}

impl Logger {
    /// Install the logger.
    pub fn init(config: &LogConfig) -> Result<Self> {
        let mut log_config = simplelog::ConfigBuilder::new();
        if config.daemon {
            log_config.set_time_level(LevelFilter::Off);
            log_config.set_thread_level(LevelFilter::Off);
        } else {
            log_config.set_time_offset_to_local().ok();
            log_config.set_time_format_rfc2822();
        }

        log_config.set_target_level(LevelFilter::Off);
        log_config.set_location_level(LevelFilter::Off);
        log_config.add_filter_ignore_str("mio");
        log_config.add_filter_ignore_str("hyper");

        match &config.output {
            LogOutput::Stdout if config.daemon => {
                log::set_boxed_logger(Box::new(JournalLogger {
                    level: config.level,
                }))
                .map_err(|e| Error::Logger(e.to_string()))?;
                log::set_max_level(config.level);
            }
            LogOutput::Stdout => {
                simplelog::TermLogger::init(
                    config.level,
                    log_config.build(),
                    simplelog::TerminalMode::Mixed,
                    simplelog::ColorChoice::Auto,
                )
                .map_err(|e| Error::Logger(e.to_string()))?;
            }
            LogOutput::File(path) => {
                let file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| Error::Logger(format!("{}: {}", path.display(), e)))?;

                simplelog::WriteLogger::init(config.level, log_config.build(), file)
                    .map_err(|e| Error::Logger(e.to_string()))?;
            }
        }

        Ok(Self {
            level: config.level,
            output: config.output.clone(),
        })
    }

    /// Install the logger from the global configuration.
    pub fn from_config(config: &impl crate::Configurable) -> Result<Self> {
        Self::init(&config.global().log)
    }

    /// Maximum level being logged.
    #[inline]
    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Log destination.
    #[inline]
    pub fn output(&self) -> &LogOutput {
        &self.output
    }

    /// Flush buffered records.
    pub fn flush(&self) {
        log::logger().flush();
    }

    /// Flush and release the handle.
    pub fn close(self) {}
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.flush();
    }
}
