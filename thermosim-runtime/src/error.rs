use std::{error, fmt, path::PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum ConfigErrorKind {
    /// The configuration source could not be read.
    ///
    /// The type of I/O error is determined by the inner `io::Error`.
    Io(std::io::Error),

    /// The configuration source was read but is not a valid payload.
    Parse(String),
}

#[derive(Debug)]
pub enum Error {
    /// Configuration could not be loaded.
    ConfigLoad {
        /// Configuration source.
        path: PathBuf,
        /// Error kind.
        kind: ConfigErrorKind,
    },

    /// Configuration was loaded but does not name any sensor.
    EmptySensorList,

    /// One or multiple run parameters are out of range.
    InvalidConfig(String),

    /// Unknown log level.
    InvalidLogLevel(String),

    /// The logger could not be installed or its output could not be opened.
    Logger(String),

    /// Readings could not be written to the output.
    OutputWrite {
        /// Output destination.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn config_io(path: &std::path::Path, error: std::io::Error) -> Self {
        Self::ConfigLoad {
            path: path.to_path_buf(),
            kind: ConfigErrorKind::Io(error),
        }
    }

    pub(crate) fn config_parse(path: &std::path::Path, error: impl fmt::Display) -> Self {
        Self::ConfigLoad {
            path: path.to_path_buf(),
            kind: ConfigErrorKind::Parse(error.to_string()),
        }
    }

    pub(crate) fn output(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::OutputWrite {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigLoad { path, kind } => match kind {
                ConfigErrorKind::Io(e) => {
                    write!(f, "unable to open configuration {}: {}", path.display(), e)
                }
                ConfigErrorKind::Parse(e) => {
                    write!(f, "error decoding configuration {}: {}", path.display(), e)
                }
            },
            Error::EmptySensorList => write!(f, "no sensors found in configuration"),
            Error::InvalidConfig(reason) => write!(f, "invalid configuration: {}", reason),
            Error::InvalidLogLevel(level) => write!(f, "unknown log level: {}", level),
            Error::Logger(reason) => write!(f, "logger setup failed: {}", reason),
            Error::OutputWrite { path, source } => {
                write!(f, "error writing {}: {}", path.display(), source)
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::ConfigLoad {
                kind: ConfigErrorKind::Io(e),
                ..
            } => Some(e),
            Error::OutputWrite { source, .. } => Some(source),
            _ => None,
        }
    }
}
