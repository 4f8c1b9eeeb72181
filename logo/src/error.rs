use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogError {
    Io(#[from] std::io::Error),
    OpenSink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    Serialization(String),
    AlreadyInstalled,
}

impl Display for LogError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            LogError::Io(e) => write!(f, "I/O error: {}", e),
            LogError::OpenSink { path, source } => {
                write!(f, "Cannot open log sink {}: {}", path.display(), source)
            }
            LogError::Serialization(s) => write!(f, "Serialization error: {}", s),
            LogError::AlreadyInstalled => {
                write!(f, "A global `log` logger is already installed")
            }
        }
    }
}

impl From<serde_json::Error> for LogError {
    fn from(err: serde_json::Error) -> Self {
        LogError::Serialization(err.to_string())
    }
}

impl From<log::SetLoggerError> for LogError {
    fn from(_: log::SetLoggerError) -> Self {
        LogError::AlreadyInstalled
    }
}

pub type Result<T> = std::result::Result<T, LogError>;
