//! Error types for the quickhot client runtime

use thiserror::Error;

/// Main error type for quickhot
#[derive(Error, Debug)]
pub enum Error {
    /// Inbound payload could not be decoded
    #[error("DecodeError: {0}")]
    Decode(String),

    /// The update channel failed
    #[error("TransportError: {0}")]
    Transport(String),

    /// A module could not be fetched
    #[error("FetchError: {path}: {reason}")]
    Fetch { path: String, reason: String },

    /// Server or base URL could not be parsed
    #[error("InvalidUrl: {0}")]
    InvalidUrl(String),

    /// Configuration is invalid
    #[error("ConfigError: {0}")]
    Config(String),

    /// IO error
    #[error("IOError: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a fetch error for a module path
    pub fn fetch(path: impl Into<String>, reason: impl ToString) -> Self {
        Error::Fetch {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::InvalidUrl(err.to_string())
    }
}

/// Result type for quickhot operations
pub type Result<T> = std::result::Result<T, Error>;
