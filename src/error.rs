//! Error kinds shared by every module in this crate.
//!
//! Mirrors the error-handling shape of hand-rolled IO crates: one flat enum,
//! a `Result` alias, and a few constructor helpers instead of a derive macro.

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;
pub type PassiveResult = Result<()>;

pub use std::io::Error as IoError;

#[derive(Debug)]
pub enum Error {
    /// Indexer or container construction parameters are mutually inconsistent.
    InvalidConfiguration(String),

    /// A coordinate or address fell outside the indexer's validated range.
    InvalidCoordinate(String),

    /// `bits_per_value` is not one of {1,2,4,8,16,32,64}, or does not divide 64.
    InvalidValue(String),

    /// On-disk `bits_per_value` does not match the value the container was built with.
    FormatMismatch(String),

    /// The byte stream could not be parsed as a map of the requested format.
    CorruptData(String),

    /// Filesystem or gzip stream failure.
    Io(IoError),

    /// A long-running batch operation observed a cancellation request.
    Cancelled,
}

impl Error {
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration(message.into())
    }

    pub fn invalid_coordinate(message: impl Into<String>) -> Self {
        Error::InvalidCoordinate(message.into())
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        Error::InvalidValue(message.into())
    }

    pub fn format_mismatch(message: impl Into<String>) -> Self {
        Error::FormatMismatch(message.into())
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        Error::CorruptData(message.into())
    }
}

/// Enable using the `?` operator on `io::Result`.
impl From<IoError> for Error {
    fn from(error: IoError) -> Self {
        Error::Io(error)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfiguration(msg) => write!(f, "invalid configuration: {}", msg),
            Error::InvalidCoordinate(msg) => write!(f, "invalid coordinate: {}", msg),
            Error::InvalidValue(msg) => write!(f, "invalid value: {}", msg),
            Error::FormatMismatch(msg) => write!(f, "format mismatch: {}", msg),
            Error::CorruptData(msg) => write!(f, "corrupt data: {}", msg),
            Error::Io(err) => write!(f, "io error: {}", err),
            Error::Cancelled => write!(f, "operation was cancelled"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}
