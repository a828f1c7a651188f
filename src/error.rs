//! Error types for raquet-stats

use std::fmt;
use std::io;

/// Result type for raquet-stats operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while decoding and summarizing bands
#[derive(Debug)]
pub enum Error {
    /// I/O error
    Io(io::Error),

    /// Missing or malformed required input, or an out-of-range index
    InvalidInput(String),

    /// Pixel type name not in the registry
    UnknownPixelType(String),

    /// Corrupt or truncated compressed stream
    DecodeFailure(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Error::UnknownPixelType(name) => write!(f, "Unknown pixel type: {}", name),
            Error::DecodeFailure(msg) => write!(f, "Decode failure: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::Io(error)
    }
}
