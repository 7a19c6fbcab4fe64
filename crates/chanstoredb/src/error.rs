//! Error types for chanstoredb

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for chanstoredb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for store operations
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem unavailable or permission denied
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path the failing operation touched
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Corrupt, truncated or schema-mismatched record file.
    ///
    /// Reads absorb this error; it only reaches callers of the codec itself.
    #[error("Malformed record: {reason}")]
    MalformedRecord {
        /// What failed to decode
        reason: String,
    },

    /// Empty board code or non-positive thread number
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Invalid cache configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An in-memory record could not be serialized
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl Error {
    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a [`Error::MalformedRecord`]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedRecord {
            reason: reason.into(),
        }
    }

    /// True for the error class reads convert into a cache miss
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedRecord { .. })
    }
}

impl From<nom::Err<nom::error::Error<&[u8]>>> for Error {
    fn from(err: nom::Err<nom::error::Error<&[u8]>>) -> Self {
        Error::malformed(format!("bad header: {:?}", err.map(|e| e.code)))
    }
}
