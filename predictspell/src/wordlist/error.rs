//! Word list loading errors.
use std::path::PathBuf;

/// Errors that can occur while reading a word list source.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WordListError {
    /// Error opening or reading the word list file
    #[error("I/O error reading '{0}'")]
    Io(PathBuf, #[source] std::io::Error),

    /// Source starts with a byte-order mark for an encoding we do not read
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(&'static str),

    /// Source is not valid UTF-8
    #[error("Invalid UTF-8 in word list")]
    InvalidUtf8(#[source] std::str::Utf8Error),

    /// Source has an odd byte count or an unpaired surrogate
    #[error("Invalid UTF-16 in word list")]
    InvalidUtf16,
}

impl WordListError {
    /// Wrap into i/o error.
    pub fn into_io_error(self) -> std::io::Error {
        match self {
            WordListError::Io(_, e) => e,
            e => std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{}", e)),
        }
    }
}
