//! Trie building and loading errors.
use std::path::PathBuf;

/// Errors that can occur when building, saving or loading a trie.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TrieError {
    /// The builder was used without a search key function
    #[error("A search key function must be explicitly specified")]
    MissingKeyFunction,

    /// Error encoding or decoding the trie document
    #[error("Failed to (de)serialize trie")]
    Json(#[from] serde_json::Error),

    /// Error reading or writing a trie file
    #[error("I/O error on '{0}'")]
    Io(PathBuf, #[source] std::io::Error),
}

impl TrieError {
    /// Wrap into i/o error.
    pub fn into_io_error(self) -> std::io::Error {
        match self {
            TrieError::Io(_, e) => e,
            TrieError::Json(e) => e.into(),
            e => std::io::Error::new(std::io::ErrorKind::Other, format!("{}", e)),
        }
    }
}
