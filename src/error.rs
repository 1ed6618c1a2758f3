// File: src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between reading an embedding file and
/// handing back a ranked clue list.
#[derive(Debug, Error)]
pub enum ClueError {
    /// Malformed, truncated or unreadable embedding file. Fatal at startup.
    #[error("failed to load {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The word is not part of the loaded vocabulary.
    #[error("unknown word: {0}")]
    UnknownWord(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("encoding error: {0}")]
    Encode(String),
}

impl ClueError {
    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ClueError::Load {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClueError>;
