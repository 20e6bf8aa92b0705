//! Error taxonomy.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum XprologError {
    #[error("KB directory not found: {0}")]
    KbDirNotFound(PathBuf),

    #[error("'{0}' is not a proved fact")]
    UnknownQuery(String),

    #[error("index {index} is out of range for a string of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, XprologError>;
