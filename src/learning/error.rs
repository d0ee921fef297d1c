use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LearningError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupt learning snapshot at {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

pub type LearningResult<T> = Result<T, LearningError>;
