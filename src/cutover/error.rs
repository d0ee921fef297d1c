use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CutoverError {
    /// Rejected before any state was touched.
    #[error("rollout percentage must be between 0 and 100, got {value}")]
    InvalidPercentage { value: i64 },

    #[error("cutover store error: {0}")]
    Store(#[from] StoreError),
}

pub type CutoverResult<T> = Result<T, CutoverError>;
