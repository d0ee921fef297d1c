use thiserror::Error;

use crate::engine::EngineError;

#[derive(Debug, Error)]
pub enum RouterError {
    /// Legacy failed, either as the chosen engine or as the fallback. Passed
    /// through unchanged.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl RouterError {
    pub fn engine_error(&self) -> &EngineError {
        match self {
            RouterError::Engine(e) => e,
        }
    }
}

pub type RouterResult<T> = Result<T, RouterError>;
