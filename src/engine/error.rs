use thiserror::Error;

/// Failures of a single engine call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The engine raised an error while matching.
    #[error("{engine} engine failed: {message}")]
    Failed { engine: String, message: String },

    /// The engine did not answer within its deadline.
    #[error("{engine} engine timed out after {timeout_ms}ms")]
    Timeout { engine: String, timeout_ms: u64 },

    /// The engine answered with a payload that could not be interpreted.
    #[error("{engine} engine returned a malformed response: {reason}")]
    Malformed { engine: String, reason: String },

    /// A legacy backend exposes none of the known entry points.
    #[error("legacy backend exposes no known entry point")]
    NoLegacyEntryPoint,
}

impl EngineError {
    pub fn failed(engine: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Failed {
            engine: engine.into(),
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, EngineError::Timeout { .. })
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
