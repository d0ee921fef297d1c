//! The engine seam shared by the Authority and the Legacy adapter.

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{EngineError, EngineResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::{BlockingEngine, FailingEngine, SlowEngine, StaticEngine};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::matching::SuggestionDto;

/// Which engine served (or should serve) a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Authority,
    Legacy,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Authority => "authority",
            Source::Legacy => "legacy",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that turns raw input into ranked suggestions.
#[async_trait]
pub trait SuggestionEngine: Send + Sync {
    /// Stable name used in logs and error messages.
    fn name(&self) -> &str;

    async fn suggest(&self, raw_input: &str) -> EngineResult<Vec<SuggestionDto>>;
}
