//! Persisted rollout policy: decides, per request, whether the Authority or
//! the Legacy engine serves it.
//!
//! Routing is sticky: the same input under the same percentage always lands
//! on the same engine, and raising the percentage only ever moves inputs from
//! Legacy to Authority.

pub mod error;
pub mod manager;
pub mod types;


pub use error::{CutoverError, CutoverResult};
pub use manager::{CutoverManager, decide};
pub use types::{CutoverConfig, CutoverStatus, RollbackEntry, StickyKey};
