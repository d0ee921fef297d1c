//! Matchgate library crate (used by the admin binary and integration tests).
//!
//! # Public API Surface
//!
//! ## Matching
//! - [`normalize()`] - Input normalization shared by every lookup
//! - [`EntityRegistry`], [`AliasIndex`] - Canonical entities and exact aliases
//! - [`LearningCache`], [`score_entry`] - Learned feedback signal
//! - [`MatchingAuthority`], [`SuggestionDto`], [`ConfidenceLevel`] - The Authority engine
//!
//! ## Production cutover
//! - [`SuggestionEngine`] - Seam shared by the Authority and the legacy adapter
//! - [`LegacyAdapter`], [`LegacySurfaces`] - Prior matcher, bound to one entry point
//! - [`CutoverManager`] - Sticky percentage rollout with instant rollback
//! - [`ProductionMetrics`], [`RolloutCriteria`] - Online comparison and promotion gate
//! - [`ProductionRouter`] - Per-request routing with Authority-to-Legacy fallback
//!
//! ## Storage
//! - [`DocumentStore`], [`JsonFileStore`], [`MemoryDocumentStore`] - Versioned
//!   documents updated with compare-and-swap
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod cutover;
pub mod engine;
pub mod entity;
pub mod hashing;
pub mod learning;
pub mod legacy;
pub mod matching;
pub mod metrics;
pub mod normalize;
pub mod router;
pub mod store;

pub use config::{Config, ConfigError};
pub use cutover::{
    CutoverConfig, CutoverError, CutoverManager, CutoverResult, CutoverStatus, RollbackEntry,
    StickyKey,
};
#[cfg(any(test, feature = "mock"))]
pub use engine::{BlockingEngine, FailingEngine, SlowEngine, StaticEngine};
pub use engine::{EngineError, EngineResult, Source, SuggestionEngine};
pub use entity::{
    AliasIndex, AliasSource, AlternativeName, CanonicalEntity, EntityError, EntityId,
    EntityRegistry,
};
pub use hashing::{hash_to_u64, routing_bucket};
pub use learning::{LearningCache, LearningCacheEntry, LearningError, LearningUpdate, score_entry};
#[cfg(any(test, feature = "mock"))]
pub use legacy::MockLegacyBackend;
pub use legacy::{
    LegacyAdapter, LegacyEntryPoint, LegacyFind, LegacySuggestions, LegacySupplierCandidates,
    LegacySurfaces,
};
pub use matching::{
    AnchorType, ConfidenceLevel, MatchingAuthority, MatchingError, SuggestionDto,
    SuggestionSource,
};
pub use metrics::{
    CriteriaThresholds, MetricsSnapshot, MetricsStats, ProductionMetrics, RolloutCriteria,
};
pub use normalize::normalize;
pub use router::{ProductionRouter, RouterError, RouterResult};
pub use store::{DocumentStore, JsonFileStore, MemoryDocumentStore, StoreError, Versioned};
