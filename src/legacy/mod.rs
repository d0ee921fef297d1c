//! Adapter over the prior matching implementation.
//!
//! Legacy backends expose one of three entry points with differing payload
//! shapes. [`LegacyAdapter::resolve`] picks one at construction time; every
//! call afterwards goes through that entry point and is reconciled to
//! [`SuggestionDto`](crate::matching::SuggestionDto).

pub mod adapter;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod reconcile;

#[cfg(test)]
mod tests;

pub use adapter::{
    LegacyAdapter, LegacyEntryPoint, LegacyFind, LegacySuggestions, LegacySupplierCandidates,
    LegacySurfaces,
};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockLegacyBackend;
pub use reconcile::{reconcile_record, reconcile_records};
