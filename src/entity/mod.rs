//! Canonical entities, their exact aliases, and the registry that owns both.

pub mod alias;
pub mod error;
pub mod registry;
pub mod types;


pub use alias::AliasIndex;
pub use error::{EntityError, EntityResult};
pub use registry::EntityRegistry;
pub use types::{AliasSource, AlternativeName, CanonicalEntity, EntityId};
