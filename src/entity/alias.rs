//! Exact-match alias lookup.

use std::collections::HashMap;

use super::error::{EntityError, EntityResult};
use super::types::{AlternativeName, EntityId};

/// Normalized name → alternative name. A hit is a 100% confidence match.
#[derive(Debug, Default, Clone)]
pub struct AliasIndex {
    entries: HashMap<String, AlternativeName>,
}

impl AliasIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `alias`. Re-adding an alias of the same entity is a no-op that
    /// returns the stored record; mapping it to another entity is refused.
    pub fn insert(&mut self, alias: AlternativeName) -> EntityResult<AlternativeName> {
        if let Some(existing) = self.entries.get(&alias.normalized_name) {
            if existing.entity_id != alias.entity_id {
                return Err(EntityError::AliasConflict {
                    alias: alias.normalized_name,
                    existing: existing.entity_id,
                    requested: alias.entity_id,
                });
            }
            return Ok(existing.clone());
        }

        self.entries
            .insert(alias.normalized_name.clone(), alias.clone());
        Ok(alias)
    }

    #[inline]
    pub fn find_by_normalized(&self, key: &str) -> Option<&AlternativeName> {
        self.entries.get(key)
    }

    /// Bumps the usage counter of an alias, returning the new count.
    pub fn record_use(&mut self, key: &str) -> Option<u64> {
        self.entries.get_mut(key).map(|alias| {
            alias.usage_count += 1;
            alias.usage_count
        })
    }

    /// All aliases of one entity.
    pub fn aliases_of(&self, entity_id: EntityId) -> Vec<&AlternativeName> {
        let mut aliases: Vec<_> = self
            .entries
            .values()
            .filter(|a| a.entity_id == entity_id)
            .collect();
        aliases.sort_by(|a, b| a.normalized_name.cmp(&b.normalized_name));
        aliases
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
