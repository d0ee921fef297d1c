//! In-memory canonical entity store.
//!
//! Holds the master records, their aliases, and a token index that bounds
//! the fuzzy candidate list for each request.

use std::collections::{BTreeSet, HashMap};

use parking_lot::RwLock;
use tracing::debug;

use super::alias::AliasIndex;
use super::error::{EntityError, EntityResult};
use super::types::{AliasSource, AlternativeName, CanonicalEntity, EntityId};
use crate::normalize::{normalize, tokens};

/// Tokens shorter than this are not prefix-indexed.
const PREFIX_LEN: usize = 3;

#[derive(Debug, Default)]
struct RegistryInner {
    entities: HashMap<EntityId, CanonicalEntity>,
    by_key: HashMap<String, EntityId>,
    token_index: HashMap<String, BTreeSet<EntityId>>,
    aliases: AliasIndex,
    next_id: EntityId,
}

impl RegistryInner {
    fn index_keys(normalized: &str) -> Vec<String> {
        let mut keys = Vec::new();
        for token in tokens(normalized) {
            keys.push(token.to_string());
            if token.chars().count() > PREFIX_LEN {
                let prefix: String = token.chars().take(PREFIX_LEN).collect();
                keys.push(format!("{prefix}*"));
            }
        }
        keys
    }

    fn index(&mut self, entity: &CanonicalEntity) {
        for key in Self::index_keys(&entity.normalized_key) {
            self.token_index.entry(key).or_default().insert(entity.id);
        }
        self.by_key.insert(entity.normalized_key.clone(), entity.id);
    }

    fn unindex(&mut self, entity: &CanonicalEntity) {
        for key in Self::index_keys(&entity.normalized_key) {
            if let Some(ids) = self.token_index.get_mut(&key) {
                ids.remove(&entity.id);
                if ids.is_empty() {
                    self.token_index.remove(&key);
                }
            }
        }
        if self.by_key.get(&entity.normalized_key) == Some(&entity.id) {
            self.by_key.remove(&entity.normalized_key);
        }
    }

    fn insert_entity(&mut self, entity: CanonicalEntity) -> EntityResult<CanonicalEntity> {
        self.aliases.insert(AlternativeName {
            entity_id: entity.id,
            alternative_name: entity.official_name.clone(),
            normalized_name: entity.normalized_key.clone(),
            source: AliasSource::Manual,
            usage_count: 0,
        })?;
        self.index(&entity);
        self.next_id = self.next_id.max(entity.id);
        self.entities.insert(entity.id, entity.clone());
        Ok(entity)
    }
}

/// Canonical entities plus their exact aliases.
///
/// Every official name is also registered as a `Manual` alias, so an input
/// equal to an official name resolves through the alias path.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    inner: RwLock<RegistryInner>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new entity, or returns the one already holding the same
    /// normalized name (upgrading it to confirmed if `confirmed` is set).
    pub fn register(&self, name: &str, confirmed: bool) -> EntityResult<CanonicalEntity> {
        let normalized_key = normalize(name);
        if normalized_key.is_empty() {
            return Err(EntityError::EmptyName);
        }

        let mut inner = self.inner.write();
        if let Some(id) = inner.by_key.get(&normalized_key).copied() {
            if let Some(existing) = inner.entities.get_mut(&id) {
                existing.confirmed |= confirmed;
                return Ok(existing.clone());
            }
        }

        let id = inner.next_id + 1;
        debug!(entity_id = id, name, "Registering canonical entity");
        inner.insert_entity(CanonicalEntity {
            id,
            official_name: name.trim().to_string(),
            normalized_key,
            confirmed,
        })
    }

    /// Registers an entity under an id assigned by the master data source.
    pub fn register_with_id(
        &self,
        id: EntityId,
        name: &str,
        confirmed: bool,
    ) -> EntityResult<CanonicalEntity> {
        let normalized_key = normalize(name);
        if normalized_key.is_empty() {
            return Err(EntityError::EmptyName);
        }

        let mut inner = self.inner.write();
        if let Some(existing) = inner.entities.get(&id) {
            return Err(EntityError::DuplicateId {
                id,
                existing: existing.official_name.clone(),
            });
        }

        inner.insert_entity(CanonicalEntity {
            id,
            official_name: name.trim().to_string(),
            normalized_key,
            confirmed,
        })
    }

    pub fn get(&self, id: EntityId) -> Option<CanonicalEntity> {
        self.inner.read().entities.get(&id).cloned()
    }

    /// Changes the descriptive name of an entity. The previous name stays
    /// resolvable as an alias.
    pub fn rename(&self, id: EntityId, new_name: &str) -> EntityResult<CanonicalEntity> {
        let normalized_key = normalize(new_name);
        if normalized_key.is_empty() {
            return Err(EntityError::EmptyName);
        }

        let mut inner = self.inner.write();
        let current = inner
            .entities
            .get(&id)
            .cloned()
            .ok_or(EntityError::UnknownEntity { id })?;

        inner.aliases.insert(AlternativeName {
            entity_id: id,
            alternative_name: new_name.trim().to_string(),
            normalized_name: normalized_key.clone(),
            source: AliasSource::Manual,
            usage_count: 0,
        })?;

        inner.unindex(&current);
        let renamed = CanonicalEntity {
            official_name: new_name.trim().to_string(),
            normalized_key,
            ..current
        };
        inner.index(&renamed);
        inner.entities.insert(id, renamed.clone());
        Ok(renamed)
    }

    /// Entities sharing at least one token (or token prefix) with `normalized`,
    /// most overlapping first, at most `max` of them.
    pub fn candidates(&self, normalized: &str, max: usize) -> Vec<CanonicalEntity> {
        let inner = self.inner.read();

        let mut overlap: HashMap<EntityId, usize> = HashMap::new();
        for key in RegistryInner::index_keys(normalized) {
            if let Some(ids) = inner.token_index.get(&key) {
                for id in ids {
                    *overlap.entry(*id).or_default() += 1;
                }
            }
        }

        let mut ranked: Vec<(EntityId, usize)> = overlap.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(max);

        ranked
            .into_iter()
            .filter_map(|(id, _)| inner.entities.get(&id).cloned())
            .collect()
    }

    /// Maps `raw_alias` to an existing entity.
    pub fn learn_alias(
        &self,
        entity_id: EntityId,
        raw_alias: &str,
        source: AliasSource,
    ) -> EntityResult<AlternativeName> {
        let normalized_name = normalize(raw_alias);
        if normalized_name.is_empty() {
            return Err(EntityError::EmptyName);
        }

        let mut inner = self.inner.write();
        if !inner.entities.contains_key(&entity_id) {
            return Err(EntityError::UnknownEntity { id: entity_id });
        }

        inner.aliases.insert(AlternativeName {
            entity_id,
            alternative_name: raw_alias.trim().to_string(),
            normalized_name,
            source,
            usage_count: 0,
        })
    }

    pub fn find_alias(&self, normalized: &str) -> Option<AlternativeName> {
        self.inner.read().aliases.find_by_normalized(normalized).cloned()
    }

    pub fn record_alias_use(&self, normalized: &str) -> Option<u64> {
        self.inner.write().aliases.record_use(normalized)
    }

    pub fn aliases_of(&self, entity_id: EntityId) -> Vec<AlternativeName> {
        self.inner
            .read()
            .aliases
            .aliases_of(entity_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entities.is_empty()
    }
}
