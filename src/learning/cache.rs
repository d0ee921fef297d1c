//! Persisted learning cache keyed by (normalized input, entity).
//!
//! Entries are never removed. Blocks and [`LearningCache::decay`] lower an
//! entry's score instead; an entry whose effective score reaches zero simply
//! stops being surfaced.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::error::{LearningError, LearningResult};
use super::scoring::{SOURCE_WEIGHT_LEARNING, score_entry};
use crate::entity::EntityId;

/// One learned pairing of a normalized input with a canonical entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningCacheEntry {
    pub normalized_input: String,
    pub entity_id: EntityId,
    /// Raw similarity, 0.0-1.0.
    pub fuzzy_score: f64,
    /// Trust level of the pairing's origin, 0-100.
    pub source_weight: f64,
    pub usage_count: u64,
    pub block_count: u64,
    pub total_score: f64,
    pub effective_score: f64,
    pub star_rating: u8,
    pub last_used_at: DateTime<Utc>,
}

impl LearningCacheEntry {
    fn new(normalized_input: &str, entity_id: EntityId, update: LearningUpdate) -> Self {
        let mut entry = Self {
            normalized_input: normalized_input.to_string(),
            entity_id,
            fuzzy_score: 0.0,
            source_weight: 0.0,
            usage_count: 0,
            block_count: 0,
            total_score: 0.0,
            effective_score: 0.0,
            star_rating: 0,
            last_used_at: Utc::now(),
        };
        entry.apply(update);
        entry
    }

    fn apply(&mut self, update: LearningUpdate) {
        self.fuzzy_score = update.fuzzy_score;
        self.source_weight = update.source_weight;
        self.usage_count = update.usage_count;
        self.block_count = update.block_count;
        self.last_used_at = Utc::now();
        self.rescore();
    }

    fn rescore(&mut self) {
        let score = score_entry(
            self.fuzzy_score,
            self.source_weight,
            self.usage_count,
            self.block_count,
        );
        self.total_score = score.total_score;
        self.effective_score = score.effective_score;
        self.star_rating = score.star_rating;
    }

    /// Returns `true` if any rejection was recorded for this pairing.
    pub fn is_blocked(&self) -> bool {
        self.block_count > 0
    }

    /// Current signal values, for read-modify-upsert callers.
    pub fn as_update(&self) -> LearningUpdate {
        LearningUpdate {
            fuzzy_score: self.fuzzy_score,
            source_weight: self.source_weight,
            usage_count: self.usage_count,
            block_count: self.block_count,
        }
    }
}

/// Fields overwritten by [`LearningCache::upsert`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearningUpdate {
    pub fuzzy_score: f64,
    pub source_weight: f64,
    pub usage_count: u64,
    pub block_count: u64,
}

impl Default for LearningUpdate {
    fn default() -> Self {
        Self {
            fuzzy_score: 0.0,
            source_weight: SOURCE_WEIGHT_LEARNING,
            usage_count: 0,
            block_count: 0,
        }
    }
}

type EntriesByInput = HashMap<String, HashMap<EntityId, LearningCacheEntry>>;

/// In-memory learning cache with JSON snapshot persistence.
#[derive(Debug, Default)]
pub struct LearningCache {
    entries: RwLock<EntriesByInput>,
}

impl LearningCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unblocked entries for `normalized_input` with a positive effective
    /// score, best first, at most `limit` of them.
    pub fn get_suggestions(&self, normalized_input: &str, limit: usize) -> Vec<LearningCacheEntry> {
        let entries = self.entries.read();
        let Some(by_entity) = entries.get(normalized_input) else {
            return Vec::new();
        };

        let mut ranked: Vec<LearningCacheEntry> = by_entity
            .values()
            .filter(|e| e.effective_score > 0.0 && !e.is_blocked())
            .cloned()
            .collect();

        ranked.sort_by(|a, b| {
            b.effective_score
                .partial_cmp(&a.effective_score)
                .unwrap_or(Ordering::Equal)
                .then(b.usage_count.cmp(&a.usage_count))
                .then(a.entity_id.cmp(&b.entity_id))
        });
        ranked.truncate(limit);
        ranked
    }

    pub fn get(&self, normalized_input: &str, entity_id: EntityId) -> Option<LearningCacheEntry> {
        self.entries
            .read()
            .get(normalized_input)
            .and_then(|by_entity| by_entity.get(&entity_id))
            .cloned()
    }

    /// Creates or overwrites the (input, entity) entry and refreshes `last_used_at`.
    pub fn upsert(
        &self,
        normalized_input: &str,
        entity_id: EntityId,
        update: LearningUpdate,
    ) -> LearningCacheEntry {
        let mut entries = self.entries.write();
        let by_entity = entries.entry(normalized_input.to_string()).or_default();

        let entry = by_entity
            .entry(entity_id)
            .and_modify(|e| e.apply(update))
            .or_insert_with(|| LearningCacheEntry::new(normalized_input, entity_id, update));
        entry.clone()
    }

    /// Records a confirmed selection; raises the pairing's future rank.
    pub fn increment_usage(&self, normalized_input: &str, entity_id: EntityId) -> LearningCacheEntry {
        self.reinforce(normalized_input, entity_id, |e| e.usage_count += 1)
    }

    /// Records a rejection; the entity is excluded for this input from now on.
    pub fn increment_block(&self, normalized_input: &str, entity_id: EntityId) -> LearningCacheEntry {
        self.reinforce(normalized_input, entity_id, |e| e.block_count += 1)
    }

    fn reinforce<F>(&self, normalized_input: &str, entity_id: EntityId, bump: F) -> LearningCacheEntry
    where
        F: FnOnce(&mut LearningCacheEntry),
    {
        let mut entries = self.entries.write();
        let entry = entries
            .entry(normalized_input.to_string())
            .or_default()
            .entry(entity_id)
            .or_insert_with(|| {
                LearningCacheEntry::new(normalized_input, entity_id, LearningUpdate::default())
            });

        bump(entry);
        entry.last_used_at = Utc::now();
        entry.rescore();
        entry.clone()
    }

    /// Entities that must never be suggested for `normalized_input`.
    pub fn get_blocked_entity_ids(&self, normalized_input: &str) -> HashSet<EntityId> {
        self.entries
            .read()
            .get(normalized_input)
            .map(|by_entity| {
                by_entity
                    .values()
                    .filter(|e| e.is_blocked())
                    .map(|e| e.entity_id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Halves the usage count of entries idle for longer than `older_than`.
    /// Returns how many entries changed.
    pub fn decay(&self, older_than: Duration) -> usize {
        let cutoff = Utc::now() - older_than;
        let mut decayed = 0;

        let mut entries = self.entries.write();
        for entry in entries.values_mut().flat_map(|by_entity| by_entity.values_mut()) {
            if entry.last_used_at < cutoff && entry.usage_count > 0 {
                entry.usage_count /= 2;
                entry.rescore();
                decayed += 1;
            }
        }

        debug!(decayed, "Decayed stale learning entries");
        decayed
    }

    /// Total number of (input, entity) entries.
    pub fn len(&self) -> usize {
        self.entries.read().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Loads a snapshot written by [`persist`](Self::persist). A missing file
    /// yields an empty cache.
    pub fn load(path: &Path) -> LearningResult<Self> {
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(e.into()),
        };

        let rows: Vec<LearningCacheEntry> =
            serde_json::from_slice(&raw).map_err(|e| LearningError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut entries = EntriesByInput::new();
        for mut row in rows {
            row.rescore();
            entries
                .entry(row.normalized_input.clone())
                .or_default()
                .insert(row.entity_id, row);
        }

        let cache = Self {
            entries: RwLock::new(entries),
        };
        info!(entries = cache.len(), path = %path.display(), "Loaded learning cache");
        Ok(cache)
    }

    /// Atomically writes every entry to `path` as JSON.
    pub fn persist(&self, path: &Path) -> LearningResult<()> {
        let mut rows: Vec<LearningCacheEntry> = self
            .entries
            .read()
            .values()
            .flat_map(|by_entity| by_entity.values().cloned())
            .collect();
        rows.sort_by(|a, b| {
            a.normalized_input
                .cmp(&b.normalized_input)
                .then(a.entity_id.cmp(&b.entity_id))
        });

        let bytes =
            serde_json::to_vec_pretty(&rows).map_err(|e| LearningError::Serialization(e.to_string()))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => Path::new(".").to_path_buf(),
        };
        fs::create_dir_all(&dir)?;

        let mut temp = NamedTempFile::new_in(&dir)?;
        temp.write_all(&bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| LearningError::Io(e.error))?;

        debug!(entries = rows.len(), path = %path.display(), "Persisted learning cache");
        Ok(())
    }
}
