//! The Authority matching engine.
//!
//! Resolution order for one request:
//! 1. exact alias hit → single 100% suggestion, nothing else considered
//! 2. learned cache entries for the normalized input
//! 3. fuzzy similarity against a bounded candidate list
//!
//! Entities blocked for the input are removed before ranking, including from
//! the alias path.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::error::{MatchingError, MatchingResult};
use super::similarity::{matched_anchor, similarity};
use super::types::{AnchorType, SuggestionDto, SuggestionSource};
use crate::config::Config;
use crate::constants::{
    DEFAULT_CACHE_FETCH_LIMIT, DEFAULT_MAX_CANDIDATES, DEFAULT_SUGGESTION_LIMIT,
    MIN_FUZZY_SIMILARITY,
};
use crate::engine::{EngineResult, SuggestionEngine};
use crate::entity::{AliasSource, EntityError, EntityId, EntityRegistry};
use crate::learning::scoring::{SOURCE_WEIGHT_FUZZY, score_entry};
use crate::learning::{LearningCache, LearningCacheEntry, LearningUpdate};
use crate::normalize::normalize;

pub struct MatchingAuthority {
    registry: Arc<EntityRegistry>,
    cache: Arc<LearningCache>,
    suggestion_limit: usize,
    max_candidates: usize,
    cache_fetch_limit: usize,
}

impl std::fmt::Debug for MatchingAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchingAuthority")
            .field("entities", &self.registry.len())
            .field("cache_entries", &self.cache.len())
            .field("suggestion_limit", &self.suggestion_limit)
            .field("max_candidates", &self.max_candidates)
            .finish()
    }
}

impl MatchingAuthority {
    pub fn new(registry: Arc<EntityRegistry>, cache: Arc<LearningCache>) -> Self {
        Self {
            registry,
            cache,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            cache_fetch_limit: DEFAULT_CACHE_FETCH_LIMIT,
        }
    }

    pub fn from_config(
        registry: Arc<EntityRegistry>,
        cache: Arc<LearningCache>,
        config: &Config,
    ) -> Self {
        Self::new(registry, cache).with_limits(config.suggestion_limit, config.max_candidates)
    }

    pub fn with_limits(mut self, suggestion_limit: usize, max_candidates: usize) -> Self {
        self.suggestion_limit = suggestion_limit.max(1);
        self.max_candidates = max_candidates.max(1);
        self
    }

    pub fn registry(&self) -> &Arc<EntityRegistry> {
        &self.registry
    }

    pub fn cache(&self) -> &Arc<LearningCache> {
        &self.cache
    }

    /// Ranked, explained suggestions for `raw_input`. An empty list is a
    /// valid answer.
    pub fn get_suggestions(&self, raw_input: &str) -> Vec<SuggestionDto> {
        let normalized = normalize(raw_input);
        if normalized.is_empty() {
            return Vec::new();
        }

        let blocked = self.cache.get_blocked_entity_ids(&normalized);

        if let Some(alias) = self.registry.find_alias(&normalized) {
            if blocked.contains(&alias.entity_id) {
                debug!(entity_id = alias.entity_id, "Alias hit is blocked for this input");
            } else if let Some(entity) = self.registry.get(alias.entity_id) {
                debug!(entity_id = entity.id, "Exact alias hit");
                return vec![SuggestionDto {
                    entity_id: entity.id,
                    name: entity.official_name,
                    score: 100.0,
                    source: SuggestionSource::Alias,
                    reason: "Exact alias match".to_string(),
                    matched_anchor: alias.alternative_name,
                    anchor_type: AnchorType::Alias,
                }];
            }
        }

        let mut merged: HashMap<EntityId, SuggestionDto> = HashMap::new();

        for entry in self.cache.get_suggestions(&normalized, self.cache_fetch_limit) {
            if blocked.contains(&entry.entity_id) {
                continue;
            }
            let Some(entity) = self.registry.get(entry.entity_id) else {
                continue;
            };

            merged.insert(
                entity.id,
                SuggestionDto {
                    entity_id: entity.id,
                    name: entity.official_name,
                    score: entry.effective_score,
                    source: SuggestionSource::Cache,
                    reason: history_reason(&entry),
                    matched_anchor: normalized.clone(),
                    anchor_type: AnchorType::History,
                },
            );
        }

        for entity in self.registry.candidates(&normalized, self.max_candidates) {
            if blocked.contains(&entity.id) {
                continue;
            }

            let sim = similarity(&normalized, &entity.normalized_key);
            if sim < MIN_FUZZY_SIMILARITY {
                continue;
            }

            let score = score_entry(sim, SOURCE_WEIGHT_FUZZY, 0, 0).effective_score;
            if merged.get(&entity.id).is_some_and(|s| s.score >= score) {
                continue;
            }

            merged.insert(
                entity.id,
                SuggestionDto {
                    entity_id: entity.id,
                    reason: format!("Name similarity {:.0}%", sim * 100.0),
                    matched_anchor: matched_anchor(&normalized, &entity.normalized_key),
                    name: entity.official_name,
                    score,
                    source: SuggestionSource::Fuzzy,
                    anchor_type: AnchorType::Fuzzy,
                },
            );
        }

        let mut ranked: Vec<SuggestionDto> = merged.into_values().collect();
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.entity_id.cmp(&b.entity_id))
        });
        ranked.truncate(self.suggestion_limit);

        debug!(
            results = ranked.len(),
            top_score = ranked.first().map(|s| s.score),
            "Authority ranking complete"
        );
        ranked
    }

    /// Feeds a confirmed selection back: reinforces the pairing and learns the
    /// input as an alias when it is not one already.
    pub fn confirm_selection(
        &self,
        raw_input: &str,
        entity_id: EntityId,
    ) -> MatchingResult<LearningCacheEntry> {
        let normalized = normalize(raw_input);
        if normalized.is_empty() {
            return Err(MatchingError::EmptyInput);
        }
        let entity = self
            .registry
            .get(entity_id)
            .ok_or(MatchingError::UnknownEntity { id: entity_id })?;

        let source = match self.registry.find_alias(&normalized) {
            Some(alias) if alias.entity_id == entity_id => {
                self.registry.record_alias_use(&normalized);
                alias.source
            }
            Some(alias) => {
                warn!(
                    alias_entity = alias.entity_id,
                    confirmed_entity = entity_id,
                    "Confirmed entity differs from alias owner; alias left unchanged"
                );
                AliasSource::Learning
            }
            None => match self
                .registry
                .learn_alias(entity_id, raw_input, AliasSource::Learning)
            {
                Ok(_) => AliasSource::Learning,
                Err(EntityError::AliasConflict { .. }) => AliasSource::Learning,
                Err(e) => return Err(e.into()),
            },
        };

        let fuzzy_score = similarity(&normalized, &entity.normalized_key);
        let current = self
            .cache
            .get(&normalized, entity_id)
            .map(|e| e.as_update())
            .unwrap_or_default();

        self.cache.upsert(
            &normalized,
            entity_id,
            LearningUpdate {
                fuzzy_score: fuzzy_score.max(current.fuzzy_score),
                source_weight: source.weight().max(current.source_weight),
                ..current
            },
        );
        Ok(self.cache.increment_usage(&normalized, entity_id))
    }

    /// Records that `entity_id` was rejected for `raw_input`; it will not be
    /// suggested for that input again.
    pub fn reject_suggestion(
        &self,
        raw_input: &str,
        entity_id: EntityId,
    ) -> MatchingResult<LearningCacheEntry> {
        let normalized = normalize(raw_input);
        if normalized.is_empty() {
            return Err(MatchingError::EmptyInput);
        }
        if self.registry.get(entity_id).is_none() {
            return Err(MatchingError::UnknownEntity { id: entity_id });
        }

        Ok(self.cache.increment_block(&normalized, entity_id))
    }
}

fn history_reason(entry: &LearningCacheEntry) -> String {
    match entry.usage_count {
        0 => "Learned from earlier matches".to_string(),
        1 => "Confirmed once before for this input".to_string(),
        n => format!("Confirmed {n} times before for this input"),
    }
}

#[async_trait]
impl SuggestionEngine for MatchingAuthority {
    fn name(&self) -> &str {
        "authority"
    }

    async fn suggest(&self, raw_input: &str) -> EngineResult<Vec<SuggestionDto>> {
        Ok(self.get_suggestions(raw_input))
    }
}
