use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::error::{CutoverError, CutoverResult};
use super::types::{CutoverConfig, CutoverStatus, RollbackEntry, StickyKey};
use crate::engine::Source;
use crate::hashing::routing_bucket;
use crate::normalize::normalize;
use crate::store::{DocumentStore, update};

/// Pure routing decision for `routing_key` under `config`.
pub fn decide(config: &CutoverConfig, routing_key: &str) -> Source {
    if !config.enabled || config.rollout_percentage == 0 {
        return Source::Legacy;
    }
    if config.rollout_percentage >= 100 {
        return Source::Authority;
    }

    if routing_bucket(routing_key) < config.rollout_percentage {
        Source::Authority
    } else {
        Source::Legacy
    }
}

/// Reads and mutates the cutover document. Every decision re-reads it, so a
/// disable or rollback takes effect on the very next request.
#[derive(Clone)]
pub struct CutoverManager {
    store: Arc<dyn DocumentStore<CutoverConfig>>,
    sticky_key: StickyKey,
}

impl std::fmt::Debug for CutoverManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CutoverManager")
            .field("sticky_key", &self.sticky_key)
            .finish_non_exhaustive()
    }
}

impl CutoverManager {
    /// Manager over `store`, bucketing on the raw input.
    pub fn new(store: Arc<dyn DocumentStore<CutoverConfig>>) -> Self {
        Self {
            store,
            sticky_key: StickyKey::default(),
        }
    }

    /// Chooses which form of the input feeds the routing hash.
    pub fn with_sticky_key(mut self, sticky_key: StickyKey) -> Self {
        self.sticky_key = sticky_key;
        self
    }

    /// Current document; safe defaults when it is missing or unreadable.
    pub fn config(&self) -> CutoverConfig {
        match self.store.load() {
            Ok(Some(current)) => current.data,
            Ok(None) => CutoverConfig::default(),
            Err(e) => {
                warn!(error = %e, "Cutover config unavailable, routing to legacy");
                CutoverConfig::default()
            }
        }
    }

    /// True when `raw_input` routes to the Authority under the current document.
    pub fn should_use_authority(&self, raw_input: &str) -> bool {
        self.route(raw_input) == Source::Authority
    }

    /// Routing decision for `raw_input`, logged at debug level.
    pub fn route(&self, raw_input: &str) -> Source {
        let config = self.config();
        let source = match self.sticky_key {
            StickyKey::Raw => decide(&config, raw_input),
            StickyKey::Normalized => decide(&config, &normalize(raw_input)),
        };
        debug!(
            %source,
            enabled = config.enabled,
            percentage = config.rollout_percentage,
            "Routing decision"
        );
        source
    }

    /// Sets the rollout percentage. Values outside 0..=100 are rejected without
    /// touching the document.
    pub fn set_rollout_percentage(&self, percentage: i64) -> CutoverResult<CutoverConfig> {
        let percentage = u8::try_from(percentage)
            .ok()
            .filter(|p| *p <= 100)
            .ok_or(CutoverError::InvalidPercentage { value: percentage })?;

        let (config, previous) = update(self.store.as_ref(), CutoverConfig::default, |c| {
            let previous = c.rollout_percentage;
            c.rollout_percentage = percentage;
            c.last_updated = Some(Utc::now());
            previous
        })?;

        info!(previous, percentage, "Rollout percentage updated");
        Ok(config)
    }

    /// Turns Authority routing on. The first enable stamps `started_at`.
    pub fn enable(&self) -> CutoverResult<CutoverConfig> {
        let (config, _) = update(self.store.as_ref(), CutoverConfig::default, |c| {
            let now = Utc::now();
            c.enabled = true;
            c.started_at.get_or_insert(now);
            c.last_updated = Some(now);
        })?;

        info!(percentage = config.rollout_percentage, "Cutover enabled");
        Ok(config)
    }

    /// Stops all Authority routing from the next decision on. The percentage
    /// is kept.
    pub fn disable(&self) -> CutoverResult<CutoverConfig> {
        let (config, _) = update(self.store.as_ref(), CutoverConfig::default, |c| {
            c.enabled = false;
            c.last_updated = Some(Utc::now());
        })?;

        info!(percentage = config.rollout_percentage, "Cutover disabled");
        Ok(config)
    }

    /// Disables the cutover, zeroes the percentage and records the percentage
    /// that was in force, all in one committed write.
    pub fn emergency_rollback(&self, reason: &str) -> CutoverResult<RollbackEntry> {
        let (_, entry) = update(self.store.as_ref(), CutoverConfig::default, |c| {
            let now = Utc::now();
            let entry = RollbackEntry {
                timestamp: now,
                reason: reason.to_string(),
                previous_percentage: c.rollout_percentage,
            };

            c.enabled = false;
            c.rollout_percentage = 0;
            c.started_at = None;
            c.last_updated = Some(now);
            c.rollback_history.push(entry.clone());
            entry
        })?;

        warn!(
            reason,
            previous_percentage = entry.previous_percentage,
            "Emergency rollback executed"
        );
        Ok(entry)
    }

    /// Operator view of the document.
    pub fn status(&self) -> CutoverStatus {
        self.config().status()
    }

    /// Rollbacks, oldest first.
    pub fn rollback_history(&self) -> Vec<RollbackEntry> {
        self.config().rollback_history
    }
}
