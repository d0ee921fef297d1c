use serde::{Deserialize, Serialize};

use crate::learning::scoring::{
    SOURCE_WEIGHT_ALIAS, SOURCE_WEIGHT_LEARNING, SOURCE_WEIGHT_MANUAL,
};

/// Identifier of a canonical entity (bank or supplier master record).
pub type EntityId = u64;

/// Master record that raw text is resolved to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEntity {
    /// Immutable identity.
    pub id: EntityId,
    /// Display name, original casing.
    pub official_name: String,
    /// [`normalize`](crate::normalize::normalize)d official name.
    pub normalized_key: String,
    /// Set once a human confirmed the record.
    pub confirmed: bool,
}

/// How an alternative name came to be known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasSource {
    /// Registered as an exact alias of the entity.
    Alias,
    /// Entered by an operator (including official names).
    Manual,
    /// Learned from a confirmed fuzzy match.
    Learning,
}

impl AliasSource {
    /// Weight this source contributes to learned scores.
    pub fn weight(&self) -> f64 {
        match self {
            AliasSource::Alias => SOURCE_WEIGHT_ALIAS,
            AliasSource::Manual => SOURCE_WEIGHT_MANUAL,
            AliasSource::Learning => SOURCE_WEIGHT_LEARNING,
        }
    }
}

/// An exact alternative spelling mapped to a canonical entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeName {
    pub entity_id: EntityId,
    pub alternative_name: String,
    pub normalized_name: String,
    pub source: AliasSource,
    pub usage_count: u64,
}
