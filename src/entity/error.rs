use thiserror::Error;

use super::EntityId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntityError {
    #[error("entity name normalizes to an empty key")]
    EmptyName,

    #[error("unknown entity id {id}")]
    UnknownEntity { id: EntityId },

    #[error("entity id {id} is already registered as '{existing}'")]
    DuplicateId { id: EntityId, existing: String },

    #[error("alias '{alias}' already maps to entity {existing}, refusing to remap to {requested}")]
    AliasConflict {
        alias: String,
        existing: EntityId,
        requested: EntityId,
    },
}

pub type EntityResult<T> = Result<T, EntityError>;
