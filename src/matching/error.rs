use thiserror::Error;

use crate::entity::{EntityError, EntityId};

#[derive(Debug, Error)]
pub enum MatchingError {
    #[error("input normalizes to an empty key")]
    EmptyInput,

    #[error("unknown entity id {id}")]
    UnknownEntity { id: EntityId },

    #[error("entity store error: {0}")]
    Entity(#[from] EntityError),
}

pub type MatchingResult<T> = Result<T, MatchingError>;
