use thiserror::Error;

use crate::{BlackboardScope, KeyType};

/// Blackboard access and authoring failures.
///
/// At runtime these are recoverable: a node that hits one reports `Failure`
/// instead of propagating it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlackboardError {
    #[error("blackboard key '{name}' not found")]
    KeyNotFound { name: String },

    #[error("blackboard key '{name}' holds {stored}, accessed as {requested}")]
    KeyTypeMismatch {
        name: String,
        stored: KeyType,
        requested: KeyType,
    },

    #[error("blackboard key '{name}' already exists in {scope} scope")]
    DuplicateKey { name: String, scope: BlackboardScope },

    #[error("blackboard key '{name}' would shadow a shared key of the same name")]
    ShadowsSharedKey { name: String },

    #[error("blackboard key names must not be empty")]
    InvalidKeyName,

    #[error("no shared blackboard is attached")]
    NoSharedBlackboard,
}

pub type Result<T> = std::result::Result<T, BlackboardError>;
