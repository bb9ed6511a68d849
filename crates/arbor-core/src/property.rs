#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::{BlackboardType, BlackboardValue, ExecutionContext};

/// A node field that is either a literal or a reference to a blackboard key.
///
/// Key references are resolved on every read, local scope first, then shared.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NodeProperty<T> {
    Value(T),
    Key(String),
}

impl<T> NodeProperty<T> {
    pub fn key(name: impl Into<String>) -> Self {
        NodeProperty::Key(name.into())
    }

    pub fn key_name(&self) -> Option<&str> {
        match self {
            NodeProperty::Key(name) => Some(name),
            NodeProperty::Value(_) => None,
        }
    }
}

impl<T: BlackboardType + Clone> NodeProperty<T> {
    pub fn resolve(&self, ctx: &ExecutionContext<'_>) -> Result<T> {
        match self {
            NodeProperty::Value(value) => Ok(value.clone()),
            NodeProperty::Key(name) => ctx.get(name),
        }
    }
}

impl<T: Default> Default for NodeProperty<T> {
    fn default() -> Self {
        NodeProperty::Value(T::default())
    }
}

impl<T> From<T> for NodeProperty<T> {
    fn from(value: T) -> Self {
        NodeProperty::Value(value)
    }
}

impl NodeProperty<BlackboardValue> {
    /// Narrow an untyped (asset-level) property to `T`. Key references pass
    /// through unchanged; literals must already hold a `T`.
    pub fn typed<T: BlackboardType>(&self) -> Option<NodeProperty<T>> {
        match self {
            NodeProperty::Value(value) => T::from_value(value).map(NodeProperty::Value),
            NodeProperty::Key(name) => Some(NodeProperty::Key(name.clone())),
        }
    }

    /// Resolve without a type: a key reference yields whatever its key holds.
    pub fn resolve_value(&self, ctx: &ExecutionContext<'_>) -> Result<BlackboardValue> {
        match self {
            NodeProperty::Value(value) => Ok(value.clone()),
            NodeProperty::Key(name) => ctx.value(name),
        }
    }
}
