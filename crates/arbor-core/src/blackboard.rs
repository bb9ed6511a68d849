use core::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{BlackboardError, Result};
use crate::{BlackboardType, BlackboardValue, KeyType};

/// Which blackboard a key lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BlackboardScope {
    /// The tree instance's own blackboard.
    Local,
    /// The blackboard aliased across every instance that references it.
    Shared,
}

impl fmt::Display for BlackboardScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlackboardScope::Local => f.write_str("local"),
            BlackboardScope::Shared => f.write_str("shared"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlackboardKey {
    pub name: String,
    pub value: BlackboardValue,
}

impl BlackboardKey {
    pub fn new(name: impl Into<String>, value: BlackboardValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn key_type(&self) -> KeyType {
        self.value.key_type()
    }
}

/// Ordered, name-addressed key/value store.
///
/// Keys are authored up front; runtime writes only replace values of existing
/// keys and never change a key's type.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Blackboard {
    keys: Vec<BlackboardKey>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[BlackboardKey] {
        &self.keys
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.keys.iter().map(|k| k.name.as_str())
    }

    pub fn find(&self, name: &str) -> Option<&BlackboardKey> {
        self.keys.iter().find(|k| k.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Add a key holding `key_type`'s zero value.
    pub fn create_key(&mut self, name: impl Into<String>, key_type: KeyType) -> Result<()> {
        self.insert(name, key_type.default_value())
    }

    /// Add a key with an initial value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<BlackboardValue>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(BlackboardError::InvalidKeyName);
        }
        if self.contains(&name) {
            return Err(BlackboardError::DuplicateKey {
                name,
                scope: BlackboardScope::Local,
            });
        }
        self.keys.push(BlackboardKey::new(name, value.into()));
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<BlackboardKey> {
        let index = self.keys.iter().position(|k| k.name == name)?;
        Some(self.keys.remove(index))
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn value(&self, name: &str) -> Result<&BlackboardValue> {
        self.find(name).map(|k| &k.value).ok_or_else(|| not_found(name))
    }

    pub fn get<T: BlackboardType>(&self, name: &str) -> Result<T> {
        let value = self.value(name)?;
        T::from_value(value).ok_or_else(|| BlackboardError::KeyTypeMismatch {
            name: name.to_string(),
            stored: value.key_type(),
            requested: T::KEY_TYPE,
        })
    }

    pub fn set<T: BlackboardType>(&mut self, name: &str, value: T) -> Result<()> {
        self.set_value(name, value.into_value())
    }

    /// Replace the value of an existing key. The new value must have the key's type.
    pub fn set_value(&mut self, name: &str, value: BlackboardValue) -> Result<()> {
        let key = self
            .keys
            .iter_mut()
            .find(|k| k.name == name)
            .ok_or_else(|| not_found(name))?;
        if key.key_type() != value.key_type() {
            return Err(BlackboardError::KeyTypeMismatch {
                name: name.to_string(),
                stored: key.key_type(),
                requested: value.key_type(),
            });
        }
        key.value = value;
        Ok(())
    }
}

fn not_found(name: &str) -> BlackboardError {
    BlackboardError::KeyNotFound {
        name: name.to_string(),
    }
}

/// Handle to a blackboard aliased by many tree instances.
///
/// Cloning the handle aliases the same storage. Access goes through a
/// reader/writer lock so instances ticked on different threads stay sound;
/// each access holds the lock only for the duration of one read or write.
#[derive(Clone, Default)]
pub struct SharedBlackboard {
    inner: Arc<RwLock<Blackboard>>,
}

impl SharedBlackboard {
    pub fn new(blackboard: Blackboard) -> Self {
        Self {
            inner: Arc::new(RwLock::new(blackboard)),
        }
    }

    /// A writer that panicked mid-update leaves whole values behind, so a
    /// poisoned lock is still usable.
    pub fn read(&self) -> RwLockReadGuard<'_, Blackboard> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Blackboard> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn ptr_eq(&self, other: &SharedBlackboard) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of handles (tree instances, templates, hosts) aliasing this blackboard.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    pub fn get<T: BlackboardType>(&self, name: &str) -> Result<T> {
        self.read().get(name)
    }

    pub fn set<T: BlackboardType>(&self, name: &str, value: T) -> Result<()> {
        self.write().set(name, value)
    }
}

impl From<Blackboard> for SharedBlackboard {
    fn from(value: Blackboard) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for SharedBlackboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBlackboard")
            .field("keys", &self.read().len())
            .field("handles", &self.handle_count())
            .finish()
    }
}
