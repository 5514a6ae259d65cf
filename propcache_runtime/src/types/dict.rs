//! Dictionary object implementation.
//!
//! Attribute tables and cache mappings are string-keyed, so the dict keys on
//! interned strings and hashes them by pointer.

use propcache_core::{InternedString, PyObject, Value, intern};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// Dictionary Object
// =============================================================================

/// Python dict object with string keys.
///
/// Interior locking lets many owners (an instance and whoever fetched its
/// `__dict__`) share one mapping. No method holds the lock while running
/// user code.
pub struct DictObject {
    items: RwLock<FxHashMap<InternedString, Value>>,
}

impl DictObject {
    /// Create a new empty dict.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: RwLock::new(FxHashMap::default()),
        }
    }

    /// Create a dict with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: RwLock::new(FxHashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
        }
    }

    /// Allocate a dict and register it with the cycle collector.
    #[must_use]
    pub fn alloc() -> Arc<Self> {
        crate::alloc(Self::new())
    }

    /// Get the number of items.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Check if the dict is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Get a value by key.
    #[inline]
    pub fn get(&self, key: &InternedString) -> Option<Value> {
        self.items.read().get(key).cloned()
    }

    /// Get a value by string key.
    pub fn get_str(&self, key: &str) -> Option<Value> {
        self.get(&intern(key))
    }

    /// Set a value, replacing any previous one.
    #[inline]
    pub fn set(&self, key: InternedString, value: Value) {
        // The previous value is dropped after the lock is released.
        let previous = self.items.write().insert(key, value);
        drop(previous);
    }

    /// Set a value by string key.
    pub fn set_str(&self, key: &str, value: Value) {
        self.set(intern(key), value);
    }

    /// Remove a key, returning its value.
    pub fn remove(&self, key: &InternedString) -> Option<Value> {
        self.items.write().remove(key)
    }

    /// Check if a key is present.
    #[inline]
    pub fn contains_key(&self, key: &InternedString) -> bool {
        self.items.read().contains_key(key)
    }

    /// Snapshot of the keys.
    pub fn keys(&self) -> Vec<InternedString> {
        self.items.read().keys().cloned().collect()
    }

    /// Snapshot of the values.
    pub fn values(&self) -> Vec<Value> {
        self.items.read().values().cloned().collect()
    }

    /// Snapshot of the key-value pairs.
    pub fn items(&self) -> Vec<(InternedString, Value)> {
        self.items
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Remove all items.
    pub fn clear(&self) {
        let drained = std::mem::take(&mut *self.items.write());
        drop(drained);
    }
}

impl Default for DictObject {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DictObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.items()).finish()
    }
}

impl PyObject for DictObject {
    fn type_name(&self) -> &str {
        "dict"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

// =============================================================================
// Tests
// =============================================================================
