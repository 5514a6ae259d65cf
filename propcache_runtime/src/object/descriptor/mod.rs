//! Descriptor implementations.
//!
//! | Type                  | Data descriptor | Stores result in      |
//! |-----------------------|-----------------|-----------------------|
//! | `CachedProperty`      | yes             | instance `__dict__`   |
//! | `UnderCachedProperty` | yes             | instance `_cache`     |
//!
//! The cached descriptors are data descriptors so they are consulted on
//! every read, even after the value has been stored; each read re-checks the
//! cache mapping before computing.

pub mod cached_property;
pub mod memoize;
pub mod under_cached_property;

pub use cached_property::{CachedProperty, NameBinding};
pub use memoize::memoized_get;
pub use under_cached_property::UnderCachedProperty;

use propcache_core::{PropError, PropResult, Value};
use parking_lot::RwLock;

/// `__doc__` slot loaded from the wrapped callable on first read.
///
/// An explicit write always wins, including over a load racing with it.
#[derive(Debug, Default)]
pub(crate) struct LazyDoc(RwLock<Option<Value>>);

impl LazyDoc {
    pub(crate) fn get(&self, source: Option<&Value>) -> PropResult<Value> {
        if let Some(doc) = self.0.read().clone() {
            return Ok(doc);
        }

        let loaded = match source.map(|f| f.getattr("__doc__")) {
            Some(Ok(doc)) => doc,
            Some(Err(err)) if !err.is_attribute_error() => return Err(err),
            _ => Value::none(),
        };
        Ok(self.0.write().get_or_insert(loaded).clone())
    }

    pub(crate) fn set(&self, doc: Value) {
        let previous = self.0.write().replace(doc);
        drop(previous);
    }

    /// The stored doc without loading it.
    pub(crate) fn peek(&self) -> Option<Value> {
        self.0.read().clone()
    }

    pub(crate) fn clear(&self) {
        let previous = self.0.write().take();
        drop(previous);
    }
}

/// Error for writes to `name`, `func` and `wrapped`.
pub(crate) fn readonly_attribute() -> PropError {
    PropError::read_only("readonly attribute")
}
