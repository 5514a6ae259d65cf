//! Public API of the property caching library.
//!
//! | Name                   | Caches into          | Key from              |
//! |------------------------|----------------------|-----------------------|
//! | `cached_property`      | instance `__dict__`  | attribute name        |
//! | `under_cached_property`| instance `_cache`    | wrapped `__name__`    |
//! | `base_cached_property` | alias of `under_cached_property`             |
//!
//! `CacheBase` is a class whose `__init__` creates the `_cache` dict, so its
//! subclasses can use `under_cached_property` with no extra setup.

pub use crate::module::ModuleState;
use propcache_core::{PropResult, Value};
use propcache_runtime::{CachedProperty, ClassObject, UnderCachedProperty};
use std::sync::{Arc, LazyLock};

/// Wrap `func` in a `cached_property`.
///
/// The result still needs a name; assigning it as a class attribute through
/// [`ClassBuilder`](propcache_runtime::ClassBuilder) provides one.
#[must_use]
pub fn cached_property(func: Value) -> Value {
    Value::object(CachedProperty::alloc(func))
}

/// Wrap `wrapped` in an `under_cached_property`.
///
/// # Errors
///
/// Fails when `wrapped` has no `__name__` or is not callable.
pub fn under_cached_property(wrapped: Value) -> PropResult<Value> {
    Ok(Value::object(UnderCachedProperty::alloc(wrapped)?))
}

/// Alias of [`under_cached_property`].
pub fn base_cached_property(wrapped: Value) -> PropResult<Value> {
    under_cached_property(wrapped)
}

static MODULE: LazyLock<PropResult<Arc<ModuleState>>> = LazyLock::new(ModuleState::new);

/// The process-wide module state.
pub fn module() -> PropResult<Arc<ModuleState>> {
    MODULE.as_ref().map(Arc::clone).map_err(Clone::clone)
}

/// The process-wide `CacheBase` class.
pub fn cache_base() -> PropResult<Arc<ClassObject>> {
    module()?.cache_base()
}
