//! Per-instance memoization shared by both cached descriptors.
//!
//! ```text
//! instance.<cache_attr>  ──►  dict
//!                              │
//!                  hit ◄───────┤ key present
//!                              │
//!                  miss ──► compute(instance) ──► dict[key] = value
//! ```
//!
//! No lock is held while `compute` runs. Two threads missing at the same time
//! both compute and both store; the later store wins and every later read
//! sees it.

use crate::types::DictObject;
use propcache_core::{InternedString, PropError, PropResult, Value, intern};
use std::sync::LazyLock;
use tracing::trace;

/// Cache attribute used by `cached_property`.
pub static DICT_ATTR: LazyLock<InternedString> = LazyLock::new(|| intern("__dict__"));

/// Cache attribute used by `under_cached_property`.
pub static CACHE_ATTR: LazyLock<InternedString> = LazyLock::new(|| intern("_cache"));

/// Return `instance.<cache_attr>[key]`, computing and storing it on a miss.
///
/// # Errors
///
/// - whatever reading `cache_attr` raises (`AttributeError` when absent)
/// - `TypeError` when the mapping is not a dict
/// - whatever `compute` raises; nothing is stored in that case
pub fn memoized_get(
    key: &InternedString,
    compute: &Value,
    instance: &Value,
    cache_attr: &InternedString,
) -> PropResult<Value> {
    let cache = instance.getattr_interned(cache_attr)?;
    let Some(dict) = cache.downcast::<DictObject>() else {
        return Err(PropError::type_error(format!(
            "'{}' attribute of '{}' object must be a dict, not '{}'",
            cache_attr,
            instance.type_name(),
            cache.type_name()
        )));
    };

    if let Some(value) = dict.get(key) {
        return Ok(value);
    }

    trace!(key = %key, cache = %cache_attr, "cache miss");
    let value = compute.call(std::slice::from_ref(instance))?;
    dict.set(key.clone(), value.clone());
    Ok(value)
}
