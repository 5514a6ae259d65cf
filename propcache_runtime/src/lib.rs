//! # propcache runtime
//!
//! A small host object runtime and the caching descriptors that live in it.
//!
//! - [`types`]: dicts, native functions, generic aliases
//! - [`object`]: classes, instances, MRO, attribute lookup, descriptors
//! - `gc_trace`: cycle-collector hooks for every container type
//!
//! Objects created through the runtime's constructors are registered with
//! the process-wide collector (`propcache_gc::global()`).

#![warn(clippy::all)]

pub mod gc_trace;
pub mod object;
pub mod types;

pub use object::descriptor::{CachedProperty, NameBinding, UnderCachedProperty, memoized_get};
pub use object::{ClassBuilder, ClassFlags, ClassObject, InstanceObject};
pub use types::{DictObject, FunctionObject, GenericAlias};

use propcache_gc::Trace;
use std::sync::Arc;

/// Allocate `obj` and register it with the global cycle collector.
pub(crate) fn alloc<T: Trace + 'static>(obj: T) -> Arc<T> {
    let obj = Arc::new(obj);
    propcache_gc::track(&obj);
    obj
}
