//! `under_cached_property`: compute once, store in the instance's `_cache`.
//!
//! Unlike [`CachedProperty`](super::CachedProperty) the cache key comes from
//! the wrapped callable's `__name__` at construction time, and the instance
//! `__dict__` is never touched. The instance must provide a `_cache` dict.

use super::memoize::{CACHE_ATTR, memoized_get};
use super::{LazyDoc, readonly_attribute};
use crate::types::GenericAlias;
use propcache_core::{
    Descriptor, DescriptorFlags, DescriptorKind, InternedString, PropError, PropResult, PyObject,
    Value,
};
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Read-only descriptor memoizing its result in the instance `_cache` dict.
pub struct UnderCachedProperty {
    /// `None` only after the collector cleared this descriptor.
    wrapped: RwLock<Option<Value>>,
    name: InternedString,
    doc: LazyDoc,
}

impl UnderCachedProperty {
    /// Python-visible type name.
    pub const TYPE_NAME: &'static str = "under_cached_property";

    /// Wrap `wrapped`, taking the cache key from its `__name__`.
    ///
    /// # Errors
    ///
    /// - `AttributeError` construction error when `__name__` is missing
    /// - `TypeError` when `__name__` is not a string
    /// - `TypeError` construction error when `wrapped` is not callable
    pub fn new(wrapped: Value) -> PropResult<Self> {
        let name = wrapped.getattr("__name__").map_err(|err| match err {
            PropError::AttributeError { message } => PropError::missing_name(message),
            other => other,
        })?;
        let Some(name) = name.as_interned().cloned() else {
            return Err(PropError::type_error(format!(
                "__name__ must be set to a string object, not '{}'",
                name.type_name()
            )));
        };
        if !wrapped.is_callable() {
            return Err(PropError::not_callable(&name));
        }

        Ok(Self {
            wrapped: RwLock::new(Some(wrapped)),
            name,
            doc: LazyDoc::default(),
        })
    }

    /// Allocate and register with the cycle collector.
    pub fn alloc(wrapped: Value) -> PropResult<Arc<Self>> {
        Ok(crate::alloc(Self::new(wrapped)?))
    }

    /// The wrapped callable.
    pub fn wrapped(&self) -> PropResult<Value> {
        self.wrapped
            .read()
            .clone()
            .ok_or_else(|| PropError::no_attribute(Self::TYPE_NAME, "wrapped"))
    }

    /// The cache key.
    #[inline]
    pub fn name(&self) -> &InternedString {
        &self.name
    }

    /// `__doc__`: the wrapped callable's docstring unless overridden.
    pub fn doc(&self) -> PropResult<Value> {
        let wrapped = self.wrapped.read().clone();
        self.doc.get(wrapped.as_ref())
    }

    /// Overwrite `__doc__`.
    pub fn set_doc(&self, doc: Value) {
        self.doc.set(doc);
    }

    /// `under_cached_property[item]`.
    #[must_use]
    pub fn class_getitem(item: Value) -> GenericAlias {
        GenericAlias::new(Value::str(Self::TYPE_NAME), vec![item])
    }

    pub(crate) fn visit(&self, mut f: impl FnMut(&Value)) {
        if let Some(wrapped) = self.wrapped.read().as_ref() {
            f(wrapped);
        }
        if let Some(doc) = self.doc.peek() {
            f(&doc);
        }
    }

    pub(crate) fn drop_refs(&self) {
        let wrapped = self.wrapped.write().take();
        drop(wrapped);
        self.doc.clear();
    }
}

impl fmt::Debug for UnderCachedProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<under_cached_property '{}'>", self.name)
    }
}

impl PyObject for UnderCachedProperty {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn as_descriptor(self: Arc<Self>) -> Option<Arc<dyn Descriptor>> {
        Some(self)
    }

    fn get_attr(self: Arc<Self>, name: &InternedString) -> PropResult<Value> {
        match name.as_str() {
            "__doc__" => self.doc(),
            "wrapped" => self.wrapped(),
            "name" => Ok(Value::Str(self.name.clone())),
            _ => Err(PropError::no_attribute(Self::TYPE_NAME, name)),
        }
    }

    fn set_attr(self: Arc<Self>, name: &InternedString, value: Value) -> PropResult<()> {
        match name.as_str() {
            "__doc__" => {
                self.set_doc(value);
                Ok(())
            }
            "wrapped" | "name" => Err(readonly_attribute()),
            _ => Err(PropError::no_attribute(Self::TYPE_NAME, name)),
        }
    }
}

impl Descriptor for UnderCachedProperty {
    fn kind(&self) -> DescriptorKind {
        DescriptorKind::UnderCachedProperty
    }

    fn flags(&self) -> DescriptorFlags {
        DescriptorFlags::HAS_GET
            | DescriptorFlags::HAS_SET
            | DescriptorFlags::DATA_DESCRIPTOR
            | DescriptorFlags::MEMOIZED
    }

    fn get(self: Arc<Self>, obj: Option<&Value>, _owner: Option<&Value>) -> PropResult<Value> {
        let Some(instance) = obj.filter(|v| !v.is_none()) else {
            return Ok(Value::object(self));
        };
        let wrapped = self.wrapped()?;
        memoized_get(&self.name, &wrapped, instance, &CACHE_ATTR)
    }

    fn set(&self, _obj: &Value, _value: Value) -> PropResult<()> {
        Err(PropError::read_only("cached property is read-only"))
    }
}
