//! `cached_property`: compute once, store in the instance `__dict__`.
//!
//! ```python
//! class A:
//!     @cached_property
//!     def prop(self):
//!         return expensive()
//!
//! a = A()
//! a.prop          # computes, stores a.__dict__["prop"]
//! a.prop          # returns the stored value
//! a.prop = 1      # AttributeError: cached property is read-only
//! ```
//!
//! The cache key is the attribute name the descriptor was assigned to, bound
//! by `__set_name__` during class creation. A descriptor can be shared by
//! several classes as long as it is bound to the same name in each.

use super::memoize::{DICT_ATTR, memoized_get};
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
use tracing::debug;

/// Whether a cached property has been given its attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NameBinding {
    /// Not yet attached to a class.
    #[default]
    Unbound,
    /// Attached under this name.
    Bound(InternedString),
}

impl NameBinding {
    /// The bound name, if any.
    #[inline]
    pub fn name(&self) -> Option<&InternedString> {
        match self {
            Self::Unbound => None,
            Self::Bound(name) => Some(name),
        }
    }

    /// Check whether a name is bound.
    #[inline]
    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }
}

/// Read-only descriptor memoizing its result in the instance `__dict__`.
pub struct CachedProperty {
    /// `None` only after the collector cleared this descriptor.
    func: RwLock<Option<Value>>,
    name: RwLock<NameBinding>,
    doc: LazyDoc,
}

impl CachedProperty {
    /// Python-visible type name.
    pub const TYPE_NAME: &'static str = "cached_property";

    /// Wrap `func`. Callability is checked when the property is first read.
    #[must_use]
    pub fn new(func: Value) -> Self {
        Self {
            func: RwLock::new(Some(func)),
            name: RwLock::new(NameBinding::Unbound),
            doc: LazyDoc::default(),
        }
    }

    /// Allocate and register with the cycle collector.
    #[must_use]
    pub fn alloc(func: Value) -> Arc<Self> {
        crate::alloc(Self::new(func))
    }

    /// The wrapped function.
    pub fn func(&self) -> PropResult<Value> {
        self.func
            .read()
            .clone()
            .ok_or_else(|| PropError::no_attribute(Self::TYPE_NAME, "func"))
    }

    /// Current name binding.
    pub fn binding(&self) -> NameBinding {
        self.name.read().clone()
    }

    /// `__doc__`: the wrapped function's docstring unless overridden.
    pub fn doc(&self) -> PropResult<Value> {
        let func = self.func.read().clone();
        self.doc.get(func.as_ref())
    }

    /// Overwrite `__doc__`.
    pub fn set_doc(&self, doc: Value) {
        self.doc.set(doc);
    }

    /// `cached_property[item]`.
    #[must_use]
    pub fn class_getitem(item: Value) -> GenericAlias {
        GenericAlias::new(Value::str(Self::TYPE_NAME), vec![item])
    }

    pub(crate) fn visit(&self, mut f: impl FnMut(&Value)) {
        if let Some(func) = self.func.read().as_ref() {
            f(func);
        }
        if let Some(doc) = self.doc.peek() {
            f(&doc);
        }
    }

    pub(crate) fn drop_refs(&self) {
        let func = self.func.write().take();
        drop(func);
        self.doc.clear();
    }
}

impl fmt::Debug for CachedProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.name.read() {
            NameBinding::Bound(name) => write!(f, "<cached_property '{name}'>"),
            NameBinding::Unbound => f.write_str("<cached_property (unbound)>"),
        }
    }
}

impl PyObject for CachedProperty {
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
            "func" => self.func(),
            "name" => match self.binding() {
                NameBinding::Bound(bound) => Ok(Value::Str(bound)),
                NameBinding::Unbound => Err(PropError::no_attribute(Self::TYPE_NAME, name)),
            },
            _ => Err(PropError::no_attribute(Self::TYPE_NAME, name)),
        }
    }

    fn set_attr(self: Arc<Self>, name: &InternedString, value: Value) -> PropResult<()> {
        match name.as_str() {
            "__doc__" => {
                self.set_doc(value);
                Ok(())
            }
            "func" | "name" => Err(readonly_attribute()),
            _ => Err(PropError::no_attribute(Self::TYPE_NAME, name)),
        }
    }
}

impl Descriptor for CachedProperty {
    fn kind(&self) -> DescriptorKind {
        DescriptorKind::CachedProperty
    }

    fn flags(&self) -> DescriptorFlags {
        DescriptorFlags::HAS_GET
            | DescriptorFlags::HAS_SET
            | DescriptorFlags::DATA_DESCRIPTOR
            | DescriptorFlags::SET_NAME
            | DescriptorFlags::MEMOIZED
    }

    fn get(self: Arc<Self>, obj: Option<&Value>, _owner: Option<&Value>) -> PropResult<Value> {
        let Some(instance) = obj.filter(|v| !v.is_none()) else {
            return Ok(Value::object(self));
        };
        let NameBinding::Bound(name) = self.binding() else {
            return Err(PropError::NotBound);
        };
        let func = self.func()?;
        memoized_get(&name, &func, instance, &DICT_ATTR)
    }

    fn set(&self, _obj: &Value, _value: Value) -> PropResult<()> {
        Err(PropError::read_only("cached property is read-only"))
    }

    fn set_name(&self, owner: &Value, name: &InternedString) -> PropResult<()> {
        let mut binding = self.name.write();
        if let NameBinding::Bound(existing) = &*binding {
            if existing.as_str() == name.as_str() {
                return Ok(());
            }
            return Err(PropError::naming_conflict(existing.as_str(), name.as_str()));
        }

        *binding = NameBinding::Bound(name.clone());
        debug!(name = %name, owner = ?owner, "cached_property bound");
        Ok(())
    }
}
