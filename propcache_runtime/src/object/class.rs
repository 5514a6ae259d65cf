//! Class objects.
//!
//! A [`ClassObject`] owns a namespace of class attributes and a precomputed
//! MRO. Classes are created through [`ClassBuilder`], which mirrors the steps
//! of a `class` statement:
//!
//! 1. collect the namespace in definition order
//! 2. linearize the bases (C3)
//! 3. create the class object
//! 4. call `__set_name__` on every descriptor in the namespace
//!
//! Calling a class creates an [`InstanceObject`] and runs the first
//! `__init__` found along the MRO.

use super::instance::InstanceObject;
use super::mro::{ClassId, Mro, MroError, compute_c3_mro};
use propcache_core::{
    DescriptorFlags, InternedString, PropError, PropResult, PyObject, Value, intern,
};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

bitflags::bitflags! {
    /// Per-class layout flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClassFlags: u8 {
        /// Instances carry a `__dict__`.
        const HAS_DICT = 1 << 0;
        /// The class declared `__slots__`.
        const SLOTS = 1 << 1;
    }
}

// =============================================================================
// Class Object
// =============================================================================

/// A class.
pub struct ClassObject {
    id: ClassId,
    name: InternedString,
    flags: ClassFlags,
    bases: Vec<Arc<ClassObject>>,
    /// MRO entries after the class itself.
    ancestors: Vec<Arc<ClassObject>>,
    mro: Mro,
    namespace: RwLock<FxHashMap<InternedString, Value>>,
}

impl ClassObject {
    /// Get the class id.
    #[inline]
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Get `__name__`.
    #[inline]
    pub fn name(&self) -> &InternedString {
        &self.name
    }

    /// Get the layout flags.
    #[inline]
    pub fn flags(&self) -> ClassFlags {
        self.flags
    }

    /// Check whether instances get a `__dict__`.
    #[inline]
    pub fn has_dict(&self) -> bool {
        self.flags.contains(ClassFlags::HAS_DICT)
    }

    /// Direct bases, in declaration order.
    #[inline]
    pub fn bases(&self) -> &[Arc<ClassObject>] {
        &self.bases
    }

    /// The MRO as class ids, starting with this class.
    #[inline]
    pub fn mro(&self) -> &[ClassId] {
        &self.mro
    }

    /// `issubclass(self, other)`.
    pub fn is_subclass(&self, other: &ClassObject) -> bool {
        self.mro.contains(&other.id)
    }

    /// Find `name` along the MRO.
    pub fn lookup(&self, name: &InternedString) -> Option<Value> {
        if let Some(v) = self.lookup_own(name) {
            return Some(v);
        }
        self.ancestors.iter().find_map(|cls| cls.lookup_own(name))
    }

    /// Find `name` in this class's own namespace only.
    pub fn lookup_own(&self, name: &InternedString) -> Option<Value> {
        self.namespace.read().get(name).cloned()
    }

    /// Set a class attribute without running `__set_name__`.
    pub fn set_class_attr(&self, name: InternedString, value: Value) {
        let previous = self.namespace.write().insert(name, value);
        drop(previous);
    }

    /// Create a bare instance without running `__init__`.
    pub fn instantiate(self: &Arc<Self>) -> Arc<InstanceObject> {
        InstanceObject::alloc(Arc::clone(self))
    }

    pub(crate) fn visit(&self, mut f: impl FnMut(*const ())) {
        for base in self.bases.iter().chain(&self.ancestors) {
            f(Arc::as_ptr(base).cast());
        }
        for value in self.namespace.read().values() {
            if let Some(addr) = value.object_addr() {
                f(addr as *const ());
            }
        }
    }

    pub(crate) fn drop_refs(&self) {
        let namespace = std::mem::take(&mut *self.namespace.write());
        drop(namespace);
    }
}

impl fmt::Debug for ClassObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class '{}'>", self.name)
    }
}

impl PyObject for ClassObject {
    fn type_name(&self) -> &str {
        "type"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn get_attr(self: Arc<Self>, name: &InternedString) -> PropResult<Value> {
        if name.as_str() == "__name__" {
            return Ok(Value::Str(self.name.clone()));
        }

        let Some(attr) = self.lookup(name) else {
            return Err(PropError::attribute(format!(
                "type object '{}' has no attribute '{}'",
                self.name, name
            )));
        };

        match attr.as_descriptor() {
            Some(descr) if descr.flags().contains(DescriptorFlags::HAS_GET) => {
                let owner = Value::object(self);
                descr.get(None, Some(&owner))
            }
            _ => Ok(attr),
        }
    }

    fn set_attr(self: Arc<Self>, name: &InternedString, value: Value) -> PropResult<()> {
        self.set_class_attr(name.clone(), value);
        Ok(())
    }

    fn is_callable(&self) -> bool {
        true
    }

    fn call(self: Arc<Self>, args: &[Value]) -> PropResult<Value> {
        let instance = Value::object(self.instantiate());

        if let Some(init) = self.lookup(&intern("__init__")) {
            let mut init_args = Vec::with_capacity(args.len() + 1);
            init_args.push(instance.clone());
            init_args.extend_from_slice(args);

            let ret = init.call(&init_args)?;
            if !ret.is_none() {
                return Err(PropError::type_error(format!(
                    "__init__() should return None, not '{}'",
                    ret.type_name()
                )));
            }
        }

        Ok(instance)
    }
}

// =============================================================================
// Class Builder
// =============================================================================

/// Builder for [`ClassObject`], the runtime's `class` statement.
#[derive(Debug)]
pub struct ClassBuilder {
    name: InternedString,
    bases: Vec<Arc<ClassObject>>,
    attrs: Vec<(InternedString, Value)>,
    slots: bool,
}

impl ClassBuilder {
    /// Start a class named `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: intern(name),
            bases: Vec::new(),
            attrs: Vec::new(),
            slots: false,
        }
    }

    /// Add a base class.
    #[must_use]
    pub fn base(mut self, base: Arc<ClassObject>) -> Self {
        self.bases.push(base);
        self
    }

    /// Define a class attribute. Redefinition keeps the original position.
    #[must_use]
    pub fn attr(mut self, name: &str, value: Value) -> Self {
        let name = intern(name);
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    /// Declare `__slots__ = ()`.
    ///
    /// Instances get no `__dict__` unless a base class provides one.
    #[must_use]
    pub fn slots(mut self) -> Self {
        self.slots = true;
        self
    }

    /// Finalize the class.
    ///
    /// Fails with `TypeError` on an invalid hierarchy, or with the first
    /// error raised by a descriptor's `__set_name__`.
    pub fn build(self) -> PropResult<Arc<ClassObject>> {
        let id = ClassId::next();

        let mut known: FxHashMap<ClassId, Arc<ClassObject>> = FxHashMap::default();
        for base in &self.bases {
            known.insert(base.id, Arc::clone(base));
            for ancestor in &base.ancestors {
                known.insert(ancestor.id, Arc::clone(ancestor));
            }
        }

        let base_mros: Vec<&[ClassId]> = self.bases.iter().map(|b| b.mro()).collect();
        let mro = compute_c3_mro(id, &base_mros).map_err(|err| {
            let name_of = |id: &ClassId| {
                known
                    .get(id)
                    .map_or_else(|| format!("<{}>", id.0), |c| c.name.to_string())
            };
            match err {
                MroError::DuplicateBase(dup) => {
                    PropError::type_error(format!("duplicate base class {}", name_of(&dup)))
                }
                MroError::Inconsistent(heads) => PropError::type_error(format!(
                    "Cannot create a consistent method resolution order (MRO) for bases {}",
                    heads.iter().map(name_of).collect::<Vec<_>>().join(", ")
                )),
            }
        })?;

        let ancestors = mro[1..]
            .iter()
            .filter_map(|id| known.get(id).cloned())
            .collect();

        let mut flags = ClassFlags::empty();
        if self.slots {
            flags |= ClassFlags::SLOTS;
        }
        if !self.slots || self.bases.iter().any(|b| b.has_dict()) {
            flags |= ClassFlags::HAS_DICT;
        }

        let namespace = self.attrs.iter().cloned().collect();
        let class = crate::alloc(ClassObject {
            id,
            name: self.name,
            flags,
            bases: self.bases,
            ancestors,
            mro,
            namespace: RwLock::new(namespace),
        });

        let owner = Value::object(Arc::clone(&class));
        for (name, value) in &self.attrs {
            if let Some(descr) = value.as_descriptor() {
                if descr.flags().contains(DescriptorFlags::SET_NAME) {
                    descr.set_name(&owner, name)?;
                }
            }
        }

        debug!(
            class = %class.name,
            attrs = self.attrs.len(),
            has_dict = class.has_dict(),
            "class finalized"
        );
        Ok(class)
    }
}
