//! Object and descriptor protocols.
//!
//! Every heap value the runtime hands around is an `Arc<dyn PyObject>`. The
//! trait carries the slots a host interpreter would consult on an object's
//! type (`getattr`, `setattr`, `call`, descriptor hooks); each has a default
//! that raises the error the host would raise for an object lacking it.
//!
//! # Descriptor Protocol
//!
//! Objects stored as class attributes may additionally implement
//! [`Descriptor`]. Attribute lookup on instances then defers to the
//! descriptor:
//!
//! 1. Class MRO is searched for a *data* descriptor (`__get__` plus `__set__`
//!    or `__delete__`); if found it wins.
//! 2. Otherwise the instance `__dict__` is consulted.
//! 3. Otherwise a non-data descriptor or plain class attribute is used.
//! 4. Otherwise `AttributeError`.
//!
//! Class finalization calls [`Descriptor::set_name`] on every descriptor in
//! the class namespace with the attribute name it was stored under.

use crate::error::{PropError, PropResult};
use crate::intern::InternedString;
use crate::value::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Shared reference to a runtime object.
pub type ObjectRef = Arc<dyn PyObject>;

// =============================================================================
// PyObject
// =============================================================================

/// Behaviour shared by all heap objects.
///
/// Methods that need to hand the object itself to other code (as the `self`
/// argument of a descriptor, or as the class of a new instance) take
/// `self: Arc<Self>`.
pub trait PyObject: Any + fmt::Debug + Send + Sync {
    /// The Python-visible type name (`"function"`, `"dict"`, class name for
    /// instances).
    fn type_name(&self) -> &str;

    /// Upcast for by-reference downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Upcast for by-`Arc` downcasting.
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    /// View this object as a descriptor, if its type implements the protocol.
    fn as_descriptor(self: Arc<Self>) -> Option<Arc<dyn Descriptor>> {
        None
    }

    /// `getattr(obj, name)`.
    fn get_attr(self: Arc<Self>, name: &InternedString) -> PropResult<Value> {
        Err(PropError::no_attribute(self.type_name(), name))
    }

    /// `setattr(obj, name, value)`.
    fn set_attr(self: Arc<Self>, name: &InternedString, _value: Value) -> PropResult<()> {
        Err(PropError::no_attribute(self.type_name(), name))
    }

    /// Whether `call` is supported.
    fn is_callable(&self) -> bool {
        false
    }

    /// `obj(*args)`.
    fn call(self: Arc<Self>, _args: &[Value]) -> PropResult<Value> {
        Err(PropError::type_error(format!(
            "'{}' object is not callable",
            self.type_name()
        )))
    }
}

// =============================================================================
// Descriptor Flags
// =============================================================================

bitflags::bitflags! {
    /// Flags describing descriptor capabilities.
    ///
    /// Cached on class lookup so the attribute path can branch without a
    /// virtual call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DescriptorFlags: u8 {
        /// Descriptor has `__get__`.
        const HAS_GET = 1 << 0;
        /// Descriptor has `__set__`.
        const HAS_SET = 1 << 1;
        /// Descriptor has `__delete__`.
        const HAS_DELETE = 1 << 2;
        /// This is a data descriptor (HAS_SET or HAS_DELETE).
        const DATA_DESCRIPTOR = 1 << 3;
        /// Descriptor wants `__set_name__` during class finalization.
        const SET_NAME = 1 << 4;
        /// Descriptor memoizes its result in per-instance storage.
        const MEMOIZED = 1 << 5;
    }
}

/// Enumeration of descriptor types for fast dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DescriptorKind {
    /// Any descriptor defined by the host that does not memoize.
    Native = 0,
    /// `cached_property`: memoizes into the instance `__dict__`.
    CachedProperty = 1,
    /// `under_cached_property`: memoizes into the instance `_cache` mapping.
    UnderCachedProperty = 2,
}

impl DescriptorKind {
    /// Check if results of this descriptor kind are memoized per instance.
    #[inline]
    pub const fn is_memoized(self) -> bool {
        matches!(
            self,
            DescriptorKind::CachedProperty | DescriptorKind::UnderCachedProperty
        )
    }
}

// =============================================================================
// Descriptor Trait
// =============================================================================

/// Core descriptor protocol trait.
pub trait Descriptor: PyObject {
    /// Get the descriptor kind for fast dispatch.
    fn kind(&self) -> DescriptorKind;

    /// Get descriptor flags.
    fn flags(&self) -> DescriptorFlags;

    /// `__get__(self, obj, objtype)`.
    ///
    /// `obj` is `None` when the attribute is read through the class itself.
    fn get(self: Arc<Self>, obj: Option<&Value>, owner: Option<&Value>) -> PropResult<Value>;

    /// `__set__(self, obj, value)`.
    fn set(&self, _obj: &Value, _value: Value) -> PropResult<()> {
        Err(PropError::read_only("attribute is read-only"))
    }

    /// `__delete__(self, obj)`.
    fn delete(&self, _obj: &Value) -> PropResult<()> {
        Err(PropError::attribute("attribute cannot be deleted"))
    }

    /// `__set_name__(self, owner, name)`, called once per owning class.
    fn set_name(&self, _owner: &Value, _name: &InternedString) -> PropResult<()> {
        Ok(())
    }

    /// Check if this is a data descriptor (has `__set__` or `__delete__`).
    #[inline]
    fn is_data_descriptor(&self) -> bool {
        self.flags()
            .intersects(DescriptorFlags::HAS_SET | DescriptorFlags::HAS_DELETE)
    }
}
