//! Runtime value representation.
//!
//! Scalars are stored inline; strings are interned; everything else is a
//! shared [`ObjectRef`]. Cloning a `Value` never copies an object, it only
//! bumps a reference count, so a value stored in a cache mapping and the value
//! handed back to the caller are the *same* object.
//!
//! | Variant  | Python type | Equality        |
//! |----------|-------------|-----------------|
//! | `None`   | `NoneType`  | always equal    |
//! | `Bool`   | `bool`      | by value        |
//! | `Int`    | `int`       | by value        |
//! | `Float`  | `float`     | by value        |
//! | `Str`    | `str`       | by content      |
//! | `Object` | any         | by identity     |

use crate::error::{PropError, PropResult};
use crate::intern::{InternedString, intern};
use crate::object::{Descriptor, ObjectRef, PyObject};
use std::fmt;
use std::sync::Arc;

/// A runtime value.
#[derive(Clone, Default)]
pub enum Value {
    /// `None`.
    #[default]
    None,
    /// `True` / `False`.
    Bool(bool),
    /// Machine integer.
    Int(i64),
    /// IEEE 754 double.
    Float(f64),
    /// Interned string.
    Str(InternedString),
    /// Heap object.
    Object(ObjectRef),
}

impl Value {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a None value.
    #[inline]
    #[must_use]
    pub const fn none() -> Self {
        Self::None
    }

    /// Create a boolean value.
    #[inline]
    #[must_use]
    pub const fn bool(b: bool) -> Self {
        Self::Bool(b)
    }

    /// Create an integer value.
    #[inline]
    #[must_use]
    pub const fn int(i: i64) -> Self {
        Self::Int(i)
    }

    /// Create a float value.
    #[inline]
    #[must_use]
    pub const fn float(f: f64) -> Self {
        Self::Float(f)
    }

    /// Create a string value, interning its content.
    #[inline]
    #[must_use]
    pub fn str(s: &str) -> Self {
        Self::Str(intern(s))
    }

    /// Wrap a concrete object.
    #[inline]
    #[must_use]
    pub fn object<T: PyObject>(obj: Arc<T>) -> Self {
        Self::Object(obj)
    }

    // =========================================================================
    // Type Checking and Extraction
    // =========================================================================

    /// Check if this is None.
    #[inline]
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Try to extract as a boolean.
    #[inline]
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to extract as an integer.
    #[inline]
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to extract as a float.
    #[inline]
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to extract as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Try to extract as an interned string.
    #[inline]
    #[must_use]
    pub const fn as_interned(&self) -> Option<&InternedString> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Try to extract the object reference.
    #[inline]
    #[must_use]
    pub const fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Borrow the object as a concrete type.
    #[must_use]
    pub fn downcast_ref<T: PyObject>(&self) -> Option<&T> {
        self.as_object()?.as_any().downcast_ref::<T>()
    }

    /// Get a shared handle to the object as a concrete type.
    #[must_use]
    pub fn downcast<T: PyObject>(&self) -> Option<Arc<T>> {
        Arc::clone(self.as_object()?).into_any().downcast::<T>().ok()
    }

    /// View the object as a descriptor.
    #[must_use]
    pub fn as_descriptor(&self) -> Option<Arc<dyn Descriptor>> {
        Arc::clone(self.as_object()?).as_descriptor()
    }

    /// Address of the referenced object, used as its identity.
    #[inline]
    #[must_use]
    pub fn object_addr(&self) -> Option<usize> {
        self.as_object().map(|obj| Arc::as_ptr(obj).cast::<()>() as usize)
    }

    /// Python `is`: identity for objects, equality for immediates.
    #[must_use]
    pub fn is(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Object(_), Self::Object(_)) => self.object_addr() == other.object_addr(),
            (Self::Object(_), _) | (_, Self::Object(_)) => false,
            _ => self == other,
        }
    }

    /// The Python-visible type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Object(obj) => obj.type_name(),
        }
    }

    // =========================================================================
    // Object Protocol
    // =========================================================================

    /// `getattr(self, name)`.
    pub fn getattr(&self, name: &str) -> PropResult<Value> {
        self.getattr_interned(&intern(name))
    }

    /// `getattr(self, name)` with a pre-interned name.
    pub fn getattr_interned(&self, name: &InternedString) -> PropResult<Value> {
        match self {
            Self::Object(obj) => Arc::clone(obj).get_attr(name),
            _ => Err(PropError::no_attribute(self.type_name(), name)),
        }
    }

    /// `setattr(self, name, value)`.
    pub fn setattr(&self, name: &str, value: Value) -> PropResult<()> {
        let name = intern(name);
        match self {
            Self::Object(obj) => Arc::clone(obj).set_attr(&name, value),
            _ => Err(PropError::no_attribute(self.type_name(), &name)),
        }
    }

    /// `hasattr(self, name)`.
    ///
    /// Only attribute errors mean "absent"; anything else propagates.
    pub fn hasattr(&self, name: &str) -> PropResult<bool> {
        match self.getattr(name) {
            Ok(_) => Ok(true),
            Err(err) if err.is_attribute_error() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// `callable(self)`.
    #[must_use]
    pub fn is_callable(&self) -> bool {
        self.as_object().is_some_and(|obj| obj.is_callable())
    }

    /// `self(*args)`.
    pub fn call(&self, args: &[Value]) -> PropResult<Value> {
        match self {
            Self::Object(obj) => Arc::clone(obj).call(args),
            _ => Err(PropError::type_error(format!(
                "'{}' object is not callable",
                self.type_name()
            ))),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            #[allow(clippy::cast_precision_loss)]
            (Self::Int(i), Self::Float(f)) | (Self::Float(f), Self::Int(i)) => *i as f64 == *f,
            (Self::Str(a), Self::Str(b)) => a == b || a.as_str() == b.as_str(),
            (Self::Object(_), Self::Object(_)) => self.object_addr() == other.object_addr(),
            _ => false,
        }
    }
}

// Objects may reference themselves; never recurse into them here.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => write!(f, "'{s}'"),
            Self::Object(obj) => write!(
                f,
                "<{} object at {:#x}>",
                obj.type_name(),
                self.object_addr().unwrap_or_default()
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            other => fmt::Debug::fmt(other, f),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::str(s)
    }
}

impl From<InternedString> for Value {
    fn from(s: InternedString) -> Self {
        Self::Str(s)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Self::Object(obj)
    }
}
