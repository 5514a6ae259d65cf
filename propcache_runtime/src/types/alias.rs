//! Parameterized generic alias (`Origin[Args]`).
//!
//! Subscripting a descriptor type produces one of these. It records the
//! origin and arguments and has no other behaviour.

use propcache_core::{InternedString, PropError, PropResult, PyObject, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// An inert `origin[args]` record.
pub struct GenericAlias {
    origin: Value,
    args: Vec<Value>,
}

impl GenericAlias {
    /// Create an alias.
    #[inline]
    #[must_use]
    pub fn new(origin: Value, args: Vec<Value>) -> Self {
        Self { origin, args }
    }

    /// `__origin__`.
    #[inline]
    pub fn origin(&self) -> &Value {
        &self.origin
    }

    /// `__args__`.
    #[inline]
    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

impl fmt::Debug for GenericAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.origin)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str("]")
    }
}

impl PyObject for GenericAlias {
    fn type_name(&self) -> &str {
        "types.GenericAlias"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn get_attr(self: Arc<Self>, name: &InternedString) -> PropResult<Value> {
        match name.as_str() {
            "__origin__" => Ok(self.origin.clone()),
            _ => Err(PropError::no_attribute(self.type_name(), name)),
        }
    }
}
