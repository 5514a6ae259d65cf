//! Native function objects.
//!
//! A [`FunctionObject`] is the runtime's stand-in for a Python function: a
//! callable with `__name__` and a writable `__doc__`. The body is a Rust
//! closure. Values the body needs to keep alive (the owning class, other
//! functions) go in the explicit closure list, where the cycle collector can
//! see them.

use propcache_core::{InternedString, PropError, PropResult, PyObject, Value, intern};
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Signature of a native function body: `(closure, args)`.
pub type NativeFn = dyn Fn(&[Value], &[Value]) -> PropResult<Value> + Send + Sync;

/// A callable function object.
pub struct FunctionObject {
    /// `__name__`; `None` models callables without one.
    name: Option<InternedString>,
    /// `__doc__`.
    doc: RwLock<Value>,
    /// Captured values, passed to the body on every call.
    closure: RwLock<Vec<Value>>,
    body: Box<NativeFn>,
}

impl FunctionObject {
    /// Create a named function.
    pub fn new<F>(name: &str, body: F) -> Self
    where
        F: Fn(&[Value], &[Value]) -> PropResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: Some(intern(name)),
            doc: RwLock::new(Value::none()),
            closure: RwLock::new(Vec::new()),
            body: Box::new(body),
        }
    }

    /// Create a callable that has no `__name__`.
    pub fn anonymous<F>(body: F) -> Self
    where
        F: Fn(&[Value], &[Value]) -> PropResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: None,
            ..Self::new("", body)
        }
    }

    /// Set the docstring.
    #[must_use]
    pub fn with_doc(self, doc: &str) -> Self {
        *self.doc.write() = Value::str(doc);
        self
    }

    /// Set the captured values.
    #[must_use]
    pub fn with_closure(self, closure: Vec<Value>) -> Self {
        *self.closure.write() = closure;
        self
    }

    /// Allocate the function, register it with the collector and wrap it.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::object(crate::alloc(self))
    }

    /// Get `__name__`.
    #[inline]
    pub fn name(&self) -> Option<&InternedString> {
        self.name.as_ref()
    }

    /// Get `__doc__`.
    pub fn doc(&self) -> Value {
        self.doc.read().clone()
    }

    /// Snapshot of the captured values.
    pub fn closure(&self) -> Vec<Value> {
        self.closure.read().clone()
    }

    pub(crate) fn visit(&self, mut f: impl FnMut(&Value)) {
        f(&*self.doc.read());
        for value in self.closure.read().iter() {
            f(value);
        }
    }

    pub(crate) fn drop_refs(&self) {
        let doc = std::mem::take(&mut *self.doc.write());
        let closure = std::mem::take(&mut *self.closure.write());
        drop((doc, closure));
    }
}

impl fmt::Debug for FunctionObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "<function {name}>"),
            None => f.write_str("<function>"),
        }
    }
}

impl PyObject for FunctionObject {
    fn type_name(&self) -> &str {
        "function"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn get_attr(self: Arc<Self>, name: &InternedString) -> PropResult<Value> {
        match name.as_str() {
            "__name__" => match &self.name {
                Some(n) => Ok(Value::Str(n.clone())),
                None => Err(PropError::no_attribute(self.type_name(), name)),
            },
            "__doc__" => Ok(self.doc()),
            _ => Err(PropError::no_attribute(self.type_name(), name)),
        }
    }

    fn set_attr(self: Arc<Self>, name: &InternedString, value: Value) -> PropResult<()> {
        if name.as_str() == "__doc__" {
            let previous = std::mem::replace(&mut *self.doc.write(), value);
            drop(previous);
            Ok(())
        } else {
            Err(PropError::no_attribute(self.type_name(), name))
        }
    }

    fn is_callable(&self) -> bool {
        true
    }

    fn call(self: Arc<Self>, args: &[Value]) -> PropResult<Value> {
        // Released before the body runs; the body may touch this function.
        let closure = self.closure();
        (self.body)(&closure, args)
    }
}
