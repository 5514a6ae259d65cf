//! Per-interpreter module state.
//!
//! Each interpreter gets its own [`ModuleState`] holding the exported
//! objects: the `CacheBase` class and the decorator callables. Nothing is
//! shared between states, so independent interpreters never observe each
//! other's classes. The state participates in cycle collection like any
//! other container.

use crate::api;
use parking_lot::RwLock;
use propcache_core::{InternedString, PropError, PropResult, PyObject, Value, intern};
use propcache_gc::{Trace, Tracer};
use propcache_runtime::{ClassBuilder, ClassObject, DictObject, FunctionObject};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Module name used in error messages.
pub const MODULE_NAME: &str = "propcache.api";

/// Names exported by the module, sorted.
pub const EXPORTS: [&str; 4] = [
    "CacheBase",
    "base_cached_property",
    "cached_property",
    "under_cached_property",
];

/// Exported objects of one module instance.
pub struct ModuleState {
    exports: RwLock<Vec<(InternedString, Value)>>,
}

impl ModuleState {
    /// Create the module state: build `CacheBase` and the decorators.
    pub fn new() -> PropResult<Arc<Self>> {
        let cache_base = Value::object(build_cache_base()?);

        let cached = FunctionObject::new("cached_property", |_, args| {
            Ok(api::cached_property(single_arg("cached_property", args)?))
        })
        .with_doc("Use as a class method decorator; caches into the instance __dict__.")
        .into_value();

        let under = FunctionObject::new("under_cached_property", |_, args| {
            api::under_cached_property(single_arg("under_cached_property", args)?)
        })
        .with_doc("Use as a class method decorator; caches into the instance _cache.")
        .into_value();

        let exports = vec![
            (intern("CacheBase"), cache_base),
            (intern("base_cached_property"), under.clone()),
            (intern("cached_property"), cached),
            (intern("under_cached_property"), under),
        ];

        let state = Arc::new(Self {
            exports: RwLock::new(exports),
        });
        propcache_gc::track(&state);
        debug!(module = MODULE_NAME, exports = EXPORTS.len(), "module state created");
        Ok(state)
    }

    /// Look up an exported object.
    pub fn get(&self, name: &str) -> Option<Value> {
        let name = intern(name);
        self.exports
            .read()
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.clone())
    }

    /// Names currently exported.
    pub fn exported_names(&self) -> Vec<InternedString> {
        self.exports.read().iter().map(|(n, _)| n.clone()).collect()
    }

    /// The `CacheBase` class of this module.
    pub fn cache_base(&self) -> PropResult<Arc<ClassObject>> {
        self.get("CacheBase")
            .and_then(|v| v.downcast::<ClassObject>())
            .ok_or_else(|| no_module_attribute("CacheBase"))
    }
}

impl fmt::Debug for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<module '{MODULE_NAME}'>")
    }
}

impl PyObject for ModuleState {
    fn type_name(&self) -> &str {
        "module"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn get_attr(self: Arc<Self>, name: &InternedString) -> PropResult<Value> {
        if name.as_str() == "__name__" {
            return Ok(Value::str(MODULE_NAME));
        }
        self.get(name).ok_or_else(|| no_module_attribute(name))
    }
}

impl Trace for ModuleState {
    fn trace(&self, tracer: &mut dyn Tracer) {
        for (_, value) in self.exports.read().iter() {
            tracer.trace_value(value);
        }
    }

    fn clear(&self) {
        let exports = std::mem::take(&mut *self.exports.write());
        drop(exports);
    }
}

fn no_module_attribute(name: &str) -> PropError {
    PropError::attribute(format!("module '{MODULE_NAME}' has no attribute '{name}'"))
}

fn single_arg(func: &str, args: &[Value]) -> PropResult<Value> {
    match args {
        [arg] => Ok(arg.clone()),
        _ => Err(PropError::type_error(format!(
            "{func}() takes exactly one argument ({} given)",
            args.len()
        ))),
    }
}

/// `class CacheBase: def __init__(self): self._cache = {}`
fn build_cache_base() -> PropResult<Arc<ClassObject>> {
    let init = FunctionObject::new("__init__", |_, args| {
        let Some(this) = args.first() else {
            return Err(PropError::type_error(
                "CacheBase.__init__() missing 1 required positional argument: 'self'",
            ));
        };
        this.setattr("_cache", Value::object(DictObject::alloc()))?;
        Ok(Value::none())
    })
    .into_value();

    ClassBuilder::new("CacheBase")
        .attr(
            "__doc__",
            Value::str("Base class for objects that use cached properties."),
        )
        .attr("__init__", init)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exports_present() {
        let state = ModuleState::new().unwrap();
        let names: Vec<String> = state.exported_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, EXPORTS);
        for name in EXPORTS {
            assert!(state.get(name).is_some(), "{name} missing");
        }
    }

    #[test]
    fn test_base_cached_property_is_alias() {
        let state = ModuleState::new().unwrap();
        let base = state.get("base_cached_property").unwrap();
        let under = state.get("under_cached_property").unwrap();
        assert!(base.is(&under));
    }

    #[test]
    fn test_states_are_independent() {
        let a = ModuleState::new().unwrap();
        let b = ModuleState::new().unwrap();
        let ca = Value::object(a.cache_base().unwrap());
        let cb = Value::object(b.cache_base().unwrap());
        assert!(!ca.is(&cb));
    }

    #[test]
    fn test_module_getattr() {
        let module = Value::object(ModuleState::new().unwrap());
        assert_eq!(module.getattr("__name__").unwrap(), Value::str("propcache.api"));
        assert!(module.getattr("cached_property").unwrap().is_callable());
        assert_eq!(
            module.getattr("nope").unwrap_err().to_string(),
            "AttributeError: module 'propcache.api' has no attribute 'nope'"
        );
    }

    #[test]
    fn test_decorator_arity() {
        let state = ModuleState::new().unwrap();
        let decorator = state.get("cached_property").unwrap();
        let err = decorator.call(&[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeError: cached_property() takes exactly one argument (0 given)"
        );
    }

    #[test]
    fn test_trace_and_clear() {
        let state = ModuleState::new().unwrap();
        let mut tracer = propcache_gc::RecordingTracer::new();
        state.trace(&mut tracer);
        // CacheBase + the two distinct decorator objects, alias counted twice
        assert_eq!(tracer.len(), 4);

        state.clear();
        assert!(state.exported_names().is_empty());
        assert!(state.cache_base().unwrap_err().is_attribute_error());
    }
}
