//! Cycle-collector hooks for runtime object types.
//!
//! Every container type reports the references it owns and can drop them on
//! request. The cycles that matter in practice:
//!
//! - class -> `cached_property` -> function closure -> class
//! - instance -> `__dict__` / `_cache` -> cached value -> instance
//!
//! Immutable links (instance -> class, class -> bases) are reported but never
//! cleared; every cycle passes through at least one clearable container.

use propcache_gc::{Trace, Tracer};

use crate::object::descriptor::{CachedProperty, UnderCachedProperty};
use crate::object::{ClassObject, InstanceObject};
use crate::types::{DictObject, FunctionObject, GenericAlias};

// =============================================================================
// Containers
// =============================================================================

impl Trace for DictObject {
    fn trace(&self, tracer: &mut dyn Tracer) {
        // Keys are interned strings.
        for value in self.values() {
            tracer.trace_value(&value);
        }
    }

    fn clear(&self) {
        DictObject::clear(self);
    }
}

impl Trace for FunctionObject {
    fn trace(&self, tracer: &mut dyn Tracer) {
        self.visit(|value| tracer.trace_value(value));
    }

    fn clear(&self) {
        self.drop_refs();
    }
}

impl Trace for GenericAlias {
    fn trace(&self, tracer: &mut dyn Tracer) {
        tracer.trace_value(self.origin());
        for arg in self.args() {
            tracer.trace_value(arg);
        }
    }
}

// =============================================================================
// Classes and Instances
// =============================================================================

impl Trace for ClassObject {
    fn trace(&self, tracer: &mut dyn Tracer) {
        self.visit(|ptr| tracer.trace_ptr(ptr));
    }

    fn clear(&self) {
        self.drop_refs();
    }
}

impl Trace for InstanceObject {
    fn trace(&self, tracer: &mut dyn Tracer) {
        self.visit(|ptr| tracer.trace_ptr(ptr));
    }
}

// =============================================================================
// Descriptors
// =============================================================================

impl Trace for CachedProperty {
    fn trace(&self, tracer: &mut dyn Tracer) {
        self.visit(|value| tracer.trace_value(value));
    }

    fn clear(&self) {
        self.drop_refs();
    }
}

impl Trace for UnderCachedProperty {
    fn trace(&self, tracer: &mut dyn Tracer) {
        self.visit(|value| tracer.trace_value(value));
    }

    fn clear(&self) {
        self.drop_refs();
    }
}

// =============================================================================
// Tests
// =============================================================================
