//! Object tracing protocol.
//!
//! Runtime objects are reference counted. Reference counting alone cannot
//! reclaim cycles (class -> descriptor -> function -> class), so every object
//! that can own other objects implements [`Trace`]:
//!
//! - `trace` reports every object reference the value *owns* (one strong
//!   reference each), exactly once per call.
//! - `clear` drops those references. The collector calls it on objects it has
//!   proven unreachable, which breaks the cycle and lets the counts fall to
//!   zero.
//!
//! Reporting a reference the object does not own would make the collector
//! free live objects; forgetting one only leaks. Implementations must err on
//! the side of under-reporting.

use propcache_core::Value;

/// Visitor handed to [`Trace::trace`].
pub trait Tracer {
    /// Report an owned object reference by its address.
    fn trace_ptr(&mut self, ptr: *const ());

    /// Report an owned value. Scalars and strings own no objects.
    #[inline]
    fn trace_value(&mut self, value: &Value) {
        if let Some(addr) = value.object_addr() {
            self.trace_ptr(addr as *const ());
        }
    }
}

/// Implemented by every object that can hold references to other objects.
pub trait Trace: Send + Sync {
    /// Visit every object reference this value owns.
    fn trace(&self, tracer: &mut dyn Tracer);

    /// Drop every owned object reference. Leaf types keep the default.
    fn clear(&self) {}
}

/// Tracer that records reported addresses.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    /// Addresses in the order they were reported.
    pub addrs: Vec<usize>,
}

impl RecordingTracer {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of references reported.
    #[must_use]
    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    /// Check if nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    /// Check whether `value` was reported.
    #[must_use]
    pub fn saw(&self, value: &Value) -> bool {
        value
            .object_addr()
            .is_some_and(|addr| self.addrs.contains(&addr))
    }
}

impl Tracer for RecordingTracer {
    fn trace_ptr(&mut self, ptr: *const ()) {
        self.addrs.push(ptr as usize);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_are_not_reported() {
        let mut tracer = RecordingTracer::new();
        tracer.trace_value(&Value::none());
        tracer.trace_value(&Value::int(3));
        tracer.trace_value(&Value::str("doc"));
        assert!(tracer.is_empty());
    }

    #[test]
    fn test_trace_ptr_records_addresses() {
        let mut tracer = RecordingTracer::new();
        tracer.trace_ptr(0x1000 as *const ());
        tracer.trace_ptr(0x2000 as *const ());
        assert_eq!(tracer.addrs, vec![0x1000, 0x2000]);
        assert_eq!(tracer.len(), 2);
    }
}
