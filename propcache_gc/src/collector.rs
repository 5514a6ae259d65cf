//! Cycle collector.
//!
//! Objects are tracked weakly. A collection finds garbage cycles by trial
//! deletion:
//!
//! ```text
//!  1. snapshot   every live tracked object, gc_refs = strong_count
//!  2. subtract   for each reference reported by trace(): gc_refs[target] -= 1
//!  3. roots      objects with gc_refs > 0 are referenced from outside the
//!                tracked set (stack, untracked containers, closures)
//!  4. mark       everything reachable from a root survives
//!  5. clear      the rest is cyclic garbage; clear() breaks the cycles
//! ```
//!
//! References that `trace` does not report are counted as external, so an
//! incomplete `trace` can only make the collector keep garbage alive, never
//! free live objects.
//!
//! A collection is stop-the-world: the caller guarantees no other thread
//! mutates tracked objects while it runs. [`Collector::track`] therefore
//! never collects; it only counts allocations, and the host runs
//! [`Collector::collect_if_due`] at a point where that guarantee holds.

use crate::trace::{RecordingTracer, Trace};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, Weak};
use std::time::{Duration, Instant};
use tracing::debug;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for a [`Collector`].
#[derive(Debug, Clone)]
pub struct GcConfig {
    /// Count tracked allocations so [`Collector::collect_if_due`] can fire.
    pub enabled: bool,

    /// Number of tracked allocations between due collections.
    pub threshold: usize,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self::manual()
    }
}

impl GcConfig {
    /// Configuration that only collects on an explicit [`Collector::collect`].
    #[must_use]
    pub fn manual() -> Self {
        Self {
            enabled: false,
            threshold: 700,
        }
    }

    /// Configuration that makes a collection due every `threshold` allocations.
    #[must_use]
    pub fn scheduled(threshold: usize) -> Self {
        Self {
            enabled: true,
            ..Self::manual()
        }
        .with_threshold(threshold)
    }

    /// Set the allocation threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold.max(1);
        self
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Result of one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionStats {
    /// Live tracked objects examined.
    pub tracked: usize,
    /// Objects found unreachable and cleared.
    pub unreachable: usize,
    /// Time spent in the collection.
    pub elapsed: Duration,
}

// =============================================================================
// Collector
// =============================================================================

/// A cycle collector over weakly tracked objects.
///
/// One collector per interpreter; [`global`] is the process-wide default.
pub struct Collector {
    config: GcConfig,
    tracked: Mutex<Vec<Weak<dyn Trace>>>,
    pending: AtomicUsize,
    collecting: Mutex<()>,
}

impl Collector {
    /// Create a collector with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(GcConfig::default())
    }

    /// Create a collector with a custom configuration.
    #[must_use]
    pub fn with_config(config: GcConfig) -> Self {
        Self {
            config,
            tracked: Mutex::new(Vec::new()),
            pending: AtomicUsize::new(0),
            collecting: Mutex::new(()),
        }
    }

    /// Get the configuration.
    #[inline]
    pub fn config(&self) -> &GcConfig {
        &self.config
    }

    /// Start tracking an object.
    ///
    /// Never collects, whatever the configuration.
    pub fn track<T: Trace + 'static>(&self, obj: &Arc<T>) {
        let weak = Arc::downgrade(obj);
        let weak: Weak<dyn Trace> = weak;
        self.tracked.lock().push(weak);

        if self.config.enabled {
            self.pending.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Whether enough allocations were tracked since the last scheduled
    /// collection.
    pub fn collection_due(&self) -> bool {
        self.config.enabled
            && self.pending.load(Ordering::Relaxed) >= self.config.threshold.max(1)
    }

    /// Run a collection if one is due.
    ///
    /// Same contract as [`collect`](Self::collect): call it only where no
    /// other thread can touch tracked objects.
    pub fn collect_if_due(&self) -> Option<CollectionStats> {
        if !self.collection_due() {
            return None;
        }
        self.pending.store(0, Ordering::Relaxed);
        Some(self.collect())
    }

    /// Number of tracked objects that are still alive.
    pub fn tracked_count(&self) -> usize {
        self.tracked
            .lock()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Run a full collection.
    ///
    /// Stop-the-world: the caller guarantees that no other thread reads or
    /// mutates tracked objects until this returns. An object that gains or
    /// loses edges mid-collection can be misclassified and cleared.
    pub fn collect(&self) -> CollectionStats {
        let _guard = self.collecting.lock();
        let start = Instant::now();

        let live = self.snapshot();
        let index: FxHashMap<usize, usize> = live
            .iter()
            .enumerate()
            .map(|(i, obj)| (addr_of(obj), i))
            .collect();

        // The snapshot itself holds one reference to each object.
        let mut gc_refs: Vec<usize> = live
            .iter()
            .map(|obj| Arc::strong_count(obj).saturating_sub(1))
            .collect();

        let mut edges: Vec<Vec<usize>> = Vec::with_capacity(live.len());
        for obj in &live {
            let mut tracer = RecordingTracer::new();
            obj.trace(&mut tracer);
            let children: Vec<usize> = tracer
                .addrs
                .iter()
                .filter_map(|addr| index.get(addr).copied())
                .collect();
            for &child in &children {
                gc_refs[child] = gc_refs[child].saturating_sub(1);
            }
            edges.push(children);
        }

        let mut reachable = vec![false; live.len()];
        let mut stack: Vec<usize> = (0..live.len()).filter(|&i| gc_refs[i] > 0).collect();
        for &root in &stack {
            reachable[root] = true;
        }
        while let Some(i) = stack.pop() {
            for &child in &edges[i] {
                if !reachable[child] {
                    reachable[child] = true;
                    stack.push(child);
                }
            }
        }

        let mut unreachable = 0;
        for (obj, _) in live.iter().zip(&reachable).filter(|(_, r)| !**r) {
            obj.clear();
            unreachable += 1;
        }

        let stats = CollectionStats {
            tracked: live.len(),
            unreachable,
            elapsed: start.elapsed(),
        };
        drop(live);

        debug!(
            tracked = stats.tracked,
            unreachable = stats.unreachable,
            elapsed_us = stats.elapsed.as_micros(),
            "cycle collection finished"
        );
        stats
    }

    /// Upgrade every live tracked object, pruning dead and duplicate entries.
    fn snapshot(&self) -> Vec<Arc<dyn Trace>> {
        let mut tracked = self.tracked.lock();
        tracked.retain(|weak| weak.strong_count() > 0);

        let mut seen = FxHashMap::default();
        let mut live = Vec::with_capacity(tracked.len());
        for weak in tracked.iter() {
            if let Some(obj) = weak.upgrade() {
                if seen.insert(addr_of(&obj), ()).is_none() {
                    live.push(obj);
                }
            }
        }
        live
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("config", &self.config)
            .field("tracked", &self.tracked.lock().len())
            .finish()
    }
}

#[inline]
fn addr_of(obj: &Arc<dyn Trace>) -> usize {
    Arc::as_ptr(obj).cast::<()>() as usize
}

static GLOBAL: LazyLock<Collector> = LazyLock::new(Collector::new);

/// The process-wide collector used by runtime constructors.
#[inline]
pub fn global() -> &'static Collector {
    &GLOBAL
}

/// Track an object in the process-wide collector.
#[inline]
pub fn track<T: Trace + 'static>(obj: &Arc<T>) {
    GLOBAL.track(obj);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::Tracer;
    use parking_lot::RwLock;

    /// Minimal container: owns a list of other nodes.
    #[derive(Default)]
    struct Node {
        edges: RwLock<Vec<Arc<Node>>>,
    }

    impl Node {
        fn link(&self, other: &Arc<Node>) {
            self.edges.write().push(Arc::clone(other));
        }
    }

    impl Trace for Node {
        fn trace(&self, tracer: &mut dyn Tracer) {
            for edge in self.edges.read().iter() {
                tracer.trace_ptr(Arc::as_ptr(edge).cast());
            }
        }

        fn clear(&self) {
            self.edges.write().clear();
        }
    }

    fn manual() -> Collector {
        Collector::with_config(GcConfig::manual())
    }

    #[test]
    fn test_acyclic_garbage_is_not_tracked_after_drop() {
        let gc = manual();
        let node = Arc::new(Node::default());
        gc.track(&node);
        assert_eq!(gc.tracked_count(), 1);
        drop(node);
        assert_eq!(gc.tracked_count(), 0);
        assert_eq!(gc.collect().tracked, 0);
    }

    #[test]
    fn test_live_objects_survive() {
        let gc = manual();
        let a = Arc::new(Node::default());
        let b = Arc::new(Node::default());
        a.link(&b);
        gc.track(&a);
        gc.track(&b);

        let stats = gc.collect();
        assert_eq!(stats.tracked, 2);
        assert_eq!(stats.unreachable, 0);
        assert_eq!(a.edges.read().len(), 1);
    }

    #[test]
    fn test_two_node_cycle_is_collected() {
        let gc = manual();
        let a = Arc::new(Node::default());
        let b = Arc::new(Node::default());
        a.link(&b);
        b.link(&a);
        gc.track(&a);
        gc.track(&b);

        let weak_a = Arc::downgrade(&a);
        let weak_b = Arc::downgrade(&b);
        drop(a);
        drop(b);
        assert!(weak_a.upgrade().is_some(), "cycle keeps itself alive");

        let stats = gc.collect();
        assert_eq!(stats.unreachable, 2);
        assert!(weak_a.upgrade().is_none());
        assert!(weak_b.upgrade().is_none());
    }

    #[test]
    fn test_cycle_reachable_from_root_survives() {
        let gc = manual();
        let root = Arc::new(Node::default());
        let a = Arc::new(Node::default());
        let b = Arc::new(Node::default());
        root.link(&a);
        a.link(&b);
        b.link(&a);
        for n in [&root, &a, &b] {
            gc.track(n);
        }
        drop(a);
        drop(b);

        let stats = gc.collect();
        assert_eq!(stats.unreachable, 0);
        assert_eq!(root.edges.read().len(), 1);
    }

    #[test]
    fn test_self_cycle_is_collected() {
        let gc = manual();
        let a = Arc::new(Node::default());
        a.link(&a);
        gc.track(&a);
        let weak = Arc::downgrade(&a);
        drop(a);

        assert_eq!(gc.collect().unreachable, 1);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_duplicate_tracking_is_harmless() {
        let gc = manual();
        let a = Arc::new(Node::default());
        gc.track(&a);
        gc.track(&a);

        let stats = gc.collect();
        assert_eq!(stats.tracked, 1);
        assert_eq!(stats.unreachable, 0);
    }

    #[test]
    fn test_track_never_collects_under_default_config() {
        let gc = Collector::new();
        let a = Arc::new(Node::default());
        a.link(&a);
        gc.track(&a);
        let weak = Arc::downgrade(&a);
        drop(a);

        let keep: Vec<Arc<Node>> = (0..2_000).map(|_| Arc::new(Node::default())).collect();
        for node in &keep {
            gc.track(node);
        }
        assert!(weak.upgrade().is_some());
        assert!(!gc.collection_due());
        assert_eq!(gc.collect_if_due(), None);
    }

    #[test]
    fn test_track_never_collects_when_scheduled() {
        let gc = Collector::with_config(GcConfig::scheduled(2));
        let a = Arc::new(Node::default());
        a.link(&a);
        gc.track(&a);
        let weak = Arc::downgrade(&a);
        drop(a);
        assert!(!gc.collection_due());

        // Crossing the threshold only marks a collection as due.
        let b = Arc::new(Node::default());
        gc.track(&b);
        assert!(gc.collection_due());
        assert!(weak.upgrade().is_some());

        let stats = gc.collect_if_due().unwrap();
        assert_eq!(stats.unreachable, 1);
        assert!(weak.upgrade().is_none());
        assert!(!gc.collection_due());
        assert_eq!(gc.collect_if_due(), None);
    }

    #[test]
    fn test_config_defaults() {
        let config = GcConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.threshold, 700);
        assert!(GcConfig::scheduled(10).enabled);
        assert_eq!(GcConfig::scheduled(0).threshold, 1);
        assert_eq!(GcConfig::manual().with_threshold(0).threshold, 1);
    }
}
